//! Shared fixtures for the engine tests: an event recorder, an executor
//! that holds jobs until released, and a gate for blocking functors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use dagtron::executors::{Executor, Job};
use dagtron::{GraphNode, Listener, TaskEvent};

/// Records every event it observes together with the raising task's id.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<(TaskEvent, usize)>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn kinds(&self) -> Vec<TaskEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(event, _)| *event)
            .collect()
    }

    pub fn count_of(&self, wanted: TaskEvent) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(event, _)| *event == wanted)
            .count()
    }
}

impl Listener for Recorder {
    fn on_event(&self, event: TaskEvent, task: &dyn GraphNode) {
        self.events.lock().unwrap().push((event, task.id()));
    }
}

/// An executor that parks every job until the test releases them, used to
/// observe tasks in their in-flight state deterministically.
#[derive(Default)]
pub struct HoldExecutor {
    jobs: Mutex<Vec<Job>>,
}

impl HoldExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pending(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn run_all(&self) {
        let jobs: Vec<Job> = self.jobs.lock().unwrap().drain(..).collect();
        tracing::debug!("Releasing {} held jobs", jobs.len());
        for job in jobs {
            job();
        }
    }
}

impl Executor for HoldExecutor {
    fn name(&self) -> String {
        "tests::hold".to_owned()
    }

    fn execute(&self, job: Job, _task: &dyn GraphNode) {
        self.jobs.lock().unwrap().push(job);
    }
}

/// A boolean gate functors can block on until the test opens it.
#[derive(Clone, Default)]
pub struct Gate {
    open: Arc<AtomicBool>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn block_until_open(&self) {
        while !self.is_open() {
            thread::sleep(Duration::from_micros(50));
        }
    }
}

/// Polls the predicate until it holds or the timeout elapses.
pub fn eventually(timeout: Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    predicate()
}
