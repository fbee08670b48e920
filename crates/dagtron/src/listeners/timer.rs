use std::collections::HashMap;
use std::time::Instant;

use crate::events::{Listener, TaskEvent};
use crate::node::GraphNode;
use crate::synca::SpinLock;

/// Tracks the average idle, wait and run time of every task it listens to
/// and publishes the rolling means into the task's timing counters.
///
/// - idle = time between scheduling and starting the task (executor
///   dependent)
/// - wait = time between starting the task and invoking its functor, i.e.
///   waiting for parents to finish
/// - run = time between invoking and finishing the functor
#[derive(Default)]
pub struct TimerListener {
    tracks: SpinLock<HashMap<usize, Track>>,
}

#[derive(Default)]
struct Track {
    running: bool,
    start_idle: Option<Instant>,
    start_wait: Option<Instant>,
    start_run: Option<Instant>,
    idle_us: i64,
    idle_samples: i64,
    wait_us: i64,
    wait_samples: i64,
    run_us: i64,
    run_samples: i64,
}

fn elapsed_us(from: Instant, to: Instant) -> i64 {
    i64::try_from(to.duration_since(from).as_micros()).unwrap_or(i64::MAX)
}

impl TimerListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all timing information gathered so far. The counters already
    /// published onto tasks stay as they are.
    pub fn reset(&self) {
        self.tracks.lock().clear();
    }

    fn track_idle(&self, task: &dyn GraphNode, now: Instant) {
        let average = {
            let mut tracks = self.tracks.lock();
            let track = tracks.entry(task.key()).or_default();
            let Some(started) = track.start_idle.take() else {
                return;
            };
            track.idle_us += elapsed_us(started, now);
            track.idle_samples += 1;
            track.idle_us / track.idle_samples
        };
        task.set_avg_idle_us(average);
    }

    fn track_wait(&self, task: &dyn GraphNode, now: Instant) {
        let average = {
            let mut tracks = self.tracks.lock();
            let track = tracks.entry(task.key()).or_default();
            let Some(started) = track.start_wait.take() else {
                return;
            };
            track.wait_us += elapsed_us(started, now);
            track.wait_samples += 1;
            track.wait_us / track.wait_samples
        };
        task.set_avg_wait_us(average);
    }

    fn track_run(&self, task: &dyn GraphNode, now: Instant) {
        let average = {
            let mut tracks = self.tracks.lock();
            let track = tracks.entry(task.key()).or_default();
            if !track.running {
                return;
            }
            track.running = false;
            let Some(started) = track.start_run.take() else {
                return;
            };
            track.run_us += elapsed_us(started, now);
            track.run_samples += 1;
            track.run_us / track.run_samples
        };
        task.set_avg_run_us(average);
    }
}

impl Listener for TimerListener {
    fn on_event(&self, event: TaskEvent, task: &dyn GraphNode) {
        let now = Instant::now();
        match event {
            TaskEvent::BeforeScheduled => {
                let mut tracks = self.tracks.lock();
                let track = tracks.entry(task.key()).or_default();
                track.start_idle = Some(now);
            }
            TaskEvent::BeforeStarted => {
                self.track_idle(task, now);
                let mut tracks = self.tracks.lock();
                let track = tracks.entry(task.key()).or_default();
                track.start_wait = Some(now);
            }
            TaskEvent::AfterCanceled => {
                self.track_wait(task, now);
            }
            TaskEvent::BeforeInvoked => {
                self.track_wait(task, now);
                let mut tracks = self.tracks.lock();
                let track = tracks.entry(task.key()).or_default();
                track.running = true;
                track.start_run = Some(now);
            }
            TaskEvent::AfterFinished => {
                self.track_run(task, now);
            }
            _ => {}
        }
    }
}
