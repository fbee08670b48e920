use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use concurrent_queue::ConcurrentQueue;

use crate::errors::TaskError;
use crate::node::GraphNode;
use crate::synca::{LockSignal, OnSignal};
use crate::types::TaskResult;

use super::{Executor, Job};

/// Callback invoked once on each worker thread before it starts draining
/// jobs, e.g. to pin the thread or set up thread-local state.
pub type ThreadStartFn = Arc<dyn Fn(usize) + Send + Sync>;

/// A bounded pool of worker threads draining a shared FIFO queue. Workers
/// sleep on a latch while the queue is empty; on drop the pool signals the
/// kill flag, lets the workers drain whatever is still queued and joins
/// them.
pub struct ThreadPoolExecutor {
    tasks: Arc<ConcurrentQueue<Job>>,
    latch: Arc<LockSignal>,
    kill_signal: Arc<OnSignal>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPoolExecutor {
    /// Creates a pool with `num_threads` workers.
    pub fn new(num_threads: usize) -> TaskResult<Self> {
        Self::with_thread_start(num_threads, None)
    }

    /// Convenience constructor returning the shared form the scheduling
    /// methods expect.
    pub fn shared(num_threads: usize) -> TaskResult<Arc<Self>> {
        Ok(Arc::new(Self::new(num_threads)?))
    }

    /// Creates a pool with `num_threads` workers, invoking `on_started`
    /// on each worker thread before it begins draining jobs.
    pub fn with_thread_start(
        num_threads: usize,
        on_started: Option<ThreadStartFn>,
    ) -> TaskResult<Self> {
        if num_threads == 0 {
            return Err(TaskError::invalid_parameter("number of threads"));
        }

        let tasks: Arc<ConcurrentQueue<Job>> = Arc::new(ConcurrentQueue::unbounded());
        let latch = Arc::new(LockSignal::new());
        let kill_signal = Arc::new(OnSignal::new());

        let mut handles = Vec::with_capacity(num_threads);
        for index in 0..num_threads {
            let worker_tasks = Arc::clone(&tasks);
            let worker_latch = Arc::clone(&latch);
            let worker_kill = Arc::clone(&kill_signal);
            let worker_started = on_started.clone();

            let builder = thread::Builder::new().name(format!("dagtron_worker_{index}"));
            let handle = builder
                .spawn(move || {
                    Self::worker(index, &worker_tasks, &worker_latch, &worker_kill, worker_started);
                })
                .map_err(|err| {
                    kill_signal.turn_on();
                    latch.signal_all();
                    TaskError::failed(format!("failed to spawn worker thread: {err}"))
                })?;
            handles.push(handle);
        }

        Ok(Self {
            tasks,
            latch,
            kill_signal,
            handles: Mutex::new(handles),
        })
    }

    fn worker(
        index: usize,
        tasks: &ConcurrentQueue<Job>,
        latch: &LockSignal,
        kill_signal: &OnSignal,
        on_started: Option<ThreadStartFn>,
    ) {
        let span = tracing::trace_span!("ThreadPoolExecutor::worker", index);
        let _enter = span.enter();

        if let Some(callback) = on_started {
            callback(index);
        }

        loop {
            match tasks.pop() {
                Ok(job) => job(),
                Err(_) => {
                    // Queue drained; workers only exit once the kill signal
                    // is up and nothing is left to run.
                    if kill_signal.probe() {
                        tracing::debug!("Worker {index} drained the queue and is exiting");
                        break;
                    }

                    latch.lock();
                    if tasks.is_empty() && !kill_signal.probe() {
                        latch.wait();
                    }
                }
            }
        }
    }

    /// Number of jobs queued but not yet picked up by a worker.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.tasks.len()
    }
}

impl Executor for ThreadPoolExecutor {
    fn name(&self) -> String {
        "dagtron::parallel".to_owned()
    }

    fn execute(&self, job: Job, _task: &dyn GraphNode) {
        match self.tasks.push(job) {
            Ok(()) => match self.tasks.len() {
                1 => self.latch.signal_one(),
                _ => self.latch.signal_all(),
            },
            Err(_) => {
                tracing::warn!("Job dropped: worker queue is closed");
            }
        }
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        self.kill_signal.turn_on();
        self.latch.signal_all();

        let mut handles = self.handles.lock().unwrap();
        for handle in handles.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("A worker thread panicked before shutdown");
            }
        }
    }
}
