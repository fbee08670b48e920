use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::errors::TaskError;
use crate::events::{Listener, TaskEvent};
use crate::node::GraphNode;
use crate::synca::{CircularBuffer, SpinLock};
use crate::task::Task;
use crate::types::TaskResult;

/// Default minimum size of a [`TaskPool`].
pub const POOL_DEFAULT_MINIMUM: usize = 32;

/// Default maximum size of a [`TaskPool`].
pub const POOL_DEFAULT_MAXIMUM: usize = 65_536;

/// How long [`TaskPool::wait_for_next_task`] sleeps between attempts.
const NEXT_TASK_PROBE: Duration = Duration::from_micros(1);

/// A pool of structural clones of one template graph, letting overlapping
/// runs of the same graph proceed in parallel. Clones move between three
/// states: idle, busy, and just-finished; finished markers travel from
/// the worker threads back to the pool through a spin-locked ring the
/// clones feed via an inherited after-finished listener.
///
/// The pool hands out tasks from one consumer at a time; only the
/// finished ring is shared with the workers.
pub struct TaskPool<T> {
    template: Task<T>,
    minimum: usize,
    maximum: usize,
    finished: Arc<SpinLock<CircularBuffer<usize>>>,
    idle: VecDeque<Task<T>>,
    busy: HashMap<usize, Task<T>>,
}

struct FinishedListener {
    finished: Arc<SpinLock<CircularBuffer<usize>>>,
}

impl Listener for FinishedListener {
    // Called on a potentially busy worker thread; only the ring push
    // happens under the lock.
    fn on_event(&self, _event: TaskEvent, task: &dyn GraphNode) {
        self.finished.lock().push(task.key());
    }
}

impl<T> TaskPool<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a pool around the template task with the given size bounds.
    /// The template itself never runs; it only serves as the clone source.
    pub fn new(template: Task<T>, minimum_size: usize, maximum_size: usize) -> TaskResult<Self> {
        if minimum_size < 1 {
            return Err(TaskError::invalid_parameter("minimum size"));
        }
        if minimum_size > maximum_size {
            return Err(TaskError::invalid_parameter("minimum or maximum size"));
        }

        let finished = Arc::new(SpinLock::new(CircularBuffer::new(maximum_size)?));
        let listener: Arc<dyn Listener> = Arc::new(FinishedListener {
            finished: Arc::clone(&finished),
        });
        // Clones inherit the registration, so every pooled task reports
        // back into the ring.
        template.add_listener_for(TaskEvent::AfterFinished, listener)?;

        let mut pool = Self {
            template,
            minimum: minimum_size,
            maximum: maximum_size,
            finished,
            idle: VecDeque::new(),
            busy: HashMap::new(),
        };
        for _ in 0..pool.minimum {
            let clone = pool.template.clone_graph()?;
            pool.idle.push_back(clone);
        }
        Ok(pool)
    }

    /// Creates a pool with reasonable defaults for minimum and maximum.
    pub fn with_defaults(template: Task<T>) -> TaskResult<Self> {
        Self::new(template, POOL_DEFAULT_MINIMUM, POOL_DEFAULT_MAXIMUM)
    }

    /// Returns the next available task, preferring one that just finished.
    /// With an empty idle queue and `maybe_resize` the pool first tries to
    /// double its size, bounded by the maximum; when nothing is available
    /// the call returns `None`. A returned task may still carry its prior
    /// result; the caller is expected to `reset_all` before rescheduling.
    pub fn next_task(&mut self, maybe_resize: bool) -> Option<Task<T>> {
        let finished_key = self.finished.lock().pop();
        let task = match finished_key.and_then(|key| self.busy.get(&key).cloned()) {
            Some(task) => task,
            None => {
                if maybe_resize && self.idle.is_empty() {
                    self.resize(self.size() * 2);
                }
                let task = self.idle.pop_front()?;
                self.busy.insert(task.key(), task.clone());
                task
            }
        };

        if task.was_scheduled() {
            // Resolves immediately for a finished task; the caller may
            // observe the prior result until it resets the clone.
            let _ = task.wait();
        }
        Some(task)
    }

    /// Like [`TaskPool::next_task`] but polls until a task is available.
    pub fn wait_for_next_task(&mut self, maybe_resize: bool) -> Task<T> {
        loop {
            if let Some(task) = self.next_task(maybe_resize) {
                return task;
            }
            thread::sleep(NEXT_TASK_PROBE);
        }
    }

    /// Resizes toward `new_size` within the `[minimum, maximum]` bounds.
    /// Growing clones the template; shrinking only evicts idle tasks.
    pub fn resize(&mut self, new_size: usize) {
        self.reclaim();
        if new_size > self.size() {
            while self.size() < new_size && self.size() < self.maximum {
                match self.template.clone_graph() {
                    Ok(clone) => self.idle.push_back(clone),
                    Err(error) => {
                        tracing::warn!("Task pool could not grow: {error}");
                        break;
                    }
                }
            }
        } else {
            while self.size() > new_size && self.size() > self.minimum {
                if self.idle.pop_front().is_none() {
                    break;
                }
            }
        }
    }

    /// Moves every just-finished task back into the idle queue.
    pub fn reclaim(&mut self) {
        loop {
            let key = self.finished.lock().pop();
            let Some(key) = key else {
                break;
            };
            if let Some(task) = self.busy.remove(&key) {
                self.idle.push_back(task);
            }
        }
    }

    /// Current total size of the pool, idle and busy tasks combined.
    #[must_use]
    pub fn size(&self) -> usize {
        self.idle.len() + self.busy.len()
    }

    /// Number of tasks available for immediate reuse, counting the
    /// just-finished ones not yet reclaimed.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.len() + self.finished.lock().len()
    }

    /// Number of tasks currently handed out and not yet finished.
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.busy.len().saturating_sub(self.finished.lock().len())
    }

    #[must_use]
    pub fn minimum_size(&self) -> usize {
        self.minimum
    }

    #[must_use]
    pub fn maximum_size(&self) -> usize {
        self.maximum
    }
}
