use std::sync::Arc;

use crate::node::GraphNode;

/// A scheduled task body: a one-shot closure owning everything it needs.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// The executor interface used to perform custom task execution. `execute`
/// is only ever called on the thread of the caller to `schedule*`; the
/// implementation decides where and when the job actually runs and must
/// not panic.
pub trait Executor: Send + Sync {
    /// Returns the name of the executor, used in node labels.
    fn name(&self) -> String;

    /// Runs the given job exactly once. `task` is the task the job belongs
    /// to, provided so implementations can honor per-task metadata such as
    /// the priority.
    fn execute(&self, job: Job, task: &dyn GraphNode);
}

pub type SharedExecutor = Arc<dyn Executor>;

/// Runs every job synchronously on the caller's thread, in submission
/// order.
#[derive(Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Convenience constructor returning the shared form the scheduling
    /// methods expect.
    #[must_use]
    pub fn shared() -> SharedExecutor {
        Arc::new(Self)
    }
}

impl Executor for SequentialExecutor {
    fn name(&self) -> String {
        "dagtron::sequential".to_owned()
    }

    fn execute(&self, job: Job, _task: &dyn GraphNode) {
        job();
    }
}
