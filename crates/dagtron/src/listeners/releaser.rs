use crate::events::{Listener, TaskEvent};
use crate::executors::SharedExecutor;
use crate::node::GraphNode;

/// Releases a task's result once every child consumed it, i.e. on the
/// after-satisfied event. Use it on long-lived graphs whose intermediate
/// results are only needed by their children; a released result reads as
/// unscheduled until the task runs again.
#[derive(Default)]
pub struct Releaser {
    executor: Option<SharedExecutor>,
}

impl Releaser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The executor gives control over which thread releases the result.
    #[must_use]
    pub fn with_executor(executor: SharedExecutor) -> Self {
        Self {
            executor: Some(executor),
        }
    }
}

impl Listener for Releaser {
    fn on_event(&self, event: TaskEvent, task: &dyn GraphNode) {
        if event != TaskEvent::AfterSatisfied {
            return;
        }
        match &self.executor {
            Some(executor) => {
                let owned = task.to_shared();
                executor.execute(Box::new(move || owned.clear_result()), task);
            }
            None => task.clear_result(),
        }
    }
}
