use thiserror::Error;

/// Errors surfaced by the engine, either raised synchronously from a
/// builder/mutator call or stored inside a task's result cell and re-raised
/// at `get()` time.
///
/// The enum is `Clone` because a stored failure may be observed by any
/// number of readers of the same result cell.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The task was canceled before or around its invocation.
    #[error("Task canceled: {0}")]
    Canceled(String),

    /// The task object was no longer alive when its runner resolved the
    /// weak handle back to it.
    #[error("Task destroyed: {0}")]
    Destroyed(String),

    /// An invalid parameter was passed to an engine call.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The engine was used in an unintended way, e.g. mutating a task
    /// while a run is in flight or reading a result before scheduling.
    #[error("Control error: {0}")]
    Control(String),

    /// A failure produced by a user functor.
    #[error("{0}")]
    Failed(String),
}

impl TaskError {
    pub fn canceled(task_repr: impl Into<String>) -> Self {
        Self::Canceled(task_repr.into())
    }

    pub fn destroyed(task_repr: impl Into<String>) -> Self {
        Self::Destroyed(task_repr.into())
    }

    pub fn invalid_parameter(name: impl Into<String>) -> Self {
        Self::InvalidParameter(name.into())
    }

    pub fn control(message: impl Into<String>) -> Self {
        Self::Control(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// True for the cancellation kind; runners use this to decide whether
    /// to raise the after-canceled event when publishing.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }
}

impl From<&str> for TaskError {
    fn from(message: &str) -> Self {
        Self::Failed(message.to_owned())
    }
}

impl From<String> for TaskError {
    fn from(message: String) -> Self {
        Self::Failed(message)
    }
}
