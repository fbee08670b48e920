use derive_more::Display;

use crate::errors::TaskError;

pub type AnyResult<T, E> = std::result::Result<T, E>;

pub type TaskResult<T> = AnyResult<T, TaskError>;

/// The composition kind of a task, fixed at construction. The kind decides
/// how a runner consumes the results of the task's parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TaskKind {
    /// No parents; the functor takes no inputs.
    #[display("root")]
    Root,

    /// The functor receives every parent's raw result handle, so it can
    /// observe failures directly.
    #[display("accept")]
    Accept,

    /// The functor receives the result handle of the first parent that
    /// resolves; the remaining parents are canceled.
    #[display("accept_any")]
    AcceptAny,

    /// The functor receives every parent's resolved value; a parent failure
    /// propagates without invoking the functor.
    #[display("consume")]
    Consume,

    /// The functor receives the resolved value of the first parent that
    /// resolves; the remaining parents are canceled.
    #[display("consume_any")]
    ConsumeAny,

    /// The functor takes no inputs but runs only after every parent
    /// resolved; parent failures propagate.
    #[display("wait")]
    Wait,

    /// The functor takes no inputs and runs as soon as one parent resolved;
    /// the remaining parents are canceled.
    #[display("wait_any")]
    WaitAny,
}
