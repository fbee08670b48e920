use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::cell::{ResultCell, TaskFuture};
use crate::parents::{AnyParents, Parents};
use crate::runners::{
    AcceptAnyBody, AcceptBody, ConsumeAnyBody, ConsumeBody, RootBody, WaitAnyBody, WaitBody,
};
use crate::synca::OnSignal;
use crate::task::{assemble, Task};
use crate::types::{TaskKind, TaskResult};

/// Creates a task with no parents. The functor takes no input.
pub fn make_root<T, F>(functor: F) -> Task<T>
where
    T: Clone + Send + 'static,
    F: Fn() -> TaskResult<T> + Send + Sync + 'static,
{
    assemble(
        TaskKind::Root,
        Arc::new(OnSignal::new()),
        Box::new(RootBody::new(functor)),
        ResultCell::idle(),
        true,
    )
}

/// Creates a root task whose cancel flag is the given token, so the
/// functor can observe the cancellation of its own task through the
/// token it captured.
pub fn make_root_with_token<T, F>(token: &CancelToken, functor: F) -> Task<T>
where
    T: Clone + Send + 'static,
    F: Fn() -> TaskResult<T> + Send + Sync + 'static,
{
    assemble(
        TaskKind::Root,
        Arc::clone(token.signal()),
        Box::new(RootBody::new(functor)),
        ResultCell::idle(),
        true,
    )
}

/// Creates a task whose functor receives every parent's raw result
/// handle, so it can inspect failures directly.
pub fn make_accept<T, P, F>(functor: F, parents: P) -> Task<T>
where
    T: Clone + Send + 'static,
    P: Parents,
    F: Fn(P::Futures) -> TaskResult<T> + Send + Sync + 'static,
{
    assemble(
        TaskKind::Accept,
        Arc::new(OnSignal::new()),
        Box::new(AcceptBody::new(functor, parents)),
        ResultCell::idle(),
        true,
    )
}

/// Creates a task whose functor receives the result handle of the first
/// parent that resolves; the remaining parents are canceled.
pub fn make_accept_any<T, P, F>(functor: F, parents: P) -> Task<T>
where
    T: Clone + Send + 'static,
    P: AnyParents,
    F: Fn(TaskFuture<P::Winner>) -> TaskResult<T> + Send + Sync + 'static,
{
    assemble(
        TaskKind::AcceptAny,
        Arc::new(OnSignal::new()),
        Box::new(AcceptAnyBody::new(functor, parents)),
        ResultCell::idle(),
        true,
    )
}

/// Creates a task whose functor receives every parent's resolved value;
/// a parent failure propagates without invoking the functor.
pub fn make_consume<T, P, F>(functor: F, parents: P) -> Task<T>
where
    T: Clone + Send + 'static,
    P: Parents,
    F: Fn(P::Values) -> TaskResult<T> + Send + Sync + 'static,
{
    assemble(
        TaskKind::Consume,
        Arc::new(OnSignal::new()),
        Box::new(ConsumeBody::new(functor, parents)),
        ResultCell::idle(),
        true,
    )
}

/// Creates a task whose functor receives the resolved value of the first
/// parent that resolves; the remaining parents are canceled.
pub fn make_consume_any<T, P, F>(functor: F, parents: P) -> Task<T>
where
    T: Clone + Send + 'static,
    P: AnyParents,
    F: Fn(P::Winner) -> TaskResult<T> + Send + Sync + 'static,
{
    assemble(
        TaskKind::ConsumeAny,
        Arc::new(OnSignal::new()),
        Box::new(ConsumeAnyBody::new(functor, parents)),
        ResultCell::idle(),
        true,
    )
}

/// Creates a task whose functor takes no input but runs only after every
/// parent resolved; parent failures propagate.
pub fn make_wait<T, P, F>(functor: F, parents: P) -> Task<T>
where
    T: Clone + Send + 'static,
    P: Parents,
    F: Fn() -> TaskResult<T> + Send + Sync + 'static,
{
    assemble(
        TaskKind::Wait,
        Arc::new(OnSignal::new()),
        Box::new(WaitBody::new(functor, parents)),
        ResultCell::idle(),
        true,
    )
}

/// Creates a task whose functor takes no input and runs as soon as the
/// first parent resolved; the remaining parents are canceled.
pub fn make_wait_any<T, P, F>(functor: F, parents: P) -> Task<T>
where
    T: Clone + Send + 'static,
    P: AnyParents,
    F: Fn() -> TaskResult<T> + Send + Sync + 'static,
{
    assemble(
        TaskKind::WaitAny,
        Arc::new(OnSignal::new()),
        Box::new(WaitAnyBody::new(functor, parents)),
        ResultCell::idle(),
        true,
    )
}

/// Creates a root-kind task that is born resolved with the given value.
/// Scheduling it is a no-op until it gets reset, after which a schedule
/// cycle reproduces the same value.
pub fn make_value_task<T>(value: T) -> Task<T>
where
    T: Clone + Send + Sync + 'static,
{
    let seed = value.clone();
    assemble(
        TaskKind::Root,
        Arc::new(OnSignal::new()),
        Box::new(RootBody::new(move || Ok(seed.clone()))),
        ResultCell::ready(value),
        false,
    )
}
