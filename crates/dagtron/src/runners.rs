use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use crate::cell::{ResultCell, TaskFuture};
use crate::clone::CloneCache;
use crate::errors::TaskError;
use crate::events::TaskEvent;
use crate::executors::Job;
use crate::node::GraphNode;
use crate::parents::{AnyParents, Parents};
use crate::task::TaskInner;
use crate::types::TaskResult;

/// The kind-specific half of a task: holds the typed parent handles and
/// the user functor, builds the one-shot runner for each schedule cycle
/// and knows how to clone itself into a new graph.
pub(crate) trait TaskBody<T>: Send + Sync {
    /// The untyped parent view used for wiring and traversal.
    fn parent_nodes(&self) -> Vec<Arc<dyn GraphNode>>;

    /// Builds the runner for one schedule cycle. `cell` is the cycle's
    /// result cell and `repr` the task representation used in canceled and
    /// destroyed errors.
    fn make_job(&self, task: Weak<TaskInner<T>>, cell: Arc<ResultCell<T>>, repr: String) -> Job;

    fn clone_body(&self, cache: &mut CloneCache) -> TaskResult<Box<dyn TaskBody<T>>>;
}

/// Drives one schedule cycle: events, parent synchronization, cancel
/// check, invocation, publication and parent refcount release, in that
/// order. `sync` performs the kind-specific parent wait and produces the
/// functor input; `invoke` runs the functor.
pub(crate) fn run_cycle<T, In>(
    task: &Weak<TaskInner<T>>,
    cell: &ResultCell<T>,
    repr: &str,
    parents: &[Arc<dyn GraphNode>],
    sync: impl FnOnce() -> TaskResult<In>,
    invoke: impl FnOnce(In) -> TaskResult<T>,
) where
    T: Clone + Send + 'static,
{
    if let Some(alive) = task.upgrade() {
        alive.raise_event(TaskEvent::BeforeStarted);
    }

    let outcome = (|| {
        let input = sync()?;
        let alive = task
            .upgrade()
            .ok_or_else(|| TaskError::destroyed(repr))?;
        if alive.canceled() {
            return Err(TaskError::canceled(repr));
        }
        alive.raise_event(TaskEvent::BeforeInvoked);
        invoke(input)
    })();

    let was_canceled = matches!(&outcome, Err(error) if error.is_canceled());
    match outcome {
        Ok(value) => cell.publish_value(value),
        Err(error) => {
            tracing::debug!("Runner for task {repr} resolved with failure: {error}");
            cell.publish_error(error);
        }
    }

    if was_canceled {
        if let Some(alive) = task.upgrade() {
            alive.raise_event(TaskEvent::AfterCanceled);
        }
    }

    for parent in parents {
        parent.decrement_refcount();
    }

    if let Some(alive) = task.upgrade() {
        alive.raise_event(TaskEvent::AfterFinished);
    }
}

/// A task with no parents; the functor takes no input.
pub(crate) struct RootBody<T, F> {
    functor: Arc<F>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> RootBody<T, F> {
    pub(crate) fn new(functor: F) -> Self {
        Self {
            functor: Arc::new(functor),
            _marker: PhantomData,
        }
    }
}

impl<T, F> TaskBody<T> for RootBody<T, F>
where
    T: Clone + Send + 'static,
    F: Fn() -> TaskResult<T> + Send + Sync + 'static,
{
    fn parent_nodes(&self) -> Vec<Arc<dyn GraphNode>> {
        Vec::new()
    }

    fn make_job(&self, task: Weak<TaskInner<T>>, cell: Arc<ResultCell<T>>, repr: String) -> Job {
        let functor = Arc::clone(&self.functor);
        Box::new(move || {
            run_cycle(&task, &cell, &repr, &[], || Ok(()), |()| functor());
        })
    }

    fn clone_body(&self, _cache: &mut CloneCache) -> TaskResult<Box<dyn TaskBody<T>>> {
        Ok(Box::new(Self {
            functor: Arc::clone(&self.functor),
            _marker: PhantomData,
        }))
    }
}

/// The functor receives every parent's raw result handle.
pub(crate) struct AcceptBody<T, P, F> {
    parents: P,
    functor: Arc<F>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, P, F> AcceptBody<T, P, F> {
    pub(crate) fn new(functor: F, parents: P) -> Self {
        Self {
            parents,
            functor: Arc::new(functor),
            _marker: PhantomData,
        }
    }
}

impl<T, P, F> TaskBody<T> for AcceptBody<T, P, F>
where
    T: Clone + Send + 'static,
    P: Parents,
    F: Fn(P::Futures) -> TaskResult<T> + Send + Sync + 'static,
{
    fn parent_nodes(&self) -> Vec<Arc<dyn GraphNode>> {
        self.parents.nodes()
    }

    fn make_job(&self, task: Weak<TaskInner<T>>, cell: Arc<ResultCell<T>>, repr: String) -> Job {
        let parents = self.parents.clone();
        let functor = Arc::clone(&self.functor);
        Box::new(move || {
            let nodes = parents.nodes();
            run_cycle(
                &task,
                &cell,
                &repr,
                &nodes,
                || {
                    parents.wait_all()?;
                    Ok(parents.futures())
                },
                |futures| functor(futures),
            );
        })
    }

    fn clone_body(&self, cache: &mut CloneCache) -> TaskResult<Box<dyn TaskBody<T>>> {
        Ok(Box::new(Self {
            parents: self.parents.clone_with(cache)?,
            functor: Arc::clone(&self.functor),
            _marker: PhantomData,
        }))
    }
}

/// The functor receives the result handle of the first parent to resolve;
/// the losers get their cancel flag set.
pub(crate) struct AcceptAnyBody<T, P, F> {
    parents: P,
    functor: Arc<F>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, P, F> AcceptAnyBody<T, P, F> {
    pub(crate) fn new(functor: F, parents: P) -> Self {
        Self {
            parents,
            functor: Arc::new(functor),
            _marker: PhantomData,
        }
    }
}

impl<T, P, F> TaskBody<T> for AcceptAnyBody<T, P, F>
where
    T: Clone + Send + 'static,
    P: AnyParents,
    F: Fn(TaskFuture<P::Winner>) -> TaskResult<T> + Send + Sync + 'static,
{
    fn parent_nodes(&self) -> Vec<Arc<dyn GraphNode>> {
        self.parents.nodes()
    }

    fn make_job(&self, task: Weak<TaskInner<T>>, cell: Arc<ResultCell<T>>, repr: String) -> Job {
        let parents = self.parents.clone();
        let functor = Arc::clone(&self.functor);
        Box::new(move || {
            let nodes = parents.nodes();
            run_cycle(
                &task,
                &cell,
                &repr,
                &nodes,
                || {
                    let winner = parents.wait_any();
                    parents.cancel_all_but(&winner);
                    Ok(winner.future())
                },
                |future| functor(future),
            );
        })
    }

    fn clone_body(&self, cache: &mut CloneCache) -> TaskResult<Box<dyn TaskBody<T>>> {
        Ok(Box::new(Self {
            parents: self.parents.clone_with(cache)?,
            functor: Arc::clone(&self.functor),
            _marker: PhantomData,
        }))
    }
}

/// The functor receives every parent's resolved value; a parent failure
/// propagates without invoking the functor.
pub(crate) struct ConsumeBody<T, P, F> {
    parents: P,
    functor: Arc<F>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, P, F> ConsumeBody<T, P, F> {
    pub(crate) fn new(functor: F, parents: P) -> Self {
        Self {
            parents,
            functor: Arc::new(functor),
            _marker: PhantomData,
        }
    }
}

impl<T, P, F> TaskBody<T> for ConsumeBody<T, P, F>
where
    T: Clone + Send + 'static,
    P: Parents,
    F: Fn(P::Values) -> TaskResult<T> + Send + Sync + 'static,
{
    fn parent_nodes(&self) -> Vec<Arc<dyn GraphNode>> {
        self.parents.nodes()
    }

    fn make_job(&self, task: Weak<TaskInner<T>>, cell: Arc<ResultCell<T>>, repr: String) -> Job {
        let parents = self.parents.clone();
        let functor = Arc::clone(&self.functor);
        Box::new(move || {
            let nodes = parents.nodes();
            run_cycle(
                &task,
                &cell,
                &repr,
                &nodes,
                || {
                    parents.wait_all()?;
                    parents.values()
                },
                |values| functor(values),
            );
        })
    }

    fn clone_body(&self, cache: &mut CloneCache) -> TaskResult<Box<dyn TaskBody<T>>> {
        Ok(Box::new(Self {
            parents: self.parents.clone_with(cache)?,
            functor: Arc::clone(&self.functor),
            _marker: PhantomData,
        }))
    }
}

/// The functor receives the resolved value of the first parent to resolve.
pub(crate) struct ConsumeAnyBody<T, P, F> {
    parents: P,
    functor: Arc<F>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, P, F> ConsumeAnyBody<T, P, F> {
    pub(crate) fn new(functor: F, parents: P) -> Self {
        Self {
            parents,
            functor: Arc::new(functor),
            _marker: PhantomData,
        }
    }
}

impl<T, P, F> TaskBody<T> for ConsumeAnyBody<T, P, F>
where
    T: Clone + Send + 'static,
    P: AnyParents,
    F: Fn(P::Winner) -> TaskResult<T> + Send + Sync + 'static,
{
    fn parent_nodes(&self) -> Vec<Arc<dyn GraphNode>> {
        self.parents.nodes()
    }

    fn make_job(&self, task: Weak<TaskInner<T>>, cell: Arc<ResultCell<T>>, repr: String) -> Job {
        let parents = self.parents.clone();
        let functor = Arc::clone(&self.functor);
        Box::new(move || {
            let nodes = parents.nodes();
            run_cycle(
                &task,
                &cell,
                &repr,
                &nodes,
                || {
                    let winner = parents.wait_any();
                    parents.cancel_all_but(&winner);
                    winner.future().get()
                },
                |value| functor(value),
            );
        })
    }

    fn clone_body(&self, cache: &mut CloneCache) -> TaskResult<Box<dyn TaskBody<T>>> {
        Ok(Box::new(Self {
            parents: self.parents.clone_with(cache)?,
            functor: Arc::clone(&self.functor),
            _marker: PhantomData,
        }))
    }
}

/// The functor takes no input but only runs once every parent resolved;
/// parent failures propagate.
pub(crate) struct WaitBody<T, P, F> {
    parents: P,
    functor: Arc<F>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, P, F> WaitBody<T, P, F> {
    pub(crate) fn new(functor: F, parents: P) -> Self {
        Self {
            parents,
            functor: Arc::new(functor),
            _marker: PhantomData,
        }
    }
}

impl<T, P, F> TaskBody<T> for WaitBody<T, P, F>
where
    T: Clone + Send + 'static,
    P: Parents,
    F: Fn() -> TaskResult<T> + Send + Sync + 'static,
{
    fn parent_nodes(&self) -> Vec<Arc<dyn GraphNode>> {
        self.parents.nodes()
    }

    fn make_job(&self, task: Weak<TaskInner<T>>, cell: Arc<ResultCell<T>>, repr: String) -> Job {
        let parents = self.parents.clone();
        let functor = Arc::clone(&self.functor);
        Box::new(move || {
            let nodes = parents.nodes();
            run_cycle(
                &task,
                &cell,
                &repr,
                &nodes,
                || parents.outcomes(),
                |()| functor(),
            );
        })
    }

    fn clone_body(&self, cache: &mut CloneCache) -> TaskResult<Box<dyn TaskBody<T>>> {
        Ok(Box::new(Self {
            parents: self.parents.clone_with(cache)?,
            functor: Arc::clone(&self.functor),
            _marker: PhantomData,
        }))
    }
}

/// The functor takes no input and runs once the first parent resolved;
/// the winner's failure propagates and the losers are canceled.
pub(crate) struct WaitAnyBody<T, P, F> {
    parents: P,
    functor: Arc<F>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, P, F> WaitAnyBody<T, P, F> {
    pub(crate) fn new(functor: F, parents: P) -> Self {
        Self {
            parents,
            functor: Arc::new(functor),
            _marker: PhantomData,
        }
    }
}

impl<T, P, F> TaskBody<T> for WaitAnyBody<T, P, F>
where
    T: Clone + Send + 'static,
    P: AnyParents,
    F: Fn() -> TaskResult<T> + Send + Sync + 'static,
{
    fn parent_nodes(&self) -> Vec<Arc<dyn GraphNode>> {
        self.parents.nodes()
    }

    fn make_job(&self, task: Weak<TaskInner<T>>, cell: Arc<ResultCell<T>>, repr: String) -> Job {
        let parents = self.parents.clone();
        let functor = Arc::clone(&self.functor);
        Box::new(move || {
            let nodes = parents.nodes();
            run_cycle(
                &task,
                &cell,
                &repr,
                &nodes,
                || {
                    let winner = parents.wait_any();
                    parents.cancel_all_but(&winner);
                    winner.future().outcome()
                },
                |()| functor(),
            );
        })
    }

    fn clone_body(&self, cache: &mut CloneCache) -> TaskResult<Box<dyn TaskBody<T>>> {
        Ok(Box::new(Self {
            parents: self.parents.clone_with(cache)?,
            functor: Arc::clone(&self.functor),
            _marker: PhantomData,
        }))
    }
}
