use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cell::TaskFuture;
use crate::clone::CloneCache;
use crate::errors::TaskError;
use crate::node::GraphNode;
use crate::task::Task;
use crate::types::TaskResult;

/// How long the any-wait loop sleeps between probes of the parent cells.
const ANY_WAIT_PROBE: Duration = Duration::from_micros(1);

/// An ordered sequence of parent handles. Implemented for tuples of tasks
/// with mixed result types (static arity, up to eight parents) and for
/// [`ParentList`] (dynamic arity, one result type).
pub trait Parents: Clone + Send + Sync + 'static {
    /// What an `accept` functor receives: one result handle per parent.
    type Futures: Send;

    /// What a `consume` functor receives: one resolved value per parent.
    type Values: Send;

    /// The untyped node view of every parent, in declaration order.
    fn nodes(&self) -> Vec<Arc<dyn GraphNode>>;

    /// Blocks until every parent cell resolved, value or failure alike.
    fn wait_all(&self) -> TaskResult<()>;

    /// Result handles for the parents' current cycles.
    fn futures(&self) -> Self::Futures;

    /// Blocks until every parent resolved, then collects the values,
    /// re-raising the first stored failure.
    fn values(&self) -> TaskResult<Self::Values>;

    /// Blocks until every parent resolved and propagates stored failures
    /// without touching the values.
    fn outcomes(&self) -> TaskResult<()>;

    /// Structural clone through the identity cache of a graph clone.
    fn clone_with(&self, cache: &mut CloneCache) -> TaskResult<Self>
    where
        Self: Sized;
}

/// Parent sequences whose members share one result type, enabling the
/// `…any` kinds: advance on the first parent to resolve and cancel the
/// rest.
pub trait AnyParents: Parents {
    /// The shared result type of the parents.
    type Winner: Clone + Send + 'static;

    /// Blocks until one parent resolves and returns it. A parent that was
    /// never scheduled counts as resolved so the loop cannot spin forever;
    /// reading its result then reports the control error.
    fn wait_any(&self) -> Task<Self::Winner>;

    /// Flags every parent but the winner as canceled.
    fn cancel_all_but(&self, winner: &Task<Self::Winner>);
}

/// Polls a set of candidate parents until one of them is done.
fn wait_any_of<P: Clone + Send + 'static>(candidates: &[&Task<P>]) -> Task<P> {
    loop {
        for parent in candidates {
            if !parent.was_scheduled() || parent.future().poll() {
                return (*parent).clone();
            }
        }
        thread::sleep(ANY_WAIT_PROBE);
    }
}

// Single-parent sequences expose the parent's handle and value directly
// rather than through a one-element tuple, which keeps `then_*` functors
// free of tuple plumbing.
impl<A> Parents for (Task<A>,)
where
    A: Clone + Send + 'static,
{
    type Futures = TaskFuture<A>;
    type Values = A;

    fn nodes(&self) -> Vec<Arc<dyn GraphNode>> {
        vec![self.0.as_node()]
    }

    fn wait_all(&self) -> TaskResult<()> {
        self.0.future().wait()
    }

    fn futures(&self) -> Self::Futures {
        self.0.future()
    }

    fn values(&self) -> TaskResult<Self::Values> {
        self.0.future().get()
    }

    fn outcomes(&self) -> TaskResult<()> {
        self.0.future().outcome()
    }

    fn clone_with(&self, cache: &mut CloneCache) -> TaskResult<Self> {
        Ok((self.0.clone_with(cache)?,))
    }
}

impl<P> AnyParents for (Task<P>,)
where
    P: Clone + Send + 'static,
{
    type Winner = P;

    fn wait_any(&self) -> Task<P> {
        wait_any_of(&[&self.0])
    }

    fn cancel_all_but(&self, winner: &Task<P>) {
        if !winner.same_task(&self.0) {
            self.0.as_node().cancel(true);
        }
    }
}

macro_rules! parents_tuple {
    ($(($T:ident, $idx:tt)),+) => {
        impl<$($T),+> Parents for ($(Task<$T>,)+)
        where
            $($T: Clone + Send + 'static),+
        {
            type Futures = ($(TaskFuture<$T>,)+);
            type Values = ($($T,)+);

            fn nodes(&self) -> Vec<Arc<dyn GraphNode>> {
                vec![$(self.$idx.as_node()),+]
            }

            fn wait_all(&self) -> TaskResult<()> {
                $(self.$idx.future().wait()?;)+
                Ok(())
            }

            fn futures(&self) -> Self::Futures {
                ($(self.$idx.future(),)+)
            }

            fn values(&self) -> TaskResult<Self::Values> {
                Ok(($(self.$idx.future().get()?,)+))
            }

            fn outcomes(&self) -> TaskResult<()> {
                $(self.$idx.future().outcome()?;)+
                Ok(())
            }

            fn clone_with(&self, cache: &mut CloneCache) -> TaskResult<Self> {
                Ok(($(self.$idx.clone_with(cache)?,)+))
            }
        }
    };
}

parents_tuple!((A, 0), (B, 1));
parents_tuple!((A, 0), (B, 1), (C, 2));
parents_tuple!((A, 0), (B, 1), (C, 2), (D, 3));
parents_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
parents_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
parents_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6));
parents_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7));

macro_rules! task_slot {
    ($P:ident, $idx:tt) => { Task<$P> };
}

macro_rules! any_parents_tuple {
    ($($idx:tt),+) => {
        impl<P> AnyParents for ($(task_slot!(P, $idx),)+)
        where
            P: Clone + Send + 'static,
        {
            type Winner = P;

            fn wait_any(&self) -> Task<P> {
                wait_any_of(&[$(&self.$idx),+])
            }

            fn cancel_all_but(&self, winner: &Task<P>) {
                $(
                    if !winner.same_task(&self.$idx) {
                        self.$idx.as_node().cancel(true);
                    }
                )+
            }
        }
    };
}

any_parents_tuple!(0, 1);
any_parents_tuple!(0, 1, 2);
any_parents_tuple!(0, 1, 2, 3);
any_parents_tuple!(0, 1, 2, 3, 4);
any_parents_tuple!(0, 1, 2, 3, 4, 5);
any_parents_tuple!(0, 1, 2, 3, 4, 5, 6);
any_parents_tuple!(0, 1, 2, 3, 4, 5, 6, 7);

/// A dynamic-arity parent sequence over one result type. The empty
/// sequence is rejected at construction so the `…any` kinds always have a
/// parent to wait for.
pub struct ParentList<P> {
    items: Vec<Task<P>>,
}

impl<P> ParentList<P>
where
    P: Clone + Send + 'static,
{
    pub fn new(items: Vec<Task<P>>) -> TaskResult<Self> {
        if items.is_empty() {
            return Err(TaskError::invalid_parameter("parents"));
        }
        Ok(Self { items })
    }

    #[must_use]
    pub fn items(&self) -> &[Task<P>] {
        &self.items
    }
}

impl<P> Clone for ParentList<P> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<P> TryFrom<Vec<Task<P>>> for ParentList<P>
where
    P: Clone + Send + 'static,
{
    type Error = TaskError;

    fn try_from(items: Vec<Task<P>>) -> TaskResult<Self> {
        Self::new(items)
    }
}

impl<P> Parents for ParentList<P>
where
    P: Clone + Send + 'static,
{
    type Futures = Vec<TaskFuture<P>>;
    type Values = Vec<P>;

    fn nodes(&self) -> Vec<Arc<dyn GraphNode>> {
        self.items.iter().map(Task::as_node).collect()
    }

    fn wait_all(&self) -> TaskResult<()> {
        for parent in &self.items {
            parent.future().wait()?;
        }
        Ok(())
    }

    fn futures(&self) -> Self::Futures {
        self.items.iter().map(Task::future).collect()
    }

    fn values(&self) -> TaskResult<Self::Values> {
        self.items
            .iter()
            .map(|parent| parent.future().get())
            .collect()
    }

    fn outcomes(&self) -> TaskResult<()> {
        for parent in &self.items {
            parent.future().outcome()?;
        }
        Ok(())
    }

    fn clone_with(&self, cache: &mut CloneCache) -> TaskResult<Self> {
        let items = self
            .items
            .iter()
            .map(|parent| parent.clone_with(cache))
            .collect::<TaskResult<Vec<_>>>()?;
        Ok(Self { items })
    }
}

impl<P> AnyParents for ParentList<P>
where
    P: Clone + Send + 'static,
{
    type Winner = P;

    fn wait_any(&self) -> Task<P> {
        let candidates: Vec<&Task<P>> = self.items.iter().collect();
        wait_any_of(&candidates)
    }

    fn cancel_all_but(&self, winner: &Task<P>) {
        for parent in &self.items {
            if !winner.same_task(parent) {
                parent.as_node().cancel(true);
            }
        }
    }
}
