use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::events::{ListenerSet, SharedListener, TaskEvent};
use crate::executors::SharedExecutor;
use crate::synca::OnSignal;
use crate::types::{TaskKind, TaskResult};

/// Opaque per-task user data.
pub type CustomData = Arc<dyn Any + Send + Sync>;

/// Timing sentinel meaning "never measured".
pub(crate) const TIME_UNSET: i64 = -1;

/// The untyped view of a task shared by graph traversals, executors,
/// listeners and the task pool. Every task in a graph is reachable through
/// this trait regardless of its result type.
pub trait GraphNode: Send + Sync {
    /// The composition kind, fixed at construction.
    fn kind(&self) -> TaskKind;

    /// The id assigned at finalization; dense within a finalized graph.
    fn id(&self) -> usize;

    /// Longest path length from a root to this task.
    fn level(&self) -> usize;

    fn name(&self) -> Option<String>;

    fn set_name(&self, name: Option<String>);

    fn priority(&self) -> i64;

    /// Assigns a priority. The engine does not act on it; custom executors
    /// may.
    fn set_priority(&self, priority: i64) -> TaskResult<()>;

    fn custom_data(&self) -> Option<CustomData>;

    fn set_custom_data(&self, data: CustomData) -> TaskResult<()>;

    fn remove_custom_data(&self) -> TaskResult<()>;

    /// Whether the cancel flag is currently up.
    fn canceled(&self) -> bool;

    /// Sets or clears the cancel flag. May be called from any thread at
    /// any time; a running functor observes it at its next cancel point.
    fn cancel(&self, flag: bool);

    /// The per-task executor override, if any.
    fn executor(&self) -> Option<SharedExecutor>;

    fn set_executor(&self, executor: SharedExecutor) -> TaskResult<()>;

    fn remove_executor(&self) -> TaskResult<()>;

    fn avg_idle_us(&self) -> i64;
    fn avg_wait_us(&self) -> i64;
    fn avg_run_us(&self) -> i64;
    fn set_avg_idle_us(&self, us: i64);
    fn set_avg_wait_us(&self, us: i64);
    fn set_avg_run_us(&self, us: i64);

    /// Stable identity of this node, usable as a map key across the typed
    /// and untyped views of the same task.
    fn key(&self) -> usize;

    /// Number of children wired to this task at construction time.
    fn child_count(&self) -> usize;

    /// One more child was wired onto this task during graph construction.
    fn increment_child_count(&self);

    /// True once the task entered a schedule cycle (or had a value or
    /// failure assigned) and was not reset since.
    fn was_scheduled(&self) -> bool;

    /// Non-blocking probe: resolved with a value or a failure.
    fn is_resolved(&self) -> bool;

    /// An owning handle to this node, for listeners that need to move the
    /// task onto another thread.
    fn to_shared(&self) -> Arc<dyn GraphNode>;

    /// The task's parents, in declaration order.
    fn parent_nodes(&self) -> Vec<Arc<dyn GraphNode>>;

    /// Marks the node visited for a depth-first traversal; returns false
    /// when it was already visited.
    fn mark_visited(&self) -> bool;

    fn clear_visited(&self);

    fn assign_id(&self, id: usize);

    /// One schedule cycle for this node, honoring the scheduling flag and
    /// the executor precedence (override, then argument, then inline).
    fn schedule_cycle(&self, executor: Option<&SharedExecutor>, reset: bool);

    /// Clears the result cell, re-enables scheduling and re-arms the
    /// refcount.
    fn reset(&self) -> TaskResult<()>;

    /// Releases the current result cell without re-enabling anything else;
    /// used by the releaser listener once all children consumed the result.
    fn clear_result(&self);

    /// One child consumed this task's result; at zero the after-satisfied
    /// event fires.
    fn decrement_refcount(&self);

    fn add_listener(&self, listener: SharedListener) -> TaskResult<()>;
    fn add_listener_for(&self, event: TaskEvent, listener: SharedListener) -> TaskResult<()>;
    fn remove_listener(&self, listener: &SharedListener) -> TaskResult<()>;
    fn remove_listener_for(&self, event: TaskEvent, listener: &SharedListener) -> TaskResult<()>;
    fn remove_listeners(&self) -> TaskResult<()>;
    fn remove_listeners_for(&self, event: TaskEvent) -> TaskResult<()>;

    /// Invokes every listener registered for the event, synchronously on
    /// the calling thread.
    fn raise_event(&self, event: TaskEvent);
}

/// The untyped state every task carries: identity, graph bookkeeping,
/// flags, listener registrations and timing counters.
pub(crate) struct NodeCore {
    pub(crate) kind: TaskKind,
    pub(crate) id: AtomicUsize,
    pub(crate) level: AtomicUsize,
    pub(crate) name: Mutex<Option<String>>,
    pub(crate) priority: AtomicI64,
    pub(crate) custom_data: Mutex<Option<CustomData>>,
    pub(crate) canceled: Arc<OnSignal>,
    pub(crate) schedule_enabled: AtomicBool,
    pub(crate) visited: AtomicBool,
    pub(crate) child_count: AtomicUsize,
    pub(crate) refcount: AtomicUsize,
    pub(crate) executor: Mutex<Option<SharedExecutor>>,
    pub(crate) listeners: ListenerSet,
    pub(crate) avg_idle_us: AtomicI64,
    pub(crate) avg_wait_us: AtomicI64,
    pub(crate) avg_run_us: AtomicI64,
}

impl NodeCore {
    pub(crate) fn new(kind: TaskKind, canceled: Arc<OnSignal>) -> Self {
        Self {
            kind,
            id: AtomicUsize::new(0),
            level: AtomicUsize::new(0),
            name: Mutex::new(None),
            priority: AtomicI64::new(0),
            custom_data: Mutex::new(None),
            canceled,
            schedule_enabled: AtomicBool::new(true),
            visited: AtomicBool::new(false),
            child_count: AtomicUsize::new(0),
            refcount: AtomicUsize::new(0),
            executor: Mutex::new(None),
            listeners: ListenerSet::default(),
            avg_idle_us: AtomicI64::new(TIME_UNSET),
            avg_wait_us: AtomicI64::new(TIME_UNSET),
            avg_run_us: AtomicI64::new(TIME_UNSET),
        }
    }

    /// Verbatim copy of every scalar attribute for the clone engine. The
    /// cancel flag value carries over onto a fresh signal so the clone and
    /// the original cancel independently.
    pub(crate) fn duplicate(&self) -> Self {
        let canceled = Arc::new(OnSignal::new());
        canceled.set(self.canceled.probe());

        Self {
            kind: self.kind,
            id: AtomicUsize::new(self.id.load(Ordering::Acquire)),
            level: AtomicUsize::new(self.level.load(Ordering::Acquire)),
            name: Mutex::new(self.name.lock().unwrap().clone()),
            priority: AtomicI64::new(self.priority.load(Ordering::Acquire)),
            custom_data: Mutex::new(self.custom_data.lock().unwrap().clone()),
            canceled,
            schedule_enabled: AtomicBool::new(self.schedule_enabled.load(Ordering::Acquire)),
            visited: AtomicBool::new(false),
            child_count: AtomicUsize::new(self.child_count.load(Ordering::Acquire)),
            refcount: AtomicUsize::new(self.child_count.load(Ordering::Acquire)),
            executor: Mutex::new(self.executor.lock().unwrap().clone()),
            listeners: self.listeners.duplicate(),
            avg_idle_us: AtomicI64::new(self.avg_idle_us.load(Ordering::Acquire)),
            avg_wait_us: AtomicI64::new(self.avg_wait_us.load(Ordering::Acquire)),
            avg_run_us: AtomicI64::new(self.avg_run_us.load(Ordering::Acquire)),
        }
    }
}
