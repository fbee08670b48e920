use std::sync::{Arc, Mutex};

use derive_more::Display;

use crate::node::GraphNode;

/// Lifecycle notifications raised by tasks. The thread a listener runs on
/// follows the event: scheduling events fire on the caller of `schedule*`,
/// run events fire on the worker executing the task, and the satisfied
/// event fires on whichever child consumed the parent's result last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TaskEvent {
    /// Just before a task is scheduled.
    #[display("before_scheduled")]
    BeforeScheduled,

    /// Just after the task's result cell was replaced.
    #[display("after_future_changed")]
    AfterFutureChanged,

    /// Just before a task's runner starts.
    #[display("before_started")]
    BeforeStarted,

    /// Just before a task's functor is invoked.
    #[display("before_invoked")]
    BeforeInvoked,

    /// Just after a task's runner finished, whatever the outcome.
    #[display("after_finished")]
    AfterFinished,

    /// Just after a task was canceled.
    #[display("after_canceled")]
    AfterCanceled,

    /// Just after a task satisfied all of its children with results.
    #[display("after_satisfied")]
    AfterSatisfied,

    /// Just after custom data was assigned to the task.
    #[display("after_custom_data_set")]
    AfterCustomDataSet,
}

impl TaskEvent {
    pub const COUNT: usize = 8;

    pub(crate) fn slot(self) -> usize {
        match self {
            Self::BeforeScheduled => 0,
            Self::AfterFutureChanged => 1,
            Self::BeforeStarted => 2,
            Self::BeforeInvoked => 3,
            Self::AfterFinished => 4,
            Self::AfterCanceled => 5,
            Self::AfterSatisfied => 6,
            Self::AfterCustomDataSet => 7,
        }
    }
}

/// The listener interface for task lifecycle events. Implementations may be
/// invoked from arbitrary threads depending on the event and must not
/// panic or block in ways that could deadlock the engine.
pub trait Listener: Send + Sync {
    fn on_event(&self, event: TaskEvent, task: &dyn GraphNode);
}

pub type SharedListener = Arc<dyn Listener>;

/// Per-task listener registrations, one ordered slot per event kind.
/// Duplicate registrations are allowed; removal drops every match.
pub(crate) struct ListenerSet {
    slots: Mutex<[Vec<SharedListener>; TaskEvent::COUNT]>,
}

impl Default for ListenerSet {
    fn default() -> Self {
        Self {
            slots: Mutex::new(std::array::from_fn(|_| Vec::new())),
        }
    }
}

impl ListenerSet {
    /// Registers the listener for every event kind.
    pub(crate) fn add(&self, listener: &SharedListener) {
        let mut slots = self.slots.lock().unwrap();
        for slot in slots.iter_mut() {
            slot.push(Arc::clone(listener));
        }
    }

    /// Registers the listener for one event kind only.
    pub(crate) fn add_for(&self, event: TaskEvent, listener: &SharedListener) {
        let mut slots = self.slots.lock().unwrap();
        slots[event.slot()].push(Arc::clone(listener));
    }

    /// Removes every registration of the listener, across all events.
    pub(crate) fn remove(&self, listener: &SharedListener) {
        let mut slots = self.slots.lock().unwrap();
        for slot in slots.iter_mut() {
            slot.retain(|existing| !Arc::ptr_eq(existing, listener));
        }
    }

    /// Removes every registration of the listener for one event kind.
    pub(crate) fn remove_for(&self, event: TaskEvent, listener: &SharedListener) {
        let mut slots = self.slots.lock().unwrap();
        slots[event.slot()].retain(|existing| !Arc::ptr_eq(existing, listener));
    }

    /// Drops all registrations.
    pub(crate) fn clear(&self) {
        let mut slots = self.slots.lock().unwrap();
        for slot in slots.iter_mut() {
            slot.clear();
        }
    }

    /// Drops all registrations for one event kind.
    pub(crate) fn clear_for(&self, event: TaskEvent) {
        let mut slots = self.slots.lock().unwrap();
        slots[event.slot()].clear();
    }

    /// Snapshot of the listeners registered for an event. Emission happens
    /// outside the registration lock so a listener may mutate the task it
    /// observes without deadlocking.
    pub(crate) fn snapshot_for(&self, event: TaskEvent) -> Vec<SharedListener> {
        let slots = self.slots.lock().unwrap();
        slots[event.slot()].clone()
    }

    /// Clones the whole registration table; used by the clone engine.
    pub(crate) fn duplicate(&self) -> Self {
        let slots = self.slots.lock().unwrap();
        Self {
            slots: Mutex::new(slots.clone()),
        }
    }
}
