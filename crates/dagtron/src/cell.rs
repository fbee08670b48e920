use std::sync::{Arc, Condvar, Mutex};

use crate::errors::TaskError;
use crate::types::TaskResult;

/// Lifecycle of a result cell. A task swaps in a fresh cell on every
/// schedule cycle, so a cell resolves at most once and handles taken in an
/// earlier cycle keep the resolution they observed.
#[derive(Debug)]
pub(crate) enum CellState<T> {
    /// The owning task was never scheduled, or its result was released.
    Idle,

    /// A runner is in flight and will publish into this cell.
    Pending,

    /// The functor produced a value.
    Ready(T),

    /// The functor failed, the task was canceled, or the task object died
    /// before its runner could resolve it.
    Failed(TaskError),
}

/// Snapshot of a cell used by the clone engine to pre-populate a cloned
/// task with the original's resolution.
pub(crate) enum CellSnapshot<T> {
    Unresolved,
    Ready(T),
    Failed(TaskError),
}

/// A one-shot, multi-observer result container. Resolution may be published
/// from any thread; any number of readers can block on it or probe it.
pub struct ResultCell<T> {
    state: Mutex<CellState<T>>,
    changed: Condvar,
}

impl<T> ResultCell<T> {
    pub(crate) fn idle() -> Self {
        Self::with_state(CellState::Idle)
    }

    pub(crate) fn pending() -> Self {
        Self::with_state(CellState::Pending)
    }

    pub(crate) fn ready(value: T) -> Self {
        Self::with_state(CellState::Ready(value))
    }

    pub(crate) fn failed(error: TaskError) -> Self {
        Self::with_state(CellState::Failed(error))
    }

    fn with_state(state: CellState<T>) -> Self {
        Self {
            state: Mutex::new(state),
            changed: Condvar::new(),
        }
    }

    /// Publishes a value and wakes every waiter. Publishing onto an already
    /// resolved cell replaces the previous resolution.
    pub(crate) fn publish_value(&self, value: T) {
        let mut state = self.state.lock().unwrap();
        *state = CellState::Ready(value);
        drop(state);
        self.changed.notify_all();
    }

    /// Publishes a failure and wakes every waiter.
    pub(crate) fn publish_error(&self, error: TaskError) {
        let mut state = self.state.lock().unwrap();
        *state = CellState::Failed(error);
        drop(state);
        self.changed.notify_all();
    }

    /// Blocks the caller until the cell is resolved. An idle cell has
    /// nothing to wait for and reports a control error instead.
    pub(crate) fn wait(&self) -> TaskResult<()> {
        let mut state = self.state.lock().unwrap();
        loop {
            match &*state {
                CellState::Idle => {
                    return Err(TaskError::control(
                        "result not available: task was not scheduled",
                    ))
                }
                CellState::Pending => {}
                CellState::Ready(_) | CellState::Failed(_) => return Ok(()),
            }
            state = self.changed.wait(state).unwrap();
        }
    }

    /// Non-blocking readiness probe.
    pub(crate) fn poll(&self) -> bool {
        let state = self.state.lock().unwrap();
        matches!(&*state, CellState::Ready(_) | CellState::Failed(_))
    }

    /// True once the cell entered a schedule cycle, i.e. it is anything but
    /// idle.
    pub(crate) fn entered_cycle(&self) -> bool {
        let state = self.state.lock().unwrap();
        !matches!(&*state, CellState::Idle)
    }

    /// Blocks until resolved, then propagates a stored failure without
    /// cloning the value.
    pub(crate) fn outcome(&self) -> TaskResult<()> {
        self.wait()?;
        let state = self.state.lock().unwrap();
        match &*state {
            CellState::Failed(error) => Err(error.clone()),
            _ => Ok(()),
        }
    }
}

impl<T: Clone> ResultCell<T> {
    /// Blocks until resolved, then returns the value or re-raises the
    /// stored failure.
    pub(crate) fn get(&self) -> TaskResult<T> {
        self.wait()?;
        let state = self.state.lock().unwrap();
        match &*state {
            CellState::Ready(value) => Ok(value.clone()),
            CellState::Failed(error) => Err(error.clone()),
            CellState::Idle | CellState::Pending => unreachable!("cell resolved by wait"),
        }
    }

    pub(crate) fn snapshot(&self) -> CellSnapshot<T> {
        let state = self.state.lock().unwrap();
        match &*state {
            CellState::Ready(value) => CellSnapshot::Ready(value.clone()),
            CellState::Failed(error) => CellSnapshot::Failed(error.clone()),
            CellState::Idle | CellState::Pending => CellSnapshot::Unresolved,
        }
    }
}

/// A shared read handle onto one schedule cycle's result cell. Cloneable
/// and observable from any number of threads; `accept` functors receive
/// these so they can inspect parent failures directly.
pub struct TaskFuture<T> {
    cell: Arc<ResultCell<T>>,
}

impl<T> TaskFuture<T> {
    pub(crate) fn new(cell: Arc<ResultCell<T>>) -> Self {
        Self { cell }
    }

    /// Blocks until the underlying cell is resolved.
    pub fn wait(&self) -> TaskResult<()> {
        self.cell.wait()
    }

    /// Non-blocking readiness probe.
    #[must_use]
    pub fn poll(&self) -> bool {
        self.cell.poll()
    }

    /// Blocks until resolved and propagates a stored failure, without
    /// touching the value.
    pub fn outcome(&self) -> TaskResult<()> {
        self.cell.outcome()
    }
}

impl<T: Clone> TaskFuture<T> {
    /// Blocks until resolved, then returns the value or re-raises the
    /// stored failure.
    pub fn get(&self) -> TaskResult<T> {
        self.cell.get()
    }
}

impl<T> Clone for TaskFuture<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}
