// Small signaling primitives shared by the engine: a one-way atomic flag
// used for cancellation and executor shutdown, and a Condvar backed latch
// that lets worker threads sleep without eating CPU cycles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

/// Indicates the underlying signal to be set.
const SET: usize = 1;

/// Indicates the underlying signal was not set.
const UNSET: usize = 0;

/// A one-way flag that can be flipped from any thread and probed cheaply.
/// Tasks use one as their cancel flag; the thread pool uses one as its
/// kill signal.
#[derive(Debug)]
pub struct OnSignal {
    state: AtomicUsize,
}

impl Default for OnSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl OnSignal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AtomicUsize::new(UNSET),
        }
    }

    /// `turn_off` flips the state from SET to UNSET.
    #[inline]
    pub fn turn_off(&self) -> bool {
        self.state
            .compare_exchange(SET, UNSET, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
    }

    /// `turn_on` flips the state from UNSET to SET.
    #[inline]
    pub fn turn_on(&self) -> bool {
        self.state
            .compare_exchange(UNSET, SET, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
    }

    /// `set` drives the state to the requested value regardless of the
    /// current one.
    #[inline]
    pub fn set(&self, on: bool) {
        self.state
            .store(if on { SET } else { UNSET }, Ordering::SeqCst);
    }

    /// probe returns true when the state is SET else false.
    #[inline]
    pub fn probe(&self) -> bool {
        self.state.load(Ordering::Acquire) == SET
    }
}

/// LockState defines the underlying state of the Condvar based latch which
/// allows us to sleep a thread silently until a signal gets delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockState {
    Free,
    Locked,
    Released,
}

enum NotifyDirective {
    One,
    All,
}

/// LockSignal allows a thread to park itself until a signal gets delivered
/// via the underlying Condvar.
pub struct LockSignal {
    /// The condition variable used to wait on an event,
    /// also provides a way to awake a sleeping thread.
    event: Condvar,

    /// The mutex protecting the latch state.
    lock: Mutex<LockState>,
}

impl Default for LockSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl LockSignal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            event: Condvar::new(),
            lock: Mutex::new(LockState::Free),
        }
    }

    fn signal(&self, directive: &NotifyDirective) {
        let mut state = self.lock.lock().unwrap();
        *state = LockState::Released;
        drop(state);

        match directive {
            NotifyDirective::One => self.event.notify_one(),
            NotifyDirective::All => self.event.notify_all(),
        };
    }

    pub fn probe_locked(&self) -> bool {
        let current_state = self.lock.lock().unwrap();
        *current_state == LockState::Locked
    }

    /// `lock` arms the latch so a following [`LockSignal::wait`] actually
    /// blocks. Callers arm the latch, re-check their wake condition, then
    /// wait; a signal delivered in between is not lost.
    pub fn lock(&self) {
        let mut current_state = self.lock.lock().unwrap();
        if *current_state != LockState::Locked {
            *current_state = LockState::Locked;
        }
    }

    pub fn signal_one(&self) {
        self.signal(&NotifyDirective::One);
    }

    pub fn signal_all(&self) {
        self.signal(&NotifyDirective::All);
    }

    /// `wait` blocks the calling thread until the latch is released. When
    /// the latch is not armed the call returns immediately. A release wakes
    /// every waiter even though only one of them consumes the released
    /// state; the others observe the free state and return to re-check
    /// their wake condition.
    pub fn wait(&self) {
        let mut current_state = self.lock.lock().unwrap();
        loop {
            match *current_state {
                LockState::Free => return,
                LockState::Released => {
                    *current_state = LockState::Free;
                    return;
                }
                LockState::Locked => {}
            }
            current_state = self.event.wait(current_state).unwrap();
        }
    }
}
