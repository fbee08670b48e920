use std::sync::Arc;

use crate::errors::TaskError;
use crate::synca::OnSignal;
use crate::types::TaskResult;

/// A cheap cloneable handle onto a task's cancel flag. Long-running
/// functors capture one and call [`CancelToken::checkpoint`] periodically;
/// once the flag goes up the checkpoint reports the cancellation and the
/// runner publishes it into the task's result cell.
///
/// A token can also be created standalone and adopted by the
/// `*_with_token` builders so a functor observes the flag of the very task
/// it runs in. Graph clones keep sharing such an externally created token.
pub struct CancelToken {
    signal: Arc<OnSignal>,
    repr: String,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self {
            signal: Arc::new(OnSignal::new()),
            repr: "token".to_owned(),
        }
    }

    pub(crate) fn from_parts(signal: Arc<OnSignal>, repr: String) -> Self {
        Self { signal, repr }
    }

    pub(crate) fn signal(&self) -> &Arc<OnSignal> {
        &self.signal
    }

    /// Raises the cancellation as an error when the flag is up. Functors
    /// call this at points where stopping is safe.
    pub fn checkpoint(&self) -> TaskResult<()> {
        if self.signal.probe() {
            return Err(TaskError::canceled(&self.repr));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.signal.probe()
    }

    /// Sets or clears the flag by hand, without going through the task.
    pub fn set(&self, flag: bool) {
        self.signal.set(flag);
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CancelToken {
    fn clone(&self) -> Self {
        Self {
            signal: Arc::clone(&self.signal),
            repr: self.repr.clone(),
        }
    }
}
