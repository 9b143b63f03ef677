//! Cancelable debounce timer.
//!
//! A [`Debouncer`] delays a task until input has been quiet for a fixed delay.
//! Scheduling again replaces the pending task, `cancel` drops it, and `shutdown`
//! (or dropping the debouncer) guarantees that nothing scheduled before it will
//! ever run.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct DebounceState {
    /// Bumped on every schedule; a timer only fires if it still owns the latest one
    generation: u64,
    pending: Option<CancellationToken>,
    closed: bool,
}

fn lock(state: &Mutex<DebounceState>) -> MutexGuard<'_, DebounceState> {
    state
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    state: Arc<Mutex<DebounceState>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: Arc::new(Mutex::new(DebounceState::default())),
        }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` once `delay` has elapsed without another call to `schedule`.
    ///
    /// Any previously pending task is cancelled. Returns false (and drops the
    /// task) after [`Self::shutdown`], or when called outside a tokio runtime,
    /// in which case the pending task is left untouched.
    pub fn schedule<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("Debounced task dropped: no tokio runtime on this thread");
            return false;
        };

        let (generation, token) = {
            let mut state = lock(&self.state);
            if state.closed {
                return false;
            }
            if let Some(previous) = state.pending.take() {
                previous.cancel();
            }
            state.generation += 1;
            let token = CancellationToken::new();
            state.pending = Some(token.clone());
            (state.generation, token)
        };

        let state = Arc::clone(&self.state);
        let delay = self.delay;
        handle.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let fire = {
                        let mut state = lock(&state);
                        let current = !state.closed && state.generation == generation;
                        if current {
                            state.pending = None;
                        }
                        current && !token.is_cancelled()
                    };
                    if fire {
                        task();
                    }
                }
            }
        });
        true
    }

    /// Drop the pending task, if any.
    pub fn cancel(&self) {
        if let Some(token) = lock(&self.state).pending.take() {
            token.cancel();
        }
    }

    /// Cancel the pending task and refuse all further scheduling.
    pub fn shutdown(&self) {
        let mut state = lock(&self.state);
        state.closed = true;
        if let Some(token) = state.pending.take() {
            token.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
