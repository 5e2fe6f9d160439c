//! Cooperative cancellation for blocking waits.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct CancelState {
    /// Fast-path flag, mirrors `*lock` once set.
    cancelled: AtomicBool,
    lock: Mutex<bool>,
    wake: Condvar,
}

/// A cloneable signal for cancelling one or more waits.
///
/// All clones share state: cancelling any clone cancels them all. Only the
/// first call to [`cancel`](Self::cancel) has an effect.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<CancelState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every thread sleeping on it.
    pub fn cancel(&self) {
        let mut cancelled = self.state.lock.lock();
        if !*cancelled {
            *cancelled = true;
            self.state.cancelled.store(true, Ordering::Release);
            self.state.wake.notify_all();
        }
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Cancels the token from a background thread after `delay`.
    ///
    /// The timer thread holds a clone of the token; it is detached.
    pub fn cancel_after(&self, delay: Duration) {
        let token = self.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            token.cancel();
        });
    }

    /// Sleeps for `duration` unless the token is cancelled first.
    ///
    /// Returns `true` if the sleep ended because of cancellation.
    pub fn sleep(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return self.is_cancelled();
        }
        let Some(deadline) = Instant::now().checked_add(duration) else {
            let mut cancelled = self.state.lock.lock();
            while !*cancelled {
                self.state.wake.wait(&mut cancelled);
            }
            return true;
        };

        let mut cancelled = self.state.lock.lock();
        while !*cancelled {
            if self.state.wake.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

/// Sleeps on `token` when present, otherwise a plain thread sleep.
///
/// Returns `true` if the sleep was cut short by cancellation.
pub(crate) fn pause(token: Option<&CancellationToken>, duration: Duration) -> bool {
    match token {
        Some(token) => token.sleep(duration),
        None => {
            if !duration.is_zero() {
                thread::sleep(duration);
            }
            false
        }
    }
}
