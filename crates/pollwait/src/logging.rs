//! Logging sinks the wait loop reports to.
//!
//! The engine calls a [`WaitLogger`] at five points of every wait: start,
//! after each predicate check, on success, on timeout and on cancellation.
//! [`NullLogger`] is the default. [`TracingLogger`] forwards to `tracing`,
//! [`ConsoleLogger`] prints to stdout.
//!
//! A sink that panics aborts the wait: the engine does not catch panics
//! raised from these callbacks.

use std::sync::Arc;
use std::time::Duration;

/// Receives progress notifications from a wait invocation.
///
/// `condition` is the configured alias, or `"condition"` when none is set.
pub trait WaitLogger: Send + Sync {
    fn on_wait_start(&self, condition: &str, timeout: Duration);

    fn on_condition_check(&self, condition: &str, succeeded: bool, elapsed: Duration);

    fn on_wait_success(&self, condition: &str, elapsed: Duration, checks: u32);

    fn on_timeout(&self, condition: &str, timeout: Duration);

    fn on_cancellation(&self, condition: &str);
}

/// Shared handle to a logging sink.
pub type SharedLogger = Arc<dyn WaitLogger>;

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl NullLogger {
    /// A shared handle to the no-op sink.
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl WaitLogger for NullLogger {
    fn on_wait_start(&self, _condition: &str, _timeout: Duration) {}

    fn on_condition_check(&self, _condition: &str, _succeeded: bool, _elapsed: Duration) {}

    fn on_wait_success(&self, _condition: &str, _elapsed: Duration, _checks: u32) {}

    fn on_timeout(&self, _condition: &str, _timeout: Duration) {}

    fn on_cancellation(&self, _condition: &str) {}
}

/// Forwards notifications as `tracing` events under the `pollwait` target.
///
/// Start and checks are `debug`, success is `info`, timeout and
/// cancellation are `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl WaitLogger for TracingLogger {
    fn on_wait_start(&self, condition: &str, timeout: Duration) {
        tracing::debug!(target: "pollwait", condition, ?timeout, "starting wait");
    }

    fn on_condition_check(&self, condition: &str, succeeded: bool, elapsed: Duration) {
        tracing::debug!(target: "pollwait", condition, succeeded, ?elapsed, "condition check");
    }

    fn on_wait_success(&self, condition: &str, elapsed: Duration, checks: u32) {
        tracing::info!(target: "pollwait", condition, ?elapsed, checks, "wait succeeded");
    }

    fn on_timeout(&self, condition: &str, timeout: Duration) {
        tracing::warn!(target: "pollwait", condition, ?timeout, "wait timed out");
    }

    fn on_cancellation(&self, condition: &str) {
        tracing::warn!(target: "pollwait", condition, "wait cancelled");
    }
}

/// Writes one line per notification to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl ConsoleLogger {
    fn line(event: &str) {
        println!("[pollwait] {event}");
    }
}

impl WaitLogger for ConsoleLogger {
    fn on_wait_start(&self, condition: &str, timeout: Duration) {
        Self::line(&format!(
            "Starting wait: {condition} (timeout: {}ms)",
            timeout.as_millis()
        ));
    }

    fn on_condition_check(&self, condition: &str, succeeded: bool, elapsed: Duration) {
        let status = if succeeded { "PASS" } else { "FAIL" };
        Self::line(&format!(
            "{status} Condition check: {condition} (elapsed: {}ms)",
            elapsed.as_millis()
        ));
    }

    fn on_wait_success(&self, condition: &str, elapsed: Duration, checks: u32) {
        Self::line(&format!(
            "Success: {condition} completed in {}ms ({checks} checks)",
            elapsed.as_millis()
        ));
    }

    fn on_timeout(&self, condition: &str, timeout: Duration) {
        Self::line(&format!(
            "Timeout: {condition} exceeded {}ms",
            timeout.as_millis()
        ));
    }

    fn on_cancellation(&self, condition: &str) {
        Self::line(&format!("Cancelled: {condition}"));
    }
}
