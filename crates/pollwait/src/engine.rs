//! The polling loop.
//!
//! One invocation runs to exactly one conclusion:
//!
//! ```text
//!            ┌──────────── cancelled? ──────────► Cancelled
//!            │
//!  start ──► loop: prereqs ─► poll delay ─► check ─► poll interval
//!            │                                  │
//!            │◄──── not satisfied, time left ───┘
//!            │
//!            ├──── satisfied ─────────────────► Succeeded
//!            └──── out of time ───────────────► TimedOut (error or silent)
//! ```
//!
//! A predicate or prerequisite error with `ignore_exceptions == false`
//! leaves the loop immediately, skipping timeout handling, cancellation
//! handling and metrics finalization.

use crate::cancel::{pause, CancellationToken};
use crate::config::EffectiveConfig;
use crate::error::{BoxError, Result, WaitError};
use crate::metrics::WaitMetrics;
use crate::strategy::PacingCalculator;
use std::time::{Duration, Instant};

/// Result of a wait that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOutcome {
    /// `true` if the predicate reached the expected value. Only `false`
    /// when the wait timed out with `fail_silently` set.
    pub satisfied: bool,
    /// Number of predicate evaluations.
    pub checks: u32,
    /// Wall-clock duration of the wait.
    pub elapsed: Duration,
    /// Collected metrics, when enabled.
    pub metrics: Option<WaitMetrics>,
}

impl WaitOutcome {
    #[inline]
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    #[inline]
    pub fn metrics(&self) -> Option<&WaitMetrics> {
        self.metrics.as_ref()
    }
}

/// Polls `predicate` until it returns `expected`, the timeout elapses or
/// `cancel` fires.
pub(crate) fn run<F, E>(
    config: &EffectiveConfig,
    cancel: Option<&CancellationToken>,
    expected: bool,
    mut predicate: F,
) -> Result<WaitOutcome>
where
    F: FnMut() -> Result<bool, E>,
    E: Into<BoxError>,
{
    let condition = config.condition_name();
    let pacing = PacingCalculator::new(
        config.strategy,
        config.poll_delay,
        config.poll_interval,
        config.timeout,
    );
    let span = tracing::debug_span!(
        target: "pollwait",
        "wait",
        condition,
        timeout = ?config.timeout,
        strategy = %pacing.strategy(),
        expected,
    );
    let _entered = span.enter();

    let start = Instant::now();
    config.logger.on_wait_start(condition, config.timeout);

    let mut metrics = config.collect_metrics.then(|| {
        WaitMetrics::for_wait(
            config.alias.as_deref(),
            config.timeout,
            config.poll_delay,
            config.poll_interval,
        )
    });
    let mut satisfied = false;
    let mut checks: u32 = 0;

    // The first iteration always runs, so a zero timeout still checks once.
    while !satisfied && (checks == 0 || start.elapsed() < config.timeout) {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(cancelled(config, checks));
        }

        run_prereqs(config)?;

        let delay = pacing.initial_delay();
        tracing::trace!(target: "pollwait", ?delay, "poll delay");
        let slept_from = Instant::now();
        if pause(cancel, delay) {
            return Err(cancelled(config, checks));
        }
        if let Some(m) = metrics.as_mut() {
            m.record_poll_delay(slept_from.elapsed());
        }

        let check_start = Instant::now();
        satisfied = match predicate() {
            Ok(value) => value == expected,
            Err(err) if config.ignore_exceptions => {
                let err: BoxError = err.into();
                tracing::debug!(target: "pollwait", error = %err, "ignoring predicate error");
                false
            }
            Err(err) => return Err(WaitError::Condition(err.into())),
        };
        let check_time = check_start.elapsed();
        checks = checks.saturating_add(1);

        let elapsed = start.elapsed();
        if let Some(m) = metrics.as_mut() {
            m.record_check(check_time, elapsed);
        }
        config.logger.on_condition_check(condition, satisfied, elapsed);
        tracing::trace!(target: "pollwait", checks, satisfied, ?check_time, "condition checked");

        let interval = pacing.interval_delay(checks, metrics.as_ref());
        tracing::trace!(target: "pollwait", ?interval, "poll interval");
        let slept_from = Instant::now();
        let interrupted = pause(cancel, interval);
        if let Some(m) = metrics.as_mut() {
            m.record_poll_interval(slept_from.elapsed());
        }
        // A satisfied check stands even if cancellation lands during the
        // trailing interval.
        if interrupted && !satisfied {
            return Err(cancelled(config, checks));
        }
    }

    let elapsed = start.elapsed();
    if let Some(m) = metrics.as_mut() {
        m.finish(satisfied, elapsed);
    }
    let outcome = WaitOutcome {
        satisfied,
        checks,
        elapsed,
        metrics,
    };

    if satisfied {
        tracing::debug!(target: "pollwait", checks, ?elapsed, "wait succeeded");
        config.logger.on_wait_success(condition, elapsed, checks);
        return Ok(outcome);
    }

    if config.fail_silently {
        tracing::debug!(target: "pollwait", checks, ?elapsed, "wait timed out silently");
        return Ok(outcome);
    }

    tracing::debug!(target: "pollwait", checks, ?elapsed, "wait timed out");
    config.logger.on_timeout(condition, config.timeout);
    Err(WaitError::TimedOut {
        alias: config.alias.clone().filter(|alias| !alias.is_empty()),
        timeout: config.timeout,
    })
}

fn run_prereqs(config: &EffectiveConfig) -> Result<()> {
    for (index, prereq) in config.prereqs.iter().enumerate() {
        if let Err(source) = prereq.run() {
            if !config.ignore_exceptions {
                return Err(WaitError::Prerequisite { index, source });
            }
            tracing::debug!(target: "pollwait", index, error = %source, "ignoring prerequisite error");
        }
    }
    Ok(())
}

fn cancelled(config: &EffectiveConfig, checks: u32) -> WaitError {
    let condition = config.condition_name();
    tracing::debug!(target: "pollwait", checks, "wait cancelled");
    config.logger.on_cancellation(condition);
    WaitError::Cancelled {
        condition: condition.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn fast_config() -> EffectiveConfig {
        EffectiveConfig {
            timeout: Duration::from_millis(200),
            poll_delay: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            ..EffectiveConfig::default()
        }
    }

    #[test]
    fn test_already_true_checks_once() {
        let outcome = run(&fast_config(), None, true, || Ok::<_, Infallible>(true)).unwrap();
        assert!(outcome.satisfied);
        assert_eq!(outcome.checks, 1);
        assert!(outcome.metrics.is_none());
    }

    #[test]
    fn test_expected_false() {
        let mut calls = 0;
        let outcome = run(&fast_config(), None, false, || {
            calls += 1;
            Ok::<_, Infallible>(calls < 3)
        })
        .unwrap();
        assert!(outcome.satisfied);
        assert_eq!(outcome.checks, 3);
    }

    #[test]
    fn test_zero_timeout_checks_once() {
        let config = EffectiveConfig {
            timeout: Duration::ZERO,
            fail_silently: true,
            ..fast_config()
        };
        let outcome = run(&config, None, true, || Ok::<_, Infallible>(false)).unwrap();
        assert!(!outcome.satisfied);
        assert_eq!(outcome.checks, 1);
    }

    #[test]
    fn test_timeout_error_carries_alias() {
        let config = EffectiveConfig {
            timeout: Duration::from_millis(20),
            alias: Some("cache warm".into()),
            ..fast_config()
        };
        let err = run(&config, None, true, || Ok::<_, Infallible>(false)).unwrap_err();
        assert!(matches!(
            err,
            WaitError::TimedOut { ref alias, timeout }
                if alias.as_deref() == Some("cache warm") && timeout == Duration::from_millis(20)
        ));
    }

    #[test]
    fn test_pre_cancelled_skips_everything() {
        let token = CancellationToken::new();
        token.cancel();
        let mut called = false;
        let err = run(&fast_config(), Some(&token), true, || {
            called = true;
            Ok::<_, Infallible>(true)
        })
        .unwrap_err();
        assert!(err.is_cancelled());
        assert!(!called);
    }

    #[test]
    fn test_metrics_finalized_on_silent_timeout() {
        let config = EffectiveConfig {
            timeout: Duration::from_millis(10),
            fail_silently: true,
            collect_metrics: true,
            ..fast_config()
        };
        let outcome = run(&config, None, true, || Ok::<_, Infallible>(false)).unwrap();
        let m = outcome.metrics.unwrap();
        assert!(!m.was_successful);
        assert_eq!(m.condition_checks, outcome.checks);
        assert!(m.total_time >= Duration::from_millis(10));
    }
}
