//! End-to-end behaviour of the wait loop through the public builder.
//!
//! Nothing here touches the global defaults registry; every wait overrides
//! the fields it depends on.

use parking_lot::Mutex;
use pollwait::{Prerequisite, Wait, WaitError, WaitLogger, WaitStrategy};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A wait that never relies on global state and polls quickly.
fn fast(timeout: Duration) -> Wait {
    Wait::new()
        .timeout(timeout)
        .polling(Duration::ZERO, ms(1))
        .exception_handling(true, false)
        .strategy(WaitStrategy::Linear)
        .metrics(false)
        .prereqs(Vec::new())
}

#[derive(Debug, PartialEq)]
struct Flaky(u32);

impl fmt::Display for Flaky {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flaky on check {}", self.0)
    }
}

impl std::error::Error for Flaky {}

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

impl WaitLogger for Recorder {
    fn on_wait_start(&self, condition: &str, timeout: Duration) {
        self.0
            .lock()
            .push(format!("start:{condition}:{}", timeout.as_millis()));
    }

    fn on_condition_check(&self, condition: &str, succeeded: bool, _elapsed: Duration) {
        self.0.lock().push(format!("check:{condition}:{succeeded}"));
    }

    fn on_wait_success(&self, condition: &str, _elapsed: Duration, checks: u32) {
        self.0.lock().push(format!("success:{condition}:{checks}"));
    }

    fn on_timeout(&self, condition: &str, timeout: Duration) {
        self.0
            .lock()
            .push(format!("timeout:{condition}:{}", timeout.as_millis()));
    }

    fn on_cancellation(&self, condition: &str) {
        self.0.lock().push(format!("cancel:{condition}"));
    }
}

#[test]
fn test_already_true_still_runs_poll_delay() {
    let start = Instant::now();
    let outcome = fast(Duration::from_secs(1))
        .poll_delay(ms(20))
        .until(|| true)
        .unwrap();

    assert!(outcome.satisfied);
    assert_eq!(outcome.checks, 1);
    assert!(start.elapsed() >= ms(20));
}

#[test]
fn test_end_to_end_linear_with_metrics() {
    let mut calls = 0;
    let start = Instant::now();
    let outcome = Wait::new()
        .timeout(Duration::from_secs(1))
        .polling(ms(10), ms(10))
        .strategy(WaitStrategy::Linear)
        .metrics(true)
        .until(|| {
            calls += 1;
            calls > 2
        })
        .unwrap();

    assert!(start.elapsed() >= ms(60));
    let m = outcome.metrics.expect("metrics enabled");
    assert_eq!(m.condition_checks, 3);
    assert!(m.was_successful);
    assert!(m.total_time >= ms(60));
    assert!(m.min_check_time <= m.max_check_time);
    assert_eq!(m.average_check_time(), m.total_time / 3);
    assert!(m.poll_delay_time >= ms(30));
    assert!(m.poll_interval_time >= ms(30));
    assert_eq!(m.configured_timeout, Duration::from_secs(1));
    assert_eq!(m.configured_poll_delay, ms(10));
    assert_eq!(m.configured_poll_interval, ms(10));
}

#[test]
fn test_metrics_absent_when_disabled() {
    let outcome = fast(Duration::from_secs(1)).until(|| true).unwrap();
    assert!(outcome.metrics().is_none());
}

#[test]
fn test_timeout_message_without_alias() {
    let err = fast(ms(50)).until(|| false).unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(
        err.to_string(),
        "Condition was not fulfilled within 00:00:00.0500000."
    );
}

#[test]
fn test_timeout_message_with_alias() {
    let err = fast(Duration::from_secs(1))
        .alias("a")
        .poll_interval(ms(50))
        .until(|| false)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Condition with alias 'a' was not fulfilled within 00:00:01."
    );
}

#[test]
fn test_fail_silently_returns_unsatisfied() {
    let outcome = fast(ms(30))
        .fail_silently(true)
        .metrics(true)
        .until(|| false)
        .unwrap();

    assert!(!outcome.is_satisfied());
    assert!(outcome.checks >= 1);
    let m = outcome.metrics.unwrap();
    assert!(!m.was_successful);
    assert_eq!(m.condition_checks, outcome.checks);
}

#[test]
fn test_ignored_errors_count_as_failed_checks() {
    let mut check = 0;
    let outcome = fast(Duration::from_secs(1))
        .ignore_exceptions(true)
        .try_until(|| {
            check += 1;
            if check == 2 {
                Err(Flaky(check))
            } else {
                Ok(check >= 3)
            }
        })
        .unwrap();

    assert_eq!(outcome.checks, 3);
}

#[test]
fn test_errors_propagate_verbatim_when_not_ignored() {
    let mut check = 0;
    let err = fast(Duration::from_secs(1))
        .ignore_exceptions(false)
        .fail_silently(true)
        .try_until(|| {
            check += 1;
            if check == 2 {
                Err(Flaky(check))
            } else {
                Ok(check >= 3)
            }
        })
        .unwrap_err();

    // no further checks after the failing one
    assert_eq!(check, 2);
    assert!(!err.is_timeout());
    let source = err.into_source().unwrap();
    assert_eq!(source.downcast_ref::<Flaky>(), Some(&Flaky(2)));
}

#[test]
fn test_until_false_and_until_value() {
    let mut remaining = 3;
    let outcome = fast(Duration::from_secs(1))
        .until_false(|| {
            remaining -= 1;
            remaining > 0
        })
        .unwrap();
    assert_eq!(outcome.checks, 3);

    let outcome = fast(Duration::from_secs(1))
        .until_value(false, || false)
        .unwrap();
    assert_eq!(outcome.checks, 1);

    let outcome = fast(Duration::from_secs(1))
        .try_until_false(|| Ok::<_, Flaky>(false))
        .unwrap();
    assert!(outcome.satisfied);
}

#[test]
fn test_prereqs_run_in_order_before_every_check() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let first = Arc::clone(&trace);
    let second = Arc::clone(&trace);

    let mut checks = 0;
    fast(Duration::from_secs(1))
        .prereqs([
            Prerequisite::new(move || first.lock().push("first")),
            Prerequisite::new(move || second.lock().push("second")),
        ])
        .until(|| {
            trace.lock().push("check");
            checks += 1;
            checks == 2
        })
        .unwrap();

    assert_eq!(
        *trace.lock(),
        ["first", "second", "check", "first", "second", "check"]
    );
}

#[test]
fn test_failing_prereq_propagates_when_not_ignored() {
    let mut evaluated = false;
    let err = fast(Duration::from_secs(1))
        .ignore_exceptions(false)
        .prereqs([
            Prerequisite::new(|| {}),
            Prerequisite::fallible(|| Err::<(), _>(Flaky(0))),
        ])
        .until(|| {
            evaluated = true;
            true
        })
        .unwrap_err();

    assert!(!evaluated);
    assert!(matches!(err, WaitError::Prerequisite { index: 1, .. }));
    assert_eq!(err.to_string(), "prerequisite #1 failed: flaky on check 0");
}

#[test]
fn test_failing_prereq_ignored() {
    let outcome = fast(Duration::from_secs(1))
        .try_prereq(|| Err::<(), _>("transient"))
        .until(|| true)
        .unwrap();
    assert!(outcome.satisfied);
}

#[test]
fn test_logger_sees_events_in_order() {
    let recorder = Arc::new(Recorder::default());
    let mut calls = 0;
    fast(ms(500))
        .alias("db")
        .shared_logger(recorder.clone())
        .until(|| {
            calls += 1;
            calls == 2
        })
        .unwrap();

    assert_eq!(
        recorder.events(),
        ["start:db:500", "check:db:false", "check:db:true", "success:db:2"]
    );
}

#[test]
fn test_logger_timeout_uses_default_name() {
    let recorder = Arc::new(Recorder::default());
    let _ = fast(ms(20))
        .shared_logger(recorder.clone())
        .until(|| false)
        .unwrap_err();

    let events = recorder.events();
    assert_eq!(events.first().map(String::as_str), Some("start:condition:20"));
    assert_eq!(events.last().map(String::as_str), Some("timeout:condition:20"));
    assert!(events[1..events.len() - 1]
        .iter()
        .all(|e| e == "check:condition:false"));
}

#[test]
fn test_silent_timeout_skips_timeout_event() {
    let recorder = Arc::new(Recorder::default());
    fast(ms(20))
        .fail_silently(true)
        .shared_logger(recorder.clone())
        .until(|| false)
        .unwrap();

    assert!(!recorder.events().iter().any(|e| e.starts_with("timeout")));
}

struct Exploding;

impl WaitLogger for Exploding {
    fn on_wait_start(&self, _condition: &str, _timeout: Duration) {}

    fn on_condition_check(&self, _condition: &str, _succeeded: bool, _elapsed: Duration) {
        panic!("sink failure");
    }

    fn on_wait_success(&self, _condition: &str, _elapsed: Duration, _checks: u32) {}

    fn on_timeout(&self, _condition: &str, _timeout: Duration) {}

    fn on_cancellation(&self, _condition: &str) {}
}

#[test]
#[should_panic(expected = "sink failure")]
fn test_panicking_sink_aborts_wait() {
    let _ = fast(Duration::from_secs(1)).logger(Exploding).until(|| true);
}

#[test]
fn test_zero_timeout_checks_exactly_once() {
    let mut calls = 0;
    let outcome = fast(Duration::ZERO)
        .fail_silently(true)
        .until(|| {
            calls += 1;
            false
        })
        .unwrap();
    assert_eq!(calls, 1);
    assert_eq!(outcome.checks, 1);
}

#[test]
fn test_exponential_backoff_spaces_checks() {
    let mut stamps = Vec::new();
    let start = Instant::now();
    fast(ms(400))
        .poll_interval(ms(5))
        .strategy(WaitStrategy::ExponentialBackoff)
        .fail_silently(true)
        .until(|| {
            stamps.push(start.elapsed());
            false
        })
        .unwrap();

    // 5, 10, 20, 40, 80, then capped at 100ms
    assert!(stamps.len() >= 4);
    assert!(stamps.len() < 12);
    let gap = |i: usize| stamps[i + 1] - stamps[i];
    assert!(gap(2) >= ms(20));
}

/// Gaps between the end of one check and the start of the next.
fn check_gaps(collect_metrics: bool) -> Vec<Duration> {
    let mut spans: Vec<(Instant, Instant)> = Vec::new();
    fast(Duration::from_secs(5))
        .poll_interval(ms(20))
        .strategy(WaitStrategy::Adaptive)
        .metrics(collect_metrics)
        .until(|| {
            let began = Instant::now();
            // slower than the base interval, so the measured average exceeds it
            std::thread::sleep(ms(30));
            spans.push((began, Instant::now()));
            spans.len() == 5
        })
        .unwrap();

    spans
        .windows(2)
        .map(|pair| pair[1].0 - pair[0].1)
        .collect()
}

#[test]
fn test_adaptive_slows_down_once_metrics_show_slow_checks() {
    let gaps = check_gaps(true);
    assert_eq!(gaps.len(), 4);

    // one sample is not enough to adapt
    assert!(gaps[0] >= ms(20));
    assert!(gaps[0] < ms(40), "first gap already adapted: {:?}", gaps[0]);
    for gap in &gaps[1..] {
        assert!(*gap >= ms(40), "gap not doubled: {gap:?}");
    }
}

#[test]
fn test_adaptive_without_metrics_keeps_base_interval() {
    let gaps = check_gaps(false);
    assert_eq!(gaps.len(), 4);
    for gap in &gaps {
        assert!(*gap >= ms(20));
        assert!(*gap < ms(40), "gap changed without metrics: {gap:?}");
    }
}
