use crate::time::DurationDisplay;
use std::fmt;
use std::time::Duration;

/// Statistics collected over one wait invocation.
///
/// Only allocated when metrics collection is enabled for the wait.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitMetrics {
    /// Number of predicate evaluations.
    pub condition_checks: u32,
    /// Wall-clock time since the wait started.
    pub total_time: Duration,
    /// Fastest single predicate evaluation (`Duration::MAX` until the first check).
    pub min_check_time: Duration,
    /// Slowest single predicate evaluation.
    pub max_check_time: Duration,
    /// Time slept in poll delays.
    pub poll_delay_time: Duration,
    /// Time slept in poll intervals.
    pub poll_interval_time: Duration,
    pub was_successful: bool,
    pub condition_alias: Option<String>,
    pub configured_timeout: Duration,
    pub configured_poll_delay: Duration,
    pub configured_poll_interval: Duration,
}

impl Default for WaitMetrics {
    fn default() -> Self {
        Self {
            condition_checks: 0,
            total_time: Duration::ZERO,
            min_check_time: Duration::MAX,
            max_check_time: Duration::ZERO,
            poll_delay_time: Duration::ZERO,
            poll_interval_time: Duration::ZERO,
            was_successful: false,
            condition_alias: None,
            configured_timeout: Duration::ZERO,
            configured_poll_delay: Duration::ZERO,
            configured_poll_interval: Duration::ZERO,
        }
    }
}

impl WaitMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record with the configured values copied in.
    pub(crate) fn for_wait(
        alias: Option<&str>,
        timeout: Duration,
        poll_delay: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            condition_alias: alias.map(str::to_owned),
            configured_timeout: timeout,
            configured_poll_delay: poll_delay,
            configured_poll_interval: poll_interval,
            ..Self::default()
        }
    }

    /// `total_time / condition_checks`, or zero before the first check.
    pub fn average_check_time(&self) -> Duration {
        if self.condition_checks > 0 {
            self.total_time / self.condition_checks
        } else {
            Duration::ZERO
        }
    }

    /// Records one predicate evaluation.
    pub(crate) fn record_check(&mut self, check_time: Duration, elapsed: Duration) {
        self.condition_checks = self.condition_checks.saturating_add(1);
        self.total_time = elapsed;
        self.min_check_time = self.min_check_time.min(check_time);
        self.max_check_time = self.max_check_time.max(check_time);
    }

    pub(crate) fn record_poll_delay(&mut self, slept: Duration) {
        self.poll_delay_time = self.poll_delay_time.saturating_add(slept);
    }

    pub(crate) fn record_poll_interval(&mut self, slept: Duration) {
        self.poll_interval_time = self.poll_interval_time.saturating_add(slept);
    }

    /// Seals the record when the loop exits.
    pub(crate) fn finish(&mut self, successful: bool, elapsed: Duration) {
        self.was_successful = successful;
        self.total_time = elapsed;
    }
}

impl fmt::Display for WaitMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WaitMetrics: {} checks, {} total time, {}, avg: {}, min: {}, max: {}",
            self.condition_checks,
            DurationDisplay(self.total_time),
            if self.was_successful { "SUCCESS" } else { "FAILED" },
            DurationDisplay(self.average_check_time()),
            DurationDisplay(self.min_check_time),
            DurationDisplay(self.max_check_time),
        )
    }
}
