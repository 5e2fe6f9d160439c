//! Pacing strategies: how long to sleep around each predicate check.

use crate::metrics::WaitMetrics;
use std::fmt;
use std::time::Duration;

/// Named pacing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaitStrategy {
    /// Constant poll delay and poll interval.
    #[default]
    Linear,
    /// Interval doubles after every check, capped at a quarter of the timeout.
    ExponentialBackoff,
    /// A quarter of the configured delays, never below 1ms.
    Aggressive,
    /// Twice the configured delays.
    Conservative,
    /// Interval tuned from the measured average check time.
    Adaptive,
}

impl fmt::Display for WaitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Linear => "Linear",
            Self::ExponentialBackoff => "ExponentialBackoff",
            Self::Aggressive => "Aggressive",
            Self::Conservative => "Conservative",
            Self::Adaptive => "Adaptive",
        })
    }
}

/// Computes the poll delay and poll interval for one wait invocation.
#[derive(Debug, Clone, Copy)]
pub struct PacingCalculator {
    strategy: WaitStrategy,
    poll_delay: Duration,
    poll_interval: Duration,
    timeout: Duration,
}

impl PacingCalculator {
    const MIN_AGGRESSIVE: Duration = Duration::from_millis(1);

    pub const fn new(
        strategy: WaitStrategy,
        poll_delay: Duration,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            strategy,
            poll_delay,
            poll_interval,
            timeout,
        }
    }

    #[inline]
    pub const fn strategy(&self) -> WaitStrategy {
        self.strategy
    }

    /// Sleep before each predicate evaluation.
    pub fn initial_delay(&self) -> Duration {
        match self.strategy {
            WaitStrategy::Linear | WaitStrategy::ExponentialBackoff | WaitStrategy::Adaptive => {
                self.poll_delay
            }
            WaitStrategy::Aggressive => (self.poll_delay / 4).max(Self::MIN_AGGRESSIVE),
            WaitStrategy::Conservative => self.poll_delay.saturating_mul(2),
        }
    }

    /// Sleep after the `check_count`-th predicate evaluation (1-based).
    ///
    /// `metrics` feeds the adaptive strategy; the others ignore it.
    pub fn interval_delay(&self, check_count: u32, metrics: Option<&WaitMetrics>) -> Duration {
        let check_count = check_count.max(1);
        match self.strategy {
            WaitStrategy::Linear => self.poll_interval,
            WaitStrategy::ExponentialBackoff => self.exponential(check_count),
            WaitStrategy::Aggressive => (self.poll_interval / 4).max(Self::MIN_AGGRESSIVE),
            WaitStrategy::Conservative => self.poll_interval.saturating_mul(2),
            WaitStrategy::Adaptive => self.adaptive(metrics),
        }
    }

    fn exponential(&self, check_count: u32) -> Duration {
        if check_count <= 1 {
            return self.poll_interval;
        }
        let factor = 1u32.checked_shl(check_count - 1).unwrap_or(u32::MAX);
        self.poll_interval
            .saturating_mul(factor)
            .min(self.timeout / 4)
    }

    fn adaptive(&self, metrics: Option<&WaitMetrics>) -> Duration {
        let Some(metrics) = metrics.filter(|m| m.condition_checks >= 2) else {
            return self.poll_interval;
        };
        let average = metrics.average_check_time();
        let base = self.poll_interval;

        if average < base / 10 {
            base / 2
        } else if average > base {
            base.saturating_mul(2)
        } else {
            base
        }
    }
}
