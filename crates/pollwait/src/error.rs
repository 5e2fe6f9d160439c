//! Error types for wait operations.

use crate::time::DurationDisplay;
use std::time::Duration;
use thiserror::Error;

/// Boxed error raised by a predicate or prerequisite.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = WaitError> = std::result::Result<T, E>;

/// Errors surfaced by a wait invocation or by time-constraint conversion.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The condition did not reach the expected value before the timeout.
    #[error("{}", timeout_message(.alias.as_deref(), .timeout))]
    TimedOut {
        /// Alias of the condition, if one was configured.
        alias: Option<String>,
        /// The configured timeout.
        timeout: Duration,
    },

    /// The cancellation token fired before the wait concluded.
    #[error("wait for {condition} was cancelled")]
    Cancelled {
        /// Alias of the condition, or `"condition"`.
        condition: String,
    },

    /// The predicate returned an error and exceptions are not ignored.
    #[error(transparent)]
    Condition(BoxError),

    /// A prerequisite returned an error and exceptions are not ignored.
    #[error("prerequisite #{index} failed: {source}")]
    Prerequisite {
        /// Position of the prerequisite in the configured list.
        index: usize,
        /// The error the prerequisite returned.
        source: BoxError,
    },

    /// A time unit name that does not map to any [`TimeUnit`](crate::TimeUnit).
    #[error("unsupported time unit: {0:?}")]
    UnsupportedUnit(String),

    /// A time-constraint value that cannot be turned into a duration.
    #[error("invalid duration value: {0}")]
    InvalidDuration(f64),
}

impl WaitError {
    /// Returns `true` if the wait ran out of time.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Returns `true` if the wait was cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns the error raised by the predicate or a prerequisite, if any.
    ///
    /// The returned box is the exact value the caller's closure produced, so
    /// it can be downcast back to its concrete type.
    pub fn into_source(self) -> Option<BoxError> {
        match self {
            Self::Condition(source) | Self::Prerequisite { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Builds the canonical timeout message.
///
/// An empty alias is treated as no alias.
pub(crate) fn timeout_message(alias: Option<&str>, timeout: &Duration) -> String {
    match alias.filter(|a| !a.is_empty()) {
        Some(alias) => format!(
            "Condition with alias '{alias}' was not fulfilled within {}.",
            DurationDisplay(*timeout)
        ),
        None => format!(
            "Condition was not fulfilled within {}.",
            DurationDisplay(*timeout)
        ),
    }
}
