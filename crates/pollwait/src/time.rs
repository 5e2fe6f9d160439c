//! Time units, time constraints and the canonical duration format.

use crate::error::{Result, WaitError};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Unit used when expressing timeouts, poll delays and poll intervals as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Milliseconds in one unit.
    const fn millis_per_unit(self) -> f64 {
        match self {
            Self::Millis => 1.0,
            Self::Seconds => 1_000.0,
            Self::Minutes => 60_000.0,
            Self::Hours => 3_600_000.0,
            Self::Days => 86_400_000.0,
        }
    }

    /// Converts `value` of this unit into a [`Duration`].
    ///
    /// Shorthand for `TimeConstraint::new(value, self).to_duration()`.
    #[inline]
    pub fn duration(self, value: f64) -> Result<Duration> {
        TimeConstraint::new(value, self).to_duration()
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Millis => "millis",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeUnit {
    type Err = WaitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ms" | "milli" | "millis" | "millisecond" | "milliseconds" => Ok(Self::Millis),
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(Self::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hour" | "hours" => Ok(Self::Hours),
            "d" | "day" | "days" => Ok(Self::Days),
            _ => Err(WaitError::UnsupportedUnit(s.to_owned())),
        }
    }
}

/// A numeric amount paired with a [`TimeUnit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeConstraint {
    value: f64,
    unit: TimeUnit,
}

impl TimeConstraint {
    /// Creates a new constraint. Fractional and negative values are accepted.
    pub const fn new(value: f64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    /// Parses a unit name and pairs it with `value`.
    ///
    /// Fails with [`WaitError::UnsupportedUnit`] for unknown unit names.
    pub fn parse(value: f64, unit: &str) -> Result<Self> {
        Ok(Self::new(value, unit.parse()?))
    }

    /// Converts the constraint into a [`Duration`].
    ///
    /// Negative values saturate to zero, values beyond the representable
    /// range saturate to [`Duration::MAX`], and NaN is rejected.
    pub fn to_duration(&self) -> Result<Duration> {
        if self.value.is_nan() {
            return Err(WaitError::InvalidDuration(self.value));
        }
        if self.value <= 0.0 {
            return Ok(Duration::ZERO);
        }
        let secs = self.value * self.unit.millis_per_unit() / 1_000.0;
        Ok(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }
}

/// Renders a [`Duration`] as `[d.]hh:mm:ss[.fffffff]`.
///
/// The fractional part has 100ns resolution and is omitted when zero, so
/// five seconds renders as `00:00:05` and 1.5 seconds as `00:00:01.5000000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationDisplay(pub Duration);

impl fmt::Display for DurationDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0.as_secs();
        let days = total_secs / 86_400;
        let hours = (total_secs / 3_600) % 24;
        let minutes = (total_secs / 60) % 60;
        let seconds = total_secs % 60;
        let ticks = self.0.subsec_nanos() / 100;

        if days > 0 {
            write!(f, "{days}.")?;
        }
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")?;
        if ticks > 0 {
            write!(f, ".{ticks:07}")?;
        }
        Ok(())
    }
}
