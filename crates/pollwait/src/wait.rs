//! The per-call wait builder.

use crate::cancel::CancellationToken;
use crate::config::{self, override_setters, EffectiveConfig, Overrides, WaitConfig};
use crate::defaults;
use crate::engine::{self, WaitOutcome};
use crate::error::{BoxError, Result};
use std::convert::Infallible;

/// Builds and runs one wait.
///
/// Setters record per-call overrides, which beat both a [`WaitConfig`] and
/// the global defaults. The builder is reusable: every entry point borrows
/// it and resolves its settings afresh.
///
/// ```
/// use pollwait::Wait;
/// use std::time::Duration;
///
/// let mut n = 0;
/// let outcome = Wait::new()
///     .timeout(Duration::from_secs(1))
///     .polling(Duration::ZERO, Duration::from_millis(5))
///     .alias("counter")
///     .until(|| {
///         n += 1;
///         n == 3
///     })
///     .unwrap();
/// assert_eq!(outcome.checks, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Wait {
    overrides: Overrides,
    config: Option<WaitConfig>,
    cancellation: Option<CancellationToken>,
}

override_setters!(Wait);

impl Wait {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a reusable config instead of the live global defaults.
    pub fn with_config(config: &WaitConfig) -> Self {
        Self {
            config: Some(config.clone()),
            ..Self::default()
        }
    }

    /// Ends the wait as cancelled once `token` fires.
    pub fn cancel_on(mut self, token: &CancellationToken) -> Self {
        self.cancellation = Some(token.clone());
        self
    }

    /// The settings the next wait would run with.
    pub fn resolve(&self) -> EffectiveConfig {
        config::resolve(&self.overrides, self.config.as_ref(), defaults::defaults())
    }

    /// Waits until `predicate` returns `true`.
    pub fn until<F>(&self, mut predicate: F) -> Result<WaitOutcome>
    where
        F: FnMut() -> bool,
    {
        self.try_until_value(true, || Ok::<_, Infallible>(predicate()))
    }

    /// Waits until `predicate` returns `false`.
    pub fn until_false<F>(&self, mut predicate: F) -> Result<WaitOutcome>
    where
        F: FnMut() -> bool,
    {
        self.try_until_value(false, || Ok::<_, Infallible>(predicate()))
    }

    /// Waits until `predicate` returns `expected`.
    pub fn until_value<F>(&self, expected: bool, mut predicate: F) -> Result<WaitOutcome>
    where
        F: FnMut() -> bool,
    {
        self.try_until_value(expected, || Ok::<_, Infallible>(predicate()))
    }

    /// Waits until a fallible `predicate` returns `Ok(true)`.
    ///
    /// An `Err` counts as a failed check when exceptions are ignored and
    /// ends the wait with [`WaitError::Condition`](crate::WaitError::Condition)
    /// otherwise.
    pub fn try_until<F, E>(&self, predicate: F) -> Result<WaitOutcome>
    where
        F: FnMut() -> Result<bool, E>,
        E: Into<BoxError>,
    {
        self.try_until_value(true, predicate)
    }

    /// Waits until a fallible `predicate` returns `Ok(false)`.
    pub fn try_until_false<F, E>(&self, predicate: F) -> Result<WaitOutcome>
    where
        F: FnMut() -> Result<bool, E>,
        E: Into<BoxError>,
    {
        self.try_until_value(false, predicate)
    }

    /// Waits until a fallible `predicate` returns `Ok(expected)`.
    pub fn try_until_value<F, E>(&self, expected: bool, predicate: F) -> Result<WaitOutcome>
    where
        F: FnMut() -> Result<bool, E>,
        E: Into<BoxError>,
    {
        let config = self.resolve();
        engine::run(&config, self.cancellation.as_ref(), expected, predicate)
    }
}

/// Shorthand for [`Wait::new`].
pub fn wait() -> Wait {
    Wait::new()
}
