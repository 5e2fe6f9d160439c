//! Wait configuration and three-layer precedence resolution.
//!
//! Every field resolves on its own, highest precedence first:
//!
//! 1. a per-call override on the [`Wait`](crate::Wait) builder,
//! 2. an override set on the [`WaitConfig`] passed to the wait,
//! 3. the global defaults that `WaitConfig` captured when it was built,
//! 4. the live [`GlobalDefaults`] when no `WaitConfig` is involved.

use crate::defaults::{self, GlobalDefaults};
use crate::error::BoxError;
use crate::logging::{NullLogger, SharedLogger};
use crate::strategy::WaitStrategy;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Condition name used in logs when no alias is configured.
pub const DEFAULT_CONDITION_NAME: &str = "condition";

/// A zero-argument action run before every predicate evaluation.
#[derive(Clone)]
pub struct Prerequisite(Arc<dyn Fn() -> Result<(), BoxError> + Send + Sync>);

impl Prerequisite {
    /// Wraps an action that cannot fail.
    pub fn new<F>(action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(move || {
            action();
            Ok(())
        }))
    }

    /// Wraps an action whose error is subject to `ignore_exceptions`.
    pub fn fallible<F, E>(action: F) -> Self
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self(Arc::new(move || action().map_err(Into::into)))
    }

    #[inline]
    pub(crate) fn run(&self) -> Result<(), BoxError> {
        (self.0)()
    }
}

impl fmt::Debug for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Prerequisite(..)")
    }
}

/// Fully resolved settings for one wait invocation.
#[derive(Clone)]
pub struct EffectiveConfig {
    /// Maximum wall-clock time before giving up. Zero checks exactly once.
    pub timeout: Duration,
    /// Base pause before each predicate evaluation.
    pub poll_delay: Duration,
    /// Base pause after each predicate evaluation.
    pub poll_interval: Duration,
    /// Treat predicate and prerequisite errors as "not yet satisfied".
    pub ignore_exceptions: bool,
    /// Return instead of failing when the timeout elapses.
    pub fail_silently: bool,
    pub prereqs: Vec<Prerequisite>,
    pub alias: Option<String>,
    pub logger: SharedLogger,
    pub strategy: WaitStrategy,
    pub collect_metrics: bool,
}

impl EffectiveConfig {
    /// The alias, or [`DEFAULT_CONDITION_NAME`] when unset or empty.
    pub fn condition_name(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|alias| !alias.is_empty())
            .unwrap_or(DEFAULT_CONDITION_NAME)
    }
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            timeout: defaults::DEFAULT_TIMEOUT,
            poll_delay: defaults::DEFAULT_POLL_DELAY,
            poll_interval: defaults::DEFAULT_POLL_INTERVAL,
            ignore_exceptions: defaults::DEFAULT_IGNORE_EXCEPTIONS,
            fail_silently: defaults::DEFAULT_FAIL_SILENTLY,
            prereqs: Vec::new(),
            alias: None,
            logger: NullLogger::shared(),
            strategy: defaults::DEFAULT_STRATEGY,
            collect_metrics: defaults::DEFAULT_COLLECT_METRICS,
        }
    }
}

impl fmt::Debug for EffectiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveConfig")
            .field("timeout", &self.timeout)
            .field("poll_delay", &self.poll_delay)
            .field("poll_interval", &self.poll_interval)
            .field("ignore_exceptions", &self.ignore_exceptions)
            .field("fail_silently", &self.fail_silently)
            .field("prereqs", &self.prereqs.len())
            .field("alias", &self.alias)
            .field("strategy", &self.strategy)
            .field("collect_metrics", &self.collect_metrics)
            .finish_non_exhaustive()
    }
}

/// Per-field overrides for one configuration layer. `None` defers to the
/// next layer down.
#[derive(Clone, Default)]
pub struct Overrides {
    pub timeout: Option<Duration>,
    pub poll_delay: Option<Duration>,
    pub poll_interval: Option<Duration>,
    pub ignore_exceptions: Option<bool>,
    pub fail_silently: Option<bool>,
    pub prereqs: Option<Vec<Prerequisite>>,
    pub alias: Option<String>,
    pub logger: Option<SharedLogger>,
    pub strategy: Option<WaitStrategy>,
    pub collect_metrics: Option<bool>,
}

impl Overrides {
    /// Writes every set field over `base`.
    pub fn apply(&self, base: &mut EffectiveConfig) {
        if let Some(timeout) = self.timeout {
            base.timeout = timeout;
        }
        if let Some(poll_delay) = self.poll_delay {
            base.poll_delay = poll_delay;
        }
        if let Some(poll_interval) = self.poll_interval {
            base.poll_interval = poll_interval;
        }
        if let Some(ignore) = self.ignore_exceptions {
            base.ignore_exceptions = ignore;
        }
        if let Some(fail_silently) = self.fail_silently {
            base.fail_silently = fail_silently;
        }
        if let Some(prereqs) = &self.prereqs {
            base.prereqs.clone_from(prereqs);
        }
        if let Some(alias) = &self.alias {
            base.alias = Some(alias.clone());
        }
        if let Some(logger) = &self.logger {
            base.logger = Arc::clone(logger);
        }
        if let Some(strategy) = self.strategy {
            base.strategy = strategy;
        }
        if let Some(collect) = self.collect_metrics {
            base.collect_metrics = collect;
        }
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.timeout.is_none()
            && self.poll_delay.is_none()
            && self.poll_interval.is_none()
            && self.ignore_exceptions.is_none()
            && self.fail_silently.is_none()
            && self.prereqs.is_none()
            && self.alias.is_none()
            && self.logger.is_none()
            && self.strategy.is_none()
            && self.collect_metrics.is_none()
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("timeout", &self.timeout)
            .field("poll_delay", &self.poll_delay)
            .field("poll_interval", &self.poll_interval)
            .field("ignore_exceptions", &self.ignore_exceptions)
            .field("fail_silently", &self.fail_silently)
            .field("prereqs", &self.prereqs.as_ref().map(Vec::len))
            .field("alias", &self.alias)
            .field("logger", &self.logger.is_some())
            .field("strategy", &self.strategy)
            .field("collect_metrics", &self.collect_metrics)
            .finish()
    }
}

/// Generates the chained override setters shared by [`WaitConfig`] and
/// [`Wait`](crate::Wait). The target type needs an `overrides: Overrides` field.
macro_rules! override_setters {
    ($ty:ty) => {
        impl $ty {
            /// Sets the timeout.
            pub fn timeout(mut self, timeout: ::std::time::Duration) -> Self {
                self.overrides.timeout = Some(timeout);
                self
            }

            /// Same as [`timeout`](Self::timeout).
            pub fn at_most(self, timeout: ::std::time::Duration) -> Self {
                self.timeout(timeout)
            }

            pub fn poll_delay(mut self, poll_delay: ::std::time::Duration) -> Self {
                self.overrides.poll_delay = Some(poll_delay);
                self
            }

            pub fn poll_interval(mut self, poll_interval: ::std::time::Duration) -> Self {
                self.overrides.poll_interval = Some(poll_interval);
                self
            }

            /// Sets both poll delay and poll interval.
            pub fn polling(
                self,
                poll_delay: ::std::time::Duration,
                poll_interval: ::std::time::Duration,
            ) -> Self {
                self.poll_delay(poll_delay).poll_interval(poll_interval)
            }

            pub fn ignore_exceptions(mut self, ignore: bool) -> Self {
                self.overrides.ignore_exceptions = Some(ignore);
                self
            }

            pub fn fail_silently(mut self, fail_silently: bool) -> Self {
                self.overrides.fail_silently = Some(fail_silently);
                self
            }

            /// Sets `ignore_exceptions` and `fail_silently` together.
            pub fn exception_handling(self, ignore: bool, fail_silently: bool) -> Self {
                self.ignore_exceptions(ignore).fail_silently(fail_silently)
            }

            /// Replaces the prerequisites with a single infallible action.
            pub fn prereq<F>(self, action: F) -> Self
            where
                F: Fn() + Send + Sync + 'static,
            {
                self.prereqs([$crate::config::Prerequisite::new(action)])
            }

            /// Replaces the prerequisites with a single fallible action.
            pub fn try_prereq<F, E>(self, action: F) -> Self
            where
                F: Fn() -> ::std::result::Result<(), E> + Send + Sync + 'static,
                E: Into<$crate::error::BoxError>,
            {
                self.prereqs([$crate::config::Prerequisite::fallible(action)])
            }

            /// Replaces the prerequisites. An empty list clears any inherited ones.
            pub fn prereqs<I>(mut self, prereqs: I) -> Self
            where
                I: IntoIterator<Item = $crate::config::Prerequisite>,
            {
                self.overrides.prereqs = Some(prereqs.into_iter().collect());
                self
            }

            pub fn alias(mut self, alias: impl Into<String>) -> Self {
                self.overrides.alias = Some(alias.into());
                self
            }

            pub fn logger<L>(self, logger: L) -> Self
            where
                L: $crate::logging::WaitLogger + 'static,
            {
                self.shared_logger(::std::sync::Arc::new(logger))
            }

            /// Uses an already shared sink, e.g. one the caller inspects later.
            pub fn shared_logger(mut self, logger: $crate::logging::SharedLogger) -> Self {
                self.overrides.logger = Some(logger);
                self
            }

            pub fn metrics(mut self, collect: bool) -> Self {
                self.overrides.collect_metrics = Some(collect);
                self
            }

            pub fn strategy(mut self, strategy: $crate::strategy::WaitStrategy) -> Self {
                self.overrides.strategy = Some(strategy);
                self
            }
        }
    };
}

pub(crate) use override_setters;

/// A reusable configuration.
///
/// Captures a private copy of the global defaults when built, so later
/// changes to [`GlobalDefaults`] do not leak into it. Overrides set on the
/// config take precedence over that snapshot.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    captured: EffectiveConfig,
    overrides: Overrides,
}

override_setters!(WaitConfig);

impl WaitConfig {
    /// Snapshots the process-wide defaults.
    pub fn new() -> Self {
        Self::capture(defaults::defaults())
    }

    /// Snapshots the given registry.
    pub fn capture(globals: &GlobalDefaults) -> Self {
        Self {
            captured: globals.snapshot(),
            overrides: Overrides::default(),
        }
    }

    /// The defaults captured at construction.
    pub fn captured(&self) -> &EffectiveConfig {
        &self.captured
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    /// The config's own effective values: overrides over the snapshot.
    pub fn effective(&self) -> EffectiveConfig {
        let mut config = self.captured.clone();
        self.overrides.apply(&mut config);
        config
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves one wait invocation's settings.
///
/// `globals` is only read when `config` is `None`.
pub fn resolve(
    per_call: &Overrides,
    config: Option<&WaitConfig>,
    globals: &GlobalDefaults,
) -> EffectiveConfig {
    let mut effective = match config {
        Some(config) => config.effective(),
        None => globals.snapshot(),
    };
    per_call.apply(&mut effective);
    effective
}
