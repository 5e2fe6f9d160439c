//! Hard-coded defaults and the process-wide defaults registry.
//!
//! The registry is shared mutable state. Every getter and setter is safe to
//! call from any thread, but nothing isolates a wait that reads the registry
//! from a concurrent writer: callers that mutate it while other waits run
//! must serialize access themselves. Build a [`WaitConfig`](crate::WaitConfig)
//! to get a snapshot that later mutations cannot affect.

use crate::config::{EffectiveConfig, Prerequisite};
use crate::error::BoxError;
use crate::logging::{NullLogger, SharedLogger, WaitLogger};
use crate::strategy::WaitStrategy;
use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_IGNORE_EXCEPTIONS: bool = true;
pub const DEFAULT_FAIL_SILENTLY: bool = false;
pub const DEFAULT_STRATEGY: WaitStrategy = WaitStrategy::Linear;
pub const DEFAULT_COLLECT_METRICS: bool = false;

static GLOBAL: LazyLock<GlobalDefaults> = LazyLock::new(GlobalDefaults::new);

/// The process-wide defaults registry.
pub fn defaults() -> &'static GlobalDefaults {
    &GLOBAL
}

/// Mutable defaults read by waits that are not built from a
/// [`WaitConfig`](crate::WaitConfig).
///
/// Setters return `&Self` so they chain:
///
/// ```
/// use std::time::Duration;
///
/// pollwait::defaults()
///     .set_timeout(Duration::from_secs(30))
///     .set_poll_interval(Duration::from_millis(50));
/// # pollwait::defaults().reset_to_defaults();
/// ```
#[derive(Debug, Default)]
pub struct GlobalDefaults {
    inner: RwLock<EffectiveConfig>,
}

impl GlobalDefaults {
    /// A registry holding the hard-coded defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A consistent copy of every field.
    pub fn snapshot(&self) -> EffectiveConfig {
        self.inner.read().clone()
    }

    /// Restores every field to its hard-coded default in one step.
    pub fn reset_to_defaults(&self) {
        *self.inner.write() = EffectiveConfig::default();
    }

    #[inline]
    fn update(&self, f: impl FnOnce(&mut EffectiveConfig)) -> &Self {
        f(&mut self.inner.write());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.inner.read().timeout
    }

    pub fn set_timeout(&self, timeout: Duration) -> &Self {
        self.update(|c| c.timeout = timeout)
    }

    pub fn poll_delay(&self) -> Duration {
        self.inner.read().poll_delay
    }

    pub fn set_poll_delay(&self, poll_delay: Duration) -> &Self {
        self.update(|c| c.poll_delay = poll_delay)
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.read().poll_interval
    }

    pub fn set_poll_interval(&self, poll_interval: Duration) -> &Self {
        self.update(|c| c.poll_interval = poll_interval)
    }

    /// Sets poll delay and poll interval under one lock.
    pub fn set_polling(&self, poll_delay: Duration, poll_interval: Duration) -> &Self {
        self.update(|c| {
            c.poll_delay = poll_delay;
            c.poll_interval = poll_interval;
        })
    }

    pub fn ignore_exceptions(&self) -> bool {
        self.inner.read().ignore_exceptions
    }

    pub fn set_ignore_exceptions(&self, ignore: bool) -> &Self {
        self.update(|c| c.ignore_exceptions = ignore)
    }

    pub fn fail_silently(&self) -> bool {
        self.inner.read().fail_silently
    }

    pub fn set_fail_silently(&self, fail_silently: bool) -> &Self {
        self.update(|c| c.fail_silently = fail_silently)
    }

    pub fn set_exception_handling(&self, ignore: bool, fail_silently: bool) -> &Self {
        self.update(|c| {
            c.ignore_exceptions = ignore;
            c.fail_silently = fail_silently;
        })
    }

    pub fn prereqs(&self) -> Vec<Prerequisite> {
        self.inner.read().prereqs.clone()
    }

    /// Replaces the default prerequisites with one infallible action.
    pub fn set_prereq<F>(&self, action: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.set_prereqs([Prerequisite::new(action)])
    }

    /// Replaces the default prerequisites with one fallible action.
    pub fn set_try_prereq<F, E>(&self, action: F) -> &Self
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.set_prereqs([Prerequisite::fallible(action)])
    }

    pub fn set_prereqs<I>(&self, prereqs: I) -> &Self
    where
        I: IntoIterator<Item = Prerequisite>,
    {
        let prereqs: Vec<_> = prereqs.into_iter().collect();
        self.update(|c| c.prereqs = prereqs)
    }

    pub fn clear_prereqs(&self) -> &Self {
        self.update(|c| c.prereqs.clear())
    }

    pub fn alias(&self) -> Option<String> {
        self.inner.read().alias.clone()
    }

    pub fn set_alias(&self, alias: impl Into<String>) -> &Self {
        let alias = alias.into();
        self.update(|c| c.alias = Some(alias))
    }

    pub fn clear_alias(&self) -> &Self {
        self.update(|c| c.alias = None)
    }

    pub fn logger(&self) -> SharedLogger {
        Arc::clone(&self.inner.read().logger)
    }

    pub fn set_logger<L>(&self, logger: L) -> &Self
    where
        L: WaitLogger + 'static,
    {
        self.set_shared_logger(Arc::new(logger))
    }

    pub fn set_shared_logger(&self, logger: SharedLogger) -> &Self {
        self.update(|c| c.logger = logger)
    }

    /// Restores the no-op sink.
    pub fn reset_logger(&self) -> &Self {
        self.set_shared_logger(NullLogger::shared())
    }

    pub fn strategy(&self) -> WaitStrategy {
        self.inner.read().strategy
    }

    pub fn set_strategy(&self, strategy: WaitStrategy) -> &Self {
        self.update(|c| c.strategy = strategy)
    }

    pub fn collect_metrics(&self) -> bool {
        self.inner.read().collect_metrics
    }

    pub fn set_collect_metrics(&self, collect: bool) -> &Self {
        self.update(|c| c.collect_metrics = collect)
    }
}
