//! pollwait - Blocking Condition Polling
//!
//! Repeatedly evaluates a predicate until it reaches an expected value, a
//! timeout elapses, or a cancellation token fires. Each invocation blocks the
//! calling thread and sleeps only at two pacing points per iteration.
//!
//! # Key Features
//!
//! - Five pacing strategies (linear, exponential backoff, aggressive,
//!   conservative, adaptive to measured check cost)
//! - Three-layer configuration: per-call, reusable snapshot, global defaults
//! - Optional per-wait metrics
//! - Pluggable logging sinks plus structured `tracing` events
//! - Interruptible sleeps, so cancellation never waits out a poll interval
//!
//! # Example
//!
//! ```
//! use pollwait::{Wait, WaitStrategy};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//!
//! let attempts = AtomicU32::new(0);
//!
//! let outcome = Wait::new()
//!     .timeout(Duration::from_secs(1))
//!     .polling(Duration::from_millis(1), Duration::from_millis(5))
//!     .strategy(WaitStrategy::ExponentialBackoff)
//!     .metrics(true)
//!     .alias("service ready")
//!     .until(|| attempts.fetch_add(1, Ordering::Relaxed) >= 2)
//!     .unwrap();
//!
//! let metrics = outcome.metrics.unwrap();
//! assert_eq!(metrics.condition_checks, 3);
//! assert!(metrics.was_successful);
//! ```

mod cancel;
mod config;
mod defaults;
mod engine;
mod error;
mod logging;
mod metrics;
mod strategy;
mod time;
mod wait;

pub use cancel::CancellationToken;
pub use config::{
    resolve, EffectiveConfig, Overrides, Prerequisite, WaitConfig, DEFAULT_CONDITION_NAME,
};
pub use defaults::{
    defaults, GlobalDefaults, DEFAULT_COLLECT_METRICS, DEFAULT_FAIL_SILENTLY,
    DEFAULT_IGNORE_EXCEPTIONS, DEFAULT_POLL_DELAY, DEFAULT_POLL_INTERVAL, DEFAULT_STRATEGY,
    DEFAULT_TIMEOUT,
};
pub use engine::WaitOutcome;
pub use error::{BoxError, Result, WaitError};
pub use logging::{ConsoleLogger, NullLogger, SharedLogger, TracingLogger, WaitLogger};
pub use metrics::WaitMetrics;
pub use strategy::{PacingCalculator, WaitStrategy};
pub use time::{DurationDisplay, TimeConstraint, TimeUnit};
pub use wait::{wait, Wait};
