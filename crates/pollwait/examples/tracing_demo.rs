//! Polls a simulated background job with every pacing strategy and prints
//! the collected metrics.
//!
//! Run with `RUST_LOG=pollwait=trace cargo run --example tracing_demo` to see
//! the engine's own span and per-sleep events next to the sink's output.

use pollwait::{CancellationToken, TracingLogger, Wait, WaitConfig, WaitStrategy};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn spawn_job(ready_after: Duration) -> Arc<AtomicBool> {
    let done = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&done);
    thread::spawn(move || {
        thread::sleep(ready_after);
        flag.store(true, Ordering::Release);
    });
    done
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pollwait=info")),
        )
        .init();

    let config = WaitConfig::new()
        .timeout(Duration::from_secs(2))
        .polling(Duration::from_millis(5), Duration::from_millis(20))
        .logger(TracingLogger)
        .metrics(true);

    for strategy in [
        WaitStrategy::Linear,
        WaitStrategy::ExponentialBackoff,
        WaitStrategy::Aggressive,
        WaitStrategy::Conservative,
        WaitStrategy::Adaptive,
    ] {
        let done = spawn_job(Duration::from_millis(150));
        let result = Wait::with_config(&config)
            .strategy(strategy)
            .alias(format!("job ({strategy})"))
            .until(|| done.load(Ordering::Acquire));

        match result {
            Ok(outcome) => {
                if let Some(metrics) = outcome.metrics {
                    println!("{strategy:>18}: {metrics}");
                }
            }
            Err(err) => println!("{strategy:>18}: {err}"),
        }
    }

    let token = CancellationToken::new();
    token.cancel_after(Duration::from_millis(100));
    let err = Wait::with_config(&config)
        .alias("never ready")
        .cancel_on(&token)
        .until(|| false)
        .unwrap_err();
    println!("{:>18}: {err}", "cancelled");

    let err = Wait::with_config(&config)
        .timeout(Duration::from_millis(250))
        .until(|| false)
        .unwrap_err();
    println!("{:>18}: {err}", "timed out");
}
