//! Fixed-period driver for the scrape cycle.

use std::fmt::Display;
use std::future::Future;

use tokio::time::{interval, Duration, MissedTickBehavior};

/// Runs a cycle once immediately and then once per period, forever.
pub struct Scheduler {
    period: Duration,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Run `cycle` on every tick. Never returns.
    ///
    /// The first tick completes immediately. Each cycle is awaited before the
    /// next tick is taken, so cycles never overlap. A failed cycle is logged
    /// and the timer keeps going.
    ///
    /// Missed ticks are skipped: if a cycle outlasts the period, the next
    /// cycle starts as soon as it finishes and later ticks fall back onto the
    /// original period grid. Ticks are never queued up.
    ///
    /// # Panics
    ///
    /// Panics if the period is zero (a tokio interval requirement); callers
    /// validate the period first.
    pub async fn run<F, Fut, T, E>(&self, mut cycle: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        tracing::info!(period = ?self.period, "Scheduler started");

        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            timer.tick().await;
            if let Err(e) = cycle().await {
                tracing::warn!(error = %e, "Scrape cycle failed");
            }
        }
    }
}
