//! The master clock that drives the scheduler.
//!
//! The `SystemClock` is the single source of time for an engine instance. It
//! publishes a `TickEvent` on a broadcast channel once per configured period
//! and nothing else; all scheduling decisions happen in the engine's driver
//! loop. Keeping the clock this thin means tests can bypass it entirely and
//! feed ticks to the engine by hand.

use crate::config::ClockResolution;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// A single beat of the master clock.
#[derive(Debug, Clone)]
pub struct TickEvent {
    /// Monotonic tick counter, starting at 1 for the first tick after start.
    pub tick_count: u64,
    /// Wall-clock timestamp of the tick.
    pub at: DateTime<Utc>,
}

/// The periodic ticker spawned by [`CadenceEngine::start`].
///
/// [`CadenceEngine::start`]: crate::engine::CadenceEngine::start
pub(crate) struct SystemClock {
    period: std::time::Duration,
    tick_sender: broadcast::Sender<Arc<TickEvent>>,
}

impl SystemClock {
    pub(crate) fn new(
        resolution: ClockResolution,
        tick_sender: broadcast::Sender<Arc<TickEvent>>,
    ) -> Self {
        Self {
            period: resolution.period(),
            tick_sender,
        }
    }

    /// Runs the tick loop until the shutdown signal fires.
    ///
    /// The first tick is emitted one full period after start, not immediately:
    /// a task armed with a window of N must not see its countdown advance at
    /// time zero.
    pub(crate) async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick_count: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => {
                    tick_count += 1;
                    let event = Arc::new(TickEvent {
                        tick_count,
                        at: Utc::now(),
                    });
                    // No subscribers is fine; the engine may not be draining yet.
                    self.tick_sender.send(event).ok();
                }
            }
        }
        debug!("SystemClock stopped after {} ticks.", tick_count);
    }
}
