//! Periodic live-rate refresh

use crate::core::rate::ConversionMode;
use crate::core::session::{Conversion, ConversionSession};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::trace;

/// Source of refresh ticks.
#[async_trait]
pub trait Ticker: Send {
    async fn tick(&mut self);
}

/// Ticks every `period`, starting one period from now.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Re-resolves the live rate on every tick while auto-update is on.
///
/// Turning auto-update off suppresses ticks without stopping the ticker.
pub struct RefreshScheduler<T: Ticker> {
    ticker: T,
    auto_update: bool,
}

impl<T: Ticker> RefreshScheduler<T> {
    pub fn new(ticker: T) -> Self {
        Self {
            ticker,
            auto_update: true,
        }
    }

    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    pub fn set_auto_update(&mut self, enabled: bool) {
        self.auto_update = enabled;
    }

    pub fn toggle_auto_update(&mut self) -> bool {
        self.auto_update = !self.auto_update;
        self.auto_update
    }

    /// Waits for the next tick and refreshes the session.
    pub async fn next_update(&mut self, session: &mut ConversionSession) -> Option<Conversion> {
        self.ticker.tick().await;
        self.on_tick(session).await
    }

    /// Handles one tick. `None` means the tick was suppressed or failed.
    pub async fn on_tick(&self, session: &mut ConversionSession) -> Option<Conversion> {
        if !self.auto_update {
            trace!("Auto-update off, tick suppressed");
            return None;
        }
        if session.mode() != ConversionMode::Live {
            trace!("Manual mode, tick suppressed");
            return None;
        }
        session.refresh().await
    }
}
