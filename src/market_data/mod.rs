//! Historical bar providers
//!
//! The level generator only sees the [`MarketDataProvider`] capability, so
//! tests can supply deterministic bars instead of live data.

pub mod chart_api;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::InstrumentProfile;
use crate::types::Bar;

pub use chart_api::ChartApiClient;
pub use mock::InMemoryProvider;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars covering the last `lookback_days` calendar days, oldest first
    async fn daily_bars(
        &self,
        instrument: &InstrumentProfile,
        lookback_days: u32,
    ) -> Result<Vec<Bar>>;

    /// Intraday bars of `interval_minutes` covering the last `lookback_days`, oldest first
    async fn intraday_bars(
        &self,
        instrument: &InstrumentProfile,
        lookback_days: u32,
        interval_minutes: u32,
    ) -> Result<Vec<Bar>>;
}
