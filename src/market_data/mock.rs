use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use super::MarketDataProvider;
use crate::config::InstrumentProfile;
use crate::types::Bar;

/// Provider backed by fixed bar series, keyed by short symbol.
///
/// Symbols without bars fail like an unreachable provider would.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvider {
    daily: HashMap<String, Vec<Bar>>,
    intraday: HashMap<String, Vec<Bar>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_daily(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.daily.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_intraday(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.intraday.insert(symbol.to_string(), bars);
        self
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    async fn daily_bars(
        &self,
        instrument: &InstrumentProfile,
        _lookback_days: u32,
    ) -> Result<Vec<Bar>> {
        self.daily
            .get(&instrument.symbol)
            .cloned()
            .ok_or_else(|| anyhow!("No daily bars for {}", instrument.symbol))
    }

    async fn intraday_bars(
        &self,
        instrument: &InstrumentProfile,
        _lookback_days: u32,
        _interval_minutes: u32,
    ) -> Result<Vec<Bar>> {
        self.intraday
            .get(&instrument.symbol)
            .cloned()
            .ok_or_else(|| anyhow!("No intraday bars for {}", instrument.symbol))
    }
}
