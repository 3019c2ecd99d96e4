//! Per-instrument level generation
//!
//! For every configured instrument: fetch daily and intraday bars, derive
//! structural, volume-profile and round levels, then group confluence.
//! A provider failure skips that instrument only.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{AnalysisSettings, InstrumentConfig, InstrumentProfile};
use crate::levels::{
    estimate, group_confluence, round_levels, structural_levels, value_area_levels, ConfluenceZone,
    ProfileParams, ReferencePrices, TierPolicy,
};
use crate::market_data::MarketDataProvider;
use crate::notes::{ColorPolicy, NoteRow};
use crate::types::{PriceLevel, ValueArea};

/// Options for one generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub settings: AnalysisSettings,
    pub tier_policy: TierPolicy,
}

/// Everything derived for one instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentLevels {
    pub symbol: String,
    pub chart_symbol: String,
    pub reference: ReferencePrices,
    pub value_area: Option<ValueArea>,
    pub levels: Vec<PriceLevel>,
    pub zones: Vec<ConfluenceZone>,
}

impl InstrumentLevels {
    pub fn note_rows(&self, policy: &ColorPolicy) -> Vec<NoteRow> {
        self.levels
            .iter()
            .map(|level| NoteRow::from_level(&self.chart_symbol, level, policy))
            .collect()
    }
}

/// Build the level set for one instrument.
///
/// Returns `Ok(None)` when there are too few daily bars. Intraday failures
/// only drop the volume-profile levels.
pub async fn build_instrument_levels(
    provider: &dyn MarketDataProvider,
    profile: &InstrumentProfile,
    options: &GenerateOptions,
) -> Result<Option<InstrumentLevels>> {
    let settings = &options.settings;

    let daily = provider.daily_bars(profile, settings.daily_lookback_days).await?;
    let Some(reference) = ReferencePrices::from_daily_bars(&daily, settings.precision) else {
        warn!("Not enough daily data for {} ({} bars)", profile.symbol, daily.len());
        return Ok(None);
    };

    let mut levels = structural_levels(&reference);

    let value_area = match provider
        .intraday_bars(profile, settings.intraday_lookback_days, settings.intraday_interval_minutes)
        .await
    {
        Ok(bars) => {
            let area = estimate(&bars, &ProfileParams::from(settings));
            if area.is_none() {
                warn!(
                    "Could not compute volume profile for {} ({} bars)",
                    profile.symbol,
                    bars.len()
                );
            }
            area
        }
        Err(e) => {
            warn!("Intraday data failed for {}: {:#}", profile.symbol, e);
            None
        }
    };
    if let Some(area) = &value_area {
        levels.extend(value_area_levels(area));
    }

    levels.extend(round_levels(
        reference.current,
        &profile.scale,
        options.tier_policy,
        settings.precision,
    ));

    let zones = group_confluence(&levels, settings.confluence_tolerance);
    for level in &levels {
        debug!("{} {:.2} {} [{}]", profile.symbol, level.price, level.label, level.tier);
    }

    info!(
        "{}: PDH={:.2} PDL={:.2} WH={:.2} WL={:.2} {} levels, {} confluence zones",
        profile.symbol,
        reference.prev_day_high,
        reference.prev_day_low,
        reference.weekly_high,
        reference.weekly_low,
        levels.len(),
        zones.len()
    );

    Ok(Some(InstrumentLevels {
        symbol: profile.symbol.clone(),
        chart_symbol: profile.chart_symbol.clone(),
        reference,
        value_area,
        levels,
        zones,
    }))
}

/// Build levels for every configured instrument, skipping failures
pub async fn generate_all(
    provider: &dyn MarketDataProvider,
    config: &InstrumentConfig,
    options: &GenerateOptions,
) -> Vec<InstrumentLevels> {
    let mut results = Vec::new();

    for profile in &config.instruments {
        info!("Fetching data for {} ({})", profile.symbol, profile.data_ticker);
        match build_instrument_levels(provider, profile, options).await {
            Ok(Some(levels)) => results.push(levels),
            Ok(None) => {}
            Err(e) => warn!("Skipping {}: {:#}", profile.symbol, e),
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::InMemoryProvider;
    use crate::types::{Bar, LevelType, Tier};
    use chrono::{Duration, TimeZone, Utc};

    fn daily_bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: *c,
                high: c + 10.0,
                low: c - 10.0,
                close: *c,
                volume: 100_000,
            })
            .collect()
    }

    fn intraday_bars() -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2026, 2, 9, 14, 30, 0).unwrap();
        (0..20)
            .map(|i| {
                let price = 24980.0 + i as f64 * 2.0;
                Bar {
                    timestamp: start + Duration::minutes(30 * i),
                    open: price,
                    high: price,
                    low: price,
                    close: price,
                    volume: if i == 10 { 50_000 } else { 1_000 },
                }
            })
            .collect()
    }

    fn nq_only() -> InstrumentConfig {
        let mut config = InstrumentConfig::default();
        config.instruments.retain(|p| p.symbol == "NQ");
        config
    }

    #[tokio::test]
    async fn test_full_level_set() {
        let provider = InMemoryProvider::new()
            .with_daily("NQ", daily_bars(&[24900.0, 24950.0, 25010.0]))
            .with_intraday("NQ", intraday_bars());
        let config = nq_only();

        let results = generate_all(&provider, &config, &GenerateOptions::default()).await;
        assert_eq!(results.len(), 1);

        let nq = &results[0];
        assert_eq!(nq.chart_symbol, "/NQH26:XCME@DXFEED");
        assert_eq!(nq.reference.prev_day_high, 24960.0);
        assert!(nq.value_area.is_some());

        let kinds: Vec<_> = nq.levels.iter().map(|l| l.kind).collect();
        assert_eq!(
            &kinds[..7],
            &[
                LevelType::PrevDayHigh,
                LevelType::PrevDayLow,
                LevelType::WeeklyHigh,
                LevelType::WeeklyLow,
                LevelType::Poc,
                LevelType::Vah,
                LevelType::Val,
            ]
        );
        // 11 round levels around 25000 plus three quarters on 25000
        assert_eq!(nq.levels.len(), 7 + 11 + 3);
        assert!(nq.levels.iter().any(|l| l.label == "Round 25000" && l.tier == Tier::Major));

        let rows = nq.note_rows(&ColorPolicy::TrafficLight);
        assert_eq!(rows.len(), nq.levels.len());
    }

    #[tokio::test]
    async fn test_intraday_failure_keeps_other_levels() {
        let provider = InMemoryProvider::new().with_daily("NQ", daily_bars(&[24900.0, 25010.0]));
        let config = nq_only();

        let options = GenerateOptions::default();
        let nq = build_instrument_levels(&provider, &config.instruments[0], &options)
            .await
            .unwrap()
            .unwrap();
        assert!(nq.value_area.is_none());
        assert!(nq.levels.iter().all(|l| !l.kind.is_volume_profile()));
    }

    #[tokio::test]
    async fn test_failed_symbols_are_skipped() {
        let provider = InMemoryProvider::new()
            .with_daily("AAPL", daily_bars(&[230.0, 232.0]))
            .with_daily("AMD", daily_bars(&[150.0]));

        let config = InstrumentConfig::default();
        let results = generate_all(&provider, &config, &GenerateOptions::default()).await;
        let symbols: Vec<_> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL"]);
    }

    #[tokio::test]
    async fn test_poc_at_prior_day_high_forms_zone() {
        // prior day 24940-24960, heavy volume at 24960 in the session profile
        let start = Utc.with_ymd_and_hms(2026, 2, 9, 14, 30, 0).unwrap();
        let intraday: Vec<Bar> = (0..20)
            .map(|i| {
                let price = 24950.0 + i as f64;
                Bar {
                    timestamp: start + Duration::minutes(30 * i),
                    open: price,
                    high: price,
                    low: price,
                    close: price,
                    volume: if i == 10 { 50_000 } else { 1_000 },
                }
            })
            .collect();
        let provider = InMemoryProvider::new()
            .with_daily("NQ", daily_bars(&[24900.0, 24950.0, 25010.0]))
            .with_intraday("NQ", intraday);
        let config = nq_only();

        let results = generate_all(&provider, &config, &GenerateOptions::default()).await;
        let nq = &results[0];

        // single heavy bin holds the whole value area
        let area = nq.value_area.unwrap();
        assert!((area.poc - 24960.07).abs() < 0.011);
        assert_eq!(area.vah, area.poc);
        assert_eq!(area.val, area.poc);

        assert_eq!(nq.zones.len(), 1);
        let zone = &nq.zones[0];
        assert_eq!(zone.low, 24960.0);
        assert_eq!(zone.high, area.poc);
        assert_eq!(zone.tags(), vec!["prev_day_high", "poc", "vah", "val"]);
        assert_eq!(zone.labels, vec!["Prev Day High", "POC", "VAH", "VAL"]);
    }
}
