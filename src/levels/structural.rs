//! Prior-session extremes: prior day, weekly and monthly high/low

use serde::{Deserialize, Serialize};

use crate::types::{round_to, Bar, LevelType, PriceLevel, Tier};

/// Sessions in a trading week
const WEEK_SESSIONS: usize = 5;

/// Sessions in a trading month
const MONTH_SESSIONS: usize = 21;

/// Reference prices taken from a daily bar series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePrices {
    /// Last close, anchors the round levels
    pub current: f64,
    pub prev_day_high: f64,
    pub prev_day_low: f64,
    pub weekly_high: f64,
    pub weekly_low: f64,
    pub monthly_high: Option<f64>,
    pub monthly_low: Option<f64>,
}

impl ReferencePrices {
    /// Derive reference prices from daily bars in chronological order.
    ///
    /// Prior day is the second-to-last bar, weekly covers the last 5 sessions
    /// and monthly the last 21 (only when that many are present). Returns
    /// `None` for fewer than two bars.
    pub fn from_daily_bars(daily: &[Bar], precision: u32) -> Option<Self> {
        if daily.len() < 2 {
            return None;
        }

        let last = daily.last()?;
        let prev = &daily[daily.len() - 2];
        let (weekly_high, weekly_low) = extremes(tail(daily, WEEK_SESSIONS));
        let monthly = if daily.len() >= MONTH_SESSIONS {
            Some(extremes(tail(daily, MONTH_SESSIONS)))
        } else {
            None
        };

        Some(Self {
            current: last.close,
            prev_day_high: round_to(prev.high, precision),
            prev_day_low: round_to(prev.low, precision),
            weekly_high: round_to(weekly_high, precision),
            weekly_low: round_to(weekly_low, precision),
            monthly_high: monthly.map(|(h, _)| round_to(h, precision)),
            monthly_low: monthly.map(|(_, l)| round_to(l, precision)),
        })
    }
}

fn tail(bars: &[Bar], n: usize) -> &[Bar] {
    &bars[bars.len().saturating_sub(n)..]
}

fn extremes(bars: &[Bar]) -> (f64, f64) {
    let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    (high, low)
}

/// Tag the structural extremes as critical levels
pub fn structural_levels(refs: &ReferencePrices) -> Vec<PriceLevel> {
    let mut levels = vec![
        PriceLevel::new(
            refs.prev_day_high,
            "Prev Day High",
            Tier::Critical,
            LevelType::PrevDayHigh,
        ),
        PriceLevel::new(
            refs.prev_day_low,
            "Prev Day Low",
            Tier::Critical,
            LevelType::PrevDayLow,
        ),
        PriceLevel::new(
            refs.weekly_high,
            "Weekly High",
            Tier::Critical,
            LevelType::WeeklyHigh,
        ),
        PriceLevel::new(
            refs.weekly_low,
            "Weekly Low",
            Tier::Critical,
            LevelType::WeeklyLow,
        ),
    ];

    if let Some(mh) = refs.monthly_high {
        levels.push(PriceLevel::new(mh, "Monthly High", Tier::Critical, LevelType::MonthlyHigh));
    }
    if let Some(ml) = refs.monthly_low {
        levels.push(PriceLevel::new(ml, "Monthly Low", Tier::Critical, LevelType::MonthlyLow));
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn daily(highs_lows: &[(f64, f64)]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        highs_lows
            .iter()
            .enumerate()
            .map(|(i, (h, l))| Bar {
                timestamp: start + Duration::days(i as i64),
                open: *l,
                high: *h,
                low: *l,
                close: (h + l) / 2.0,
                volume: 1_000,
            })
            .collect()
    }

    #[test]
    fn test_needs_two_bars() {
        assert!(ReferencePrices::from_daily_bars(&[], 2).is_none());
        assert!(ReferencePrices::from_daily_bars(&daily(&[(10.0, 9.0)]), 2).is_none());
    }

    #[test]
    fn test_prior_day_and_weekly() {
        let bars = daily(&[
            (120.0, 80.0), // outside the weekly window
            (105.0, 95.0),
            (110.0, 100.0),
            (108.0, 97.0),
            (112.123, 101.0),
            (109.0, 99.0),
        ]);
        let refs = ReferencePrices::from_daily_bars(&bars, 2).unwrap();

        assert_eq!(refs.current, 104.0);
        assert_eq!(refs.prev_day_high, 112.12);
        assert_eq!(refs.prev_day_low, 101.0);
        assert_eq!(refs.weekly_high, 112.12);
        assert_eq!(refs.weekly_low, 95.0);
        assert_eq!(refs.monthly_high, None);

        let levels = structural_levels(&refs);
        assert_eq!(levels.len(), 4);
        assert!(levels.iter().all(|l| l.tier == Tier::Critical));
        assert_eq!(levels[0].label, "Prev Day High");
    }

    #[test]
    fn test_monthly_needs_full_month() {
        let mut rows: Vec<(f64, f64)> = (0..21)
            .map(|i| (100.0 + i as f64, 90.0 + i as f64))
            .collect();
        rows[0] = (150.0, 50.0);
        let refs = ReferencePrices::from_daily_bars(&daily(&rows), 2).unwrap();
        assert_eq!(refs.monthly_high, Some(150.0));
        assert_eq!(refs.monthly_low, Some(50.0));

        let levels = structural_levels(&refs);
        assert_eq!(levels.len(), 6);
        assert_eq!(levels[5].kind, LevelType::MonthlyLow);
    }
}
