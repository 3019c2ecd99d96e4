//! Volume profile estimation from OHLCV bars
//!
//! Each bar's volume is placed at its typical price in a fixed-width
//! histogram spanning the observed typical-price range. The POC is the
//! fullest bin and the value area grows outward from it until it holds the
//! configured share of total volume.

use crate::config::AnalysisSettings;
use crate::types::{round_to, Bar, LevelType, PriceLevel, Tier, ValueArea};

/// Histogram parameters for the estimator
#[derive(Debug, Clone, Copy)]
pub struct ProfileParams {
    pub bins: usize,
    pub value_area_fraction: f64,
    pub precision: u32,
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            bins: 50,
            value_area_fraction: 0.70,
            precision: 2,
        }
    }
}

impl From<&AnalysisSettings> for ProfileParams {
    fn from(settings: &AnalysisSettings) -> Self {
        Self {
            bins: settings.bins.max(1),
            value_area_fraction: settings.value_area_fraction,
            precision: settings.precision,
        }
    }
}

/// Inclusive bin range of a value area plus the POC bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinRange {
    pub poc: usize,
    pub lo: usize,
    pub hi: usize,
}

/// Compute POC/VAH/VAL from a bar series.
///
/// Returns `None` for fewer than two bars.
pub fn estimate(bars: &[Bar], params: &ProfileParams) -> Option<ValueArea> {
    if bars.len() < 2 {
        return None;
    }

    let prices: Vec<f64> = bars.iter().map(Bar::typical_price).collect();
    let price_min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let price_max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if price_max == price_min {
        let p = round_to(price_min, params.precision);
        return Some(ValueArea { poc: p, vah: p, val: p });
    }

    let bins = params.bins.max(1);
    let edges = bin_edges(price_min, price_max, bins);

    let mut hist = vec![0.0f64; bins];
    for (price, bar) in prices.iter().zip(bars) {
        hist[bin_index(&edges, *price)] += bar.volume as f64;
    }

    let range = value_area_bins(&hist, params.value_area_fraction);
    let center = |idx: usize| (edges[idx] + edges[idx + 1]) / 2.0;

    Some(ValueArea {
        poc: round_to(center(range.poc), params.precision),
        vah: round_to(center(range.hi), params.precision),
        val: round_to(center(range.lo), params.precision),
    })
}

/// `bins + 1` evenly spaced edges from `min` to `max`
fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let width = (max - min) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|k| min + width * k as f64).collect();
    edges[bins] = max;
    edges
}

/// Bin for a price: the last edge at or below it, clamped to the histogram.
///
/// A price on an interior edge lands in the upper bin.
fn bin_index(edges: &[f64], price: f64) -> usize {
    let last = edges.len() - 2;
    let above = edges.partition_point(|edge| *edge <= price);
    above.saturating_sub(1).min(last)
}

/// Locate the POC bin and expand the value area around it.
///
/// The POC is the first bin with the maximum volume. Expansion takes the
/// neighbour with more volume; ties go to the lower side while one remains.
/// Stops at the target share or once the whole histogram is covered.
pub fn value_area_bins(hist: &[f64], fraction: f64) -> BinRange {
    if hist.is_empty() {
        return BinRange { poc: 0, lo: 0, hi: 0 };
    }

    let last = hist.len() - 1;
    let mut poc = 0;
    for (idx, vol) in hist.iter().enumerate() {
        if *vol > hist[poc] {
            poc = idx;
        }
    }

    let total: f64 = hist.iter().sum();
    let target = total * fraction;
    let mut accumulated = hist[poc];
    let (mut lo, mut hi) = (poc, poc);

    while accumulated < target && (lo > 0 || hi < last) {
        let expand_lo = if lo > 0 { hist[lo - 1] } else { -1.0 };
        let expand_hi = if hi < last { hist[hi + 1] } else { -1.0 };

        if expand_lo >= expand_hi && lo > 0 {
            lo -= 1;
            accumulated += hist[lo];
        } else if hi < last {
            hi += 1;
            accumulated += hist[hi];
        } else {
            break;
        }
    }

    BinRange { poc, lo, hi }
}

/// Chart levels for a value area: POC is critical, VAH/VAL major
pub fn value_area_levels(area: &ValueArea) -> Vec<PriceLevel> {
    vec![
        PriceLevel::new(area.poc, "POC", Tier::Critical, LevelType::Poc),
        PriceLevel::new(area.vah, "VAH", Tier::Major, LevelType::Vah),
        PriceLevel::new(area.val, "VAL", Tier::Major, LevelType::Val),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(i: i64, high: f64, low: f64, close: f64, volume: u64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2026, 1, 5, 14, 30, 0).unwrap()
                + Duration::minutes(30 * i),
            open: close,
            high,
            low,
            close,
            volume,
        }
    }

    fn flat_bar(i: i64, price: f64, volume: u64) -> Bar {
        bar(i, price, price, price, volume)
    }

    #[test]
    fn test_too_few_bars() {
        let params = ProfileParams::default();
        assert_eq!(estimate(&[], &params), None);
        assert_eq!(estimate(&[flat_bar(0, 100.0, 10)], &params), None);
    }

    #[test]
    fn test_identical_typical_prices() {
        let bars = vec![
            bar(0, 101.0, 99.0, 100.0, 10),
            bar(1, 100.5, 99.5, 100.0, 20),
            flat_bar(2, 100.0, 5),
        ];
        let area = estimate(&bars, &ProfileParams::default()).unwrap();
        assert_eq!(area, ValueArea { poc: 100.0, vah: 100.0, val: 100.0 });
    }

    #[test]
    fn test_single_heavy_bin_collapses_value_area() {
        let mut hist = vec![0.0; 50];
        hist[24] = 1000.0;
        let range = value_area_bins(&hist, 0.70);
        assert_eq!(range, BinRange { poc: 24, lo: 24, hi: 24 });
    }

    #[test]
    fn test_poc_tie_takes_lowest_bin() {
        let mut hist = vec![1.0; 10];
        hist[3] = 50.0;
        hist[7] = 50.0;
        assert_eq!(value_area_bins(&hist, 0.70).poc, 3);
    }

    #[test]
    fn test_expansion_tie_goes_down() {
        let hist = vec![0.0, 10.0, 40.0, 10.0, 0.0];
        // target 42: one more bin needed, both neighbours equal
        let range = value_area_bins(&hist, 0.70);
        assert_eq!(range, BinRange { poc: 2, lo: 1, hi: 2 });
    }

    #[test]
    fn test_expansion_prefers_heavier_side() {
        let hist = vec![5.0, 5.0, 40.0, 35.0, 15.0];
        let range = value_area_bins(&hist, 0.70);
        assert_eq!(range.poc, 2);
        assert_eq!(range.lo, 2);
        assert_eq!(range.hi, 3);
    }

    #[test]
    fn test_expansion_at_bottom_goes_up() {
        let hist = vec![40.0, 35.0, 25.0];
        let range = value_area_bins(&hist, 0.70);
        assert_eq!(range, BinRange { poc: 0, lo: 0, hi: 1 });
    }

    #[test]
    fn test_unreachable_target_spans_histogram() {
        let hist = vec![1.0, 2.0, 3.0, 2.0, 1.0];
        let range = value_area_bins(&hist, 1.5);
        assert_eq!(range, BinRange { poc: 2, lo: 0, hi: 4 });
    }

    #[test]
    fn test_value_area_properties() {
        let hist: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64 + 1.0).collect();
        let total: f64 = hist.iter().sum();
        let range = value_area_bins(&hist, 0.70);
        assert!(range.lo <= range.poc && range.poc <= range.hi);
        let covered: f64 = hist[range.lo..=range.hi].iter().sum();
        assert!(covered >= total * 0.70 || (range.lo == 0 && range.hi == 49));
    }

    #[test]
    fn test_boundary_prices_bin_placement() {
        let edges = bin_edges(100.0, 150.0, 50);
        assert_eq!(bin_index(&edges, 100.0), 0);
        assert_eq!(bin_index(&edges, 150.0), 49);
        assert_eq!(bin_index(&edges, 101.0), 1);
        assert_eq!(bin_index(&edges, 100.5), 0);
    }

    #[test]
    fn test_estimate_finds_volume_node() {
        // typical prices 100..=149, heavy volume near 120
        let bars: Vec<Bar> = (0..50)
            .map(|i| {
                let volume = if (118..=122).contains(&(100 + i)) { 1000 } else { 10 };
                flat_bar(i, 100.0 + i as f64, volume)
            })
            .collect();
        let area = estimate(&bars, &ProfileParams::default()).unwrap();

        // bin width 0.98, first heavy bin is 18
        assert!((area.poc - 118.13).abs() < 0.011);
        assert!(area.val <= area.poc && area.poc <= area.vah);
        assert!(area.val >= 117.0 && area.vah <= 123.0);
    }

    #[test]
    fn test_value_area_levels_tiers() {
        let levels = value_area_levels(&ValueArea { poc: 10.0, vah: 12.0, val: 8.0 });
        assert_eq!(levels[0].tier, Tier::Critical);
        assert_eq!(levels[1].kind, LevelType::Vah);
        assert_eq!(levels[2].tier, Tier::Major);
    }
}
