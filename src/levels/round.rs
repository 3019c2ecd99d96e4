//! Round-number (psychological) levels around a reference price

use serde::{Deserialize, Serialize};

use crate::config::TickScale;
use crate::types::{round_to, LevelType, PriceLevel, Tier};

/// Absolute offsets of the quarter sublevels above a major round level
const QUARTER_OFFSETS: [f64; 3] = [0.25, 0.50, 0.75];

/// How round levels are tiered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierPolicy {
    /// Every round level gets the same tier, no quarter sublevels
    Flat(Tier),
    /// Multiples of the major modulus are major and spawn quarter sublevels,
    /// everything else is minor
    Tiered,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::Tiered
    }
}

/// Enumerate round levels within `±spread` of the reference price.
///
/// The anchor is the reference rounded to the nearest step. Output is in
/// ascending price order.
pub fn round_levels(
    reference_price: f64,
    scale: &TickScale,
    policy: TierPolicy,
    precision: u32,
) -> Vec<PriceLevel> {
    let base = (reference_price / scale.step).round() * scale.step;
    let steps = (scale.spread / scale.step + 1e-9).floor() as i64;

    let mut levels = Vec::new();
    for i in -steps..=steps {
        let price = round_to(base + i as f64 * scale.step, precision);
        let major = is_multiple(price, scale.major_modulus);
        let kind = if major {
            LevelType::RoundMajor
        } else {
            LevelType::RoundMinor
        };
        let label = format!("Round {:.0}", price);

        match policy {
            TierPolicy::Flat(tier) => levels.push(PriceLevel::new(price, label, tier, kind)),
            TierPolicy::Tiered if major => {
                levels.push(PriceLevel::new(price, label, Tier::Major, kind));
                for offset in QUARTER_OFFSETS {
                    let quarter = round_to(price + offset, precision);
                    levels.push(PriceLevel::new(
                        quarter,
                        format!("Quarter {:.2}", quarter),
                        Tier::Minor,
                        LevelType::Quarter,
                    ));
                }
            }
            TierPolicy::Tiered => levels.push(PriceLevel::new(price, label, Tier::Minor, kind)),
        }
    }

    levels
}

fn is_multiple(price: f64, modulus: f64) -> bool {
    let ratio = price / modulus;
    (ratio - ratio.round()).abs() < 1e-9
}
