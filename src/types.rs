use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::LevelError;

/// OHLCV bar for one interval of one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Mean of high, low and close
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Significance tier of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Critical,
    Major,
    Minor,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Critical => write!(f, "CRITICAL"),
            Tier::Major => write!(f, "MAJOR"),
            Tier::Minor => write!(f, "MINOR"),
        }
    }
}

/// Kind of price level, shared by the generators and the response log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelType {
    PrevDayHigh,
    PrevDayLow,
    WeeklyHigh,
    WeeklyLow,
    MonthlyHigh,
    MonthlyLow,
    Poc,
    Vah,
    Val,
    RoundMajor,
    RoundMinor,
    Quarter,
}

impl LevelType {
    pub const ALL: [LevelType; 12] = [
        LevelType::PrevDayHigh,
        LevelType::PrevDayLow,
        LevelType::WeeklyHigh,
        LevelType::WeeklyLow,
        LevelType::MonthlyHigh,
        LevelType::MonthlyLow,
        LevelType::Poc,
        LevelType::Vah,
        LevelType::Val,
        LevelType::RoundMajor,
        LevelType::RoundMinor,
        LevelType::Quarter,
    ];

    /// Tag used in the response log and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelType::PrevDayHigh => "prev_day_high",
            LevelType::PrevDayLow => "prev_day_low",
            LevelType::WeeklyHigh => "weekly_high",
            LevelType::WeeklyLow => "weekly_low",
            LevelType::MonthlyHigh => "monthly_high",
            LevelType::MonthlyLow => "monthly_low",
            LevelType::Poc => "poc",
            LevelType::Vah => "vah",
            LevelType::Val => "val",
            LevelType::RoundMajor => "round_major",
            LevelType::RoundMinor => "round_minor",
            LevelType::Quarter => "quarter",
        }
    }

    pub fn is_volume_profile(&self) -> bool {
        matches!(self, LevelType::Poc | LevelType::Vah | LevelType::Val)
    }
}

impl std::fmt::Display for LevelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LevelType {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LevelType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LevelError::InvalidLevelType {
                value: s.to_string(),
            })
    }
}

/// A price level to draw on the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub label: String,
    pub tier: Tier,
    pub kind: LevelType,
}

impl PriceLevel {
    pub fn new(price: f64, label: impl Into<String>, tier: Tier, kind: LevelType) -> Self {
        Self {
            price,
            label: label.into(),
            tier,
            kind,
        }
    }
}

/// Point of Control and Value Area bounds from one estimator run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueArea {
    pub poc: f64,
    pub vah: f64,
    pub val: f64,
}

/// Round a price to a fixed number of decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
