//! Instrument table and analysis settings
//!
//! Static configuration is passed into the level generator and the market
//! data adapter explicitly, so tests can substitute synthetic scales.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LevelError;

/// Round-level granularity for an instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickScale {
    /// Distance between adjacent round levels
    pub step: f64,
    /// Distance either side of the anchor to enumerate
    pub spread: f64,
    /// Round levels that are multiples of this are major
    pub major_modulus: f64,
}

/// Instrument class, determines the default tick scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentClass {
    Equity,
    EsFuture,
    NqFuture,
}

impl InstrumentClass {
    pub fn default_scale(&self) -> TickScale {
        match self {
            InstrumentClass::NqFuture => TickScale {
                step: 50.0,
                spread: 250.0,
                major_modulus: 500.0,
            },
            InstrumentClass::EsFuture => TickScale {
                step: 25.0,
                spread: 150.0,
                major_modulus: 500.0,
            },
            InstrumentClass::Equity => TickScale {
                step: 5.0,
                spread: 25.0,
                major_modulus: 50.0,
            },
        }
    }
}

/// One tradable instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Short symbol used when logging responses (e.g. "NQ")
    pub symbol: String,
    /// Symbol as written into chart notes (e.g. "/NQH26:XCME@DXFEED")
    pub chart_symbol: String,
    /// Ticker requested from the market data provider (e.g. "NQ=F")
    pub data_ticker: String,
    pub class: InstrumentClass,
    pub scale: TickScale,
}

impl InstrumentProfile {
    pub fn new(
        symbol: &str,
        chart_symbol: &str,
        data_ticker: &str,
        class: InstrumentClass,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            chart_symbol: chart_symbol.to_string(),
            data_ticker: data_ticker.to_string(),
            class,
            scale: class.default_scale(),
        }
    }
}

/// Static symbol table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub instruments: Vec<InstrumentProfile>,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            instruments: vec![
                InstrumentProfile::new("NVDA", "NVDA@DXFEED", "NVDA", InstrumentClass::Equity),
                InstrumentProfile::new("AAPL", "AAPL@DXFEED", "AAPL", InstrumentClass::Equity),
                InstrumentProfile::new("TSLA", "TSLA@DXFEED", "TSLA", InstrumentClass::Equity),
                InstrumentProfile::new("AMD", "AMD@DXFEED", "AMD", InstrumentClass::Equity),
                InstrumentProfile::new(
                    "ES",
                    "/ESH26:XCME@DXFEED",
                    "ES=F",
                    InstrumentClass::EsFuture,
                ),
                InstrumentProfile::new(
                    "NQ",
                    "/NQH26:XCME@DXFEED",
                    "NQ=F",
                    InstrumentClass::NqFuture,
                ),
            ],
        }
    }
}

impl InstrumentConfig {
    /// Load an instrument table from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read instrument config: {:?}", path))?;
        let config: InstrumentConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse instrument config: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject scales that cannot enumerate levels
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.instruments.is_empty() {
            return Err(LevelError::InvalidConfig {
                reason: "no instruments configured".to_string(),
            });
        }
        for profile in &self.instruments {
            let scale = &profile.scale;
            if scale.step <= 0.0 || scale.spread < 0.0 || scale.major_modulus <= 0.0 {
                return Err(LevelError::InvalidConfig {
                    reason: format!(
                        "{}: step and major_modulus must be positive, spread non-negative",
                        profile.symbol
                    ),
                });
            }
        }
        Ok(())
    }

    /// Look up an instrument by its short symbol
    pub fn lookup(&self, symbol: &str) -> Result<&InstrumentProfile, LevelError> {
        self.instruments
            .iter()
            .find(|p| p.symbol == symbol)
            .ok_or_else(|| LevelError::UnknownSymbol {
                symbol: symbol.to_string(),
                known: self.symbols().join(", "),
            })
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.instruments.iter().map(|p| p.symbol.as_str()).collect()
    }
}

/// Numeric settings for level generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Histogram bins for the volume profile
    pub bins: usize,
    /// Fraction of total volume inside the value area
    pub value_area_fraction: f64,
    /// Decimal places for generated prices
    pub precision: u32,
    /// Calendar days of daily bars to request
    pub daily_lookback_days: u32,
    /// Calendar days of intraday bars to request
    pub intraday_lookback_days: u32,
    /// Intraday bar interval in minutes
    pub intraday_interval_minutes: u32,
    /// Max distance between neighbouring levels in one confluence zone
    pub confluence_tolerance: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            bins: 50,
            value_area_fraction: 0.70,
            precision: 2,
            daily_lookback_days: 45,
            intraday_lookback_days: 5,
            intraday_interval_minutes: 30,
            confluence_tolerance: 2.0,
        }
    }
}
