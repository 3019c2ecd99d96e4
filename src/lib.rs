// Library crate - level generation and level response statistics

pub mod config;
pub mod error;
pub mod generate;
pub mod levels;
pub mod market_data;
pub mod notes;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use config::{AnalysisSettings, InstrumentConfig, InstrumentProfile, TickScale};
pub use error::LevelError;
pub use types::*;
