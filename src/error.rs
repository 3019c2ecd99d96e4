use thiserror::Error;

/// Validation and configuration errors surfaced before any store mutation
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("Unknown symbol: {symbol} (known: {known})")]
    UnknownSymbol { symbol: String, known: String },

    #[error("Invalid response: {value} (expected one of bounce, rejection, breakout, false)")]
    InvalidResponse { value: String },

    #[error("Invalid level type: {value}")]
    InvalidLevelType { value: String },

    #[error("Malformed time: {value} (expected HH:MM)")]
    InvalidTime { value: String },

    #[error("Unsupported store version: {version} (supported: {supported})")]
    UnsupportedStoreVersion { version: String, supported: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}
