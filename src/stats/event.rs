use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::error::LevelError;
use crate::types::LevelType;

/// Tag for events near a half-hour or hour mark
pub const HALF_HOUR: &str = "half_hour";

/// How price reacted at a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Bounce,
    Rejection,
    Breakout,
    False,
}

impl Response {
    pub const ALL: [Response; 4] = [
        Response::Bounce,
        Response::Rejection,
        Response::Breakout,
        Response::False,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Response::Bounce => "bounce",
            Response::Rejection => "rejection",
            Response::Breakout => "breakout",
            Response::False => "false",
        }
    }

    /// The level held: bounce or rejection
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Bounce | Response::Rejection)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Response {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Response::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| LevelError::InvalidResponse {
                value: s.to_string(),
            })
    }
}

/// One observed reaction at a level. Never modified once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEvent {
    pub timestamp: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub level: f64,
    pub response: Response,
    /// Tags outside [`LevelType`] read as untagged
    #[serde(
        default,
        deserialize_with = "lenient_level_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub level_type: Option<LevelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_before: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_after: Option<f64>,
    /// |after - before|, fixed when the event is logged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub confluence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Fixed when the event is logged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_context: Option<String>,
}

fn lenient_level_type<'de, D>(deserializer: D) -> Result<Option<LevelType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|tag| tag.parse().ok()))
}

/// Tag for a minute of the hour: 25-35 and 55-05 are near a half-hour mark
pub fn time_context(minute: u32) -> Option<&'static str> {
    if (25..=35).contains(&minute) || minute >= 55 || minute <= 5 {
        Some(HALF_HOUR)
    } else {
        None
    }
}

/// Tag for a timestamp
pub fn time_context_at(timestamp: &NaiveDateTime) -> Option<&'static str> {
    time_context(timestamp.minute())
}

/// Split a comma-separated confluence list, keeping first occurrences in order
pub fn parse_confluence(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
