//! Record entry: validate one observation and append it to the log

use anyhow::Result;
use chrono::{NaiveDateTime, NaiveTime};
use tracing::info;

use super::event::{parse_confluence, time_context_at, Response, ResponseEvent};
use super::store::EventStore;
use crate::config::InstrumentConfig;
use crate::error::LevelError;
use crate::types::LevelType;

/// Raw inputs for one observation, as typed by the trader
#[derive(Debug, Clone, Default)]
pub struct RecordRequest {
    pub symbol: String,
    pub level: f64,
    pub response: String,
    pub price_before: Option<f64>,
    pub price_after: Option<f64>,
    /// `HH:MM` on the current day; defaults to now
    pub time: Option<String>,
    pub level_type: Option<String>,
    /// Comma-separated level-type tags present at the price
    pub confluence: Option<String>,
    pub notes: Option<String>,
}

impl RecordRequest {
    /// Validate inputs and derive the stored fields.
    ///
    /// `move_size` needs both prices; `time_context` comes from the effective
    /// timestamp. Both are fixed here and never recomputed.
    pub fn into_event(
        self,
        config: &InstrumentConfig,
        now: NaiveDateTime,
    ) -> Result<ResponseEvent, LevelError> {
        let symbol = config.lookup(&self.symbol)?.symbol.clone();
        let response: Response = self.response.parse()?;
        let level_type = self
            .level_type
            .as_deref()
            .map(str::parse::<LevelType>)
            .transpose()?;

        let timestamp = match self.time.as_deref() {
            Some(raw) => {
                let time = NaiveTime::parse_from_str(raw, "%H:%M")
                    .map_err(|_| LevelError::InvalidTime {
                        value: raw.to_string(),
                    })?;
                now.date().and_time(time)
            }
            None => now,
        };

        let move_size = match (self.price_before, self.price_after) {
            (Some(before), Some(after)) => Some((after - before).abs()),
            _ => None,
        };

        Ok(ResponseEvent {
            timestamp,
            symbol: Some(symbol),
            level: self.level,
            response,
            level_type,
            price_before: move_size.and(self.price_before),
            price_after: move_size.and(self.price_after),
            move_size,
            confluence: self.confluence.as_deref().map(parse_confluence).unwrap_or_default(),
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            time_context: time_context_at(&timestamp).map(str::to_string),
        })
    }
}

/// Validate and append one observation. Returns the event and the new total.
///
/// Nothing is written when validation fails.
pub fn record_response(
    store: &EventStore,
    config: &InstrumentConfig,
    request: RecordRequest,
    now: NaiveDateTime,
) -> Result<(ResponseEvent, usize)> {
    let event = request.into_event(config, now)?;
    let total = store.append(event.clone())?;

    info!(
        "Logged {} {} {} ({} entries)",
        event.symbol.as_deref().unwrap_or_default(),
        event.level,
        event.response,
        total
    );

    Ok((event, total))
}
