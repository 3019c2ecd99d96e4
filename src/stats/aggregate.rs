//! Success-rate statistics over the response log
//!
//! A success is a bounce or a rejection. Events are grouped in one pass by
//! level type, symbol, time context and confluence (single vs multiple).

use serde::{Deserialize, Serialize};

use super::event::ResponseEvent;

/// Bucket for events without a level type or symbol
pub const UNKNOWN: &str = "unknown";

/// Bucket for events without a time context
pub const OTHER: &str = "other";

/// Count and successes for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    pub count: u32,
    pub bounces: u32,
}

impl GroupStats {
    fn record(&mut self, success: bool) {
        self.count += 1;
        if success {
            self.bounces += 1;
        }
    }

    /// Success rate in percent, 0 for an empty group
    pub fn success_rate(&self) -> f64 {
        self.bounces as f64 / self.count.max(1) as f64 * 100.0
    }
}

/// Level-type group with the recorded move sizes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelTypeStats {
    #[serde(flatten)]
    pub stats: GroupStats,
    pub moves: Vec<f64>,
}

impl LevelTypeStats {
    pub fn avg_move(&self) -> f64 {
        if self.moves.is_empty() {
            0.0
        } else {
            self.moves.iter().sum::<f64>() / self.moves.len() as f64
        }
    }
}

/// Groups keyed by name, kept in first-seen order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTable<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for GroupTable<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: Default> GroupTable<T> {
    /// Group for `key`, created empty on first use
    pub fn entry(&mut self, key: &str) -> &mut T {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), T::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }
}

impl<T> GroupTable<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&(String, T), &(String, T)) -> std::cmp::Ordering,
    {
        self.entries.sort_by(|a, b| compare(a, b));
    }
}

/// Single-level vs multi-level success comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceEffect {
    pub single: GroupStats,
    pub multiple: GroupStats,
}

impl ConfluenceEffect {
    /// Percentage-point gain of multiple over single, only when positive
    pub fn improvement(&self) -> Option<f64> {
        let delta = self.multiple.success_rate() - self.single.success_rate();
        if delta > 0.0 {
            Some(delta)
        } else {
            None
        }
    }
}

/// Aggregated statistics for one snapshot of the log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub total_logs: usize,
    /// Ranked by success rate, highest first
    pub by_level_type: GroupTable<LevelTypeStats>,
    /// Alphabetical
    pub by_symbol: GroupTable<GroupStats>,
    /// Alphabetical
    pub by_time: GroupTable<GroupStats>,
    pub confluence: ConfluenceEffect,
}

/// Aggregate a snapshot of events
pub fn aggregate(events: &[ResponseEvent]) -> Report {
    let mut report = Report {
        total_logs: events.len(),
        ..Default::default()
    };

    for event in events {
        let success = event.response.is_success();

        let level_type = event.level_type.map(|t| t.as_str()).unwrap_or(UNKNOWN);
        let group = report.by_level_type.entry(level_type);
        group.stats.record(success);
        if let Some(size) = event.move_size {
            group.moves.push(size);
        }

        let symbol = event.symbol.as_deref().unwrap_or(UNKNOWN);
        report.by_symbol.entry(symbol).record(success);

        let time = event.time_context.as_deref().unwrap_or(OTHER);
        report.by_time.entry(time).record(success);

        if event.confluence.len() <= 1 {
            report.confluence.single.record(success);
        } else {
            report.confluence.multiple.record(success);
        }
    }

    // stable: equal rates keep first-seen order
    report.by_level_type.sort_by(|a, b| {
        b.1.stats
            .success_rate()
            .partial_cmp(&a.1.stats.success_rate())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    report.by_symbol.sort_by(|a, b| a.0.cmp(&b.0));
    report.by_time.sort_by(|a, b| a.0.cmp(&b.0));

    report
}
