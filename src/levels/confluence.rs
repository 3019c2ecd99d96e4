//! Grouping of coincident levels into confluence zones

use serde::{Deserialize, Serialize};

use crate::types::{LevelType, PriceLevel};

/// Cluster of levels whose neighbouring prices lie within a tolerance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceZone {
    pub low: f64,
    pub high: f64,
    /// Distinct kinds in ascending price order of first appearance
    pub kinds: Vec<LevelType>,
    pub labels: Vec<String>,
}

impl ConfluenceZone {
    /// Number of independent sources in the zone.
    ///
    /// A round level and its quarter sublevels count as one source.
    pub fn source_count(&self) -> usize {
        let round = |k: &LevelType| {
            matches!(k, LevelType::RoundMajor | LevelType::RoundMinor | LevelType::Quarter)
        };
        let others = self.kinds.iter().filter(|k| !round(k)).count();
        others + usize::from(self.kinds.iter().any(round))
    }

    pub fn is_confluence(&self) -> bool {
        self.source_count() >= 2
    }

    /// Tags in the form accepted by the response log
    pub fn tags(&self) -> Vec<String> {
        self.kinds.iter().map(|k| k.as_str().to_string()).collect()
    }

    pub fn mid(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

/// Cluster levels by price and keep the clusters with two or more sources
pub fn group_confluence(levels: &[PriceLevel], tolerance: f64) -> Vec<ConfluenceZone> {
    let mut sorted: Vec<&PriceLevel> = levels.iter().collect();
    sorted.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));

    let mut zones: Vec<ConfluenceZone> = Vec::new();
    let mut current: Option<ConfluenceZone> = None;

    for level in sorted {
        match current.as_mut() {
            Some(zone) if level.price - zone.high <= tolerance => {
                zone.high = level.price;
                if !zone.kinds.contains(&level.kind) {
                    zone.kinds.push(level.kind);
                }
                zone.labels.push(level.label.clone());
            }
            _ => {
                if let Some(done) = current.take() {
                    zones.push(done);
                }
                current = Some(ConfluenceZone {
                    low: level.price,
                    high: level.price,
                    kinds: vec![level.kind],
                    labels: vec![level.label.clone()],
                });
            }
        }
    }
    if let Some(done) = current {
        zones.push(done);
    }

    zones.retain(ConfluenceZone::is_confluence);
    zones
}
