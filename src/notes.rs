//! Chart note (Cloud Notes CSV) rendering
//!
//! One row per level: symbol, price, label, colors, alignment, diameter and
//! the horizontal-line flag. Colors come from a pluggable policy.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::types::{PriceLevel, Tier};

pub const RED: &str = "#FF0000";
pub const ORANGE: &str = "#FF8C00";
pub const YELLOW: &str = "#FFD700";
pub const WHITE: &str = "#ffffff";
pub const BLACK: &str = "#000000";

const HEADER: [&str; 8] = [
    "Symbol",
    "Price Level",
    "Note",
    "Foreground Color",
    "Background Color",
    "Text Alignment",
    "Diameter",
    "Draw Note Price Horizontal Line",
];

/// How note colors are chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorPolicy {
    /// Same colors for every note
    Flat { foreground: String, background: String },
    /// Red/orange/yellow background by tier
    TrafficLight,
}

impl Default for ColorPolicy {
    fn default() -> Self {
        Self::TrafficLight
    }
}

impl ColorPolicy {
    pub fn flat() -> Self {
        Self::Flat {
            foreground: WHITE.to_string(),
            background: ORANGE.to_string(),
        }
    }

    /// (foreground, background) for a level
    pub fn colors(&self, level: &PriceLevel) -> (String, String) {
        match self {
            ColorPolicy::Flat {
                foreground,
                background,
            } => (foreground.clone(), background.clone()),
            ColorPolicy::TrafficLight => {
                let background = match level.tier {
                    Tier::Critical => RED,
                    Tier::Major => ORANGE,
                    Tier::Minor => YELLOW,
                };
                let foreground = if level.kind.is_volume_profile() { BLACK } else { WHITE };
                (foreground.to_string(), background.to_string())
            }
        }
    }
}

/// One annotation row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRow {
    pub symbol: String,
    pub price: f64,
    pub note: String,
    pub foreground: String,
    pub background: String,
    pub alignment: String,
    pub diameter: u32,
    pub draw_line: bool,
}

impl NoteRow {
    pub fn from_level(chart_symbol: &str, level: &PriceLevel, policy: &ColorPolicy) -> Self {
        let (foreground, background) = policy.colors(level);
        Self {
            symbol: chart_symbol.to_string(),
            price: level.price,
            note: level.label.clone(),
            foreground,
            background,
            alignment: "left".to_string(),
            diameter: 3,
            draw_line: false,
        }
    }

    fn record(&self) -> [String; 8] {
        [
            self.symbol.clone(),
            format!("{:.2}", self.price),
            self.note.clone(),
            self.foreground.clone(),
            self.background.clone(),
            self.alignment.clone(),
            self.diameter.to_string(),
            if self.draw_line { "TRUE" } else { "FALSE" }.to_string(),
        ]
    }
}

/// Write the header and all rows as CSV
pub fn write_notes<W: Write>(writer: W, rows: &[NoteRow]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.write_record(row.record())?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn render_notes(rows: &[NoteRow]) -> Result<String> {
    let mut buf = Vec::new();
    write_notes(&mut buf, rows)?;
    String::from_utf8(buf).context("Notes CSV is not valid UTF-8")
}

pub fn save_notes(path: &Path, rows: &[NoteRow]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create notes file: {:?}", path))?;
    write_notes(file, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LevelType;

    #[test]
    fn test_traffic_light_colors() {
        let policy = ColorPolicy::TrafficLight;
        let poc = PriceLevel::new(100.0, "POC", Tier::Critical, LevelType::Poc);
        let pdh = PriceLevel::new(101.0, "Prev Day High", Tier::Critical, LevelType::PrevDayHigh);
        let round = PriceLevel::new(105.0, "Round 105", Tier::Minor, LevelType::RoundMinor);

        assert_eq!(policy.colors(&poc), (BLACK.to_string(), RED.to_string()));
        assert_eq!(policy.colors(&pdh), (WHITE.to_string(), RED.to_string()));
        assert_eq!(policy.colors(&round), (WHITE.to_string(), YELLOW.to_string()));
    }

    #[test]
    fn test_flat_colors_ignore_tier() {
        let policy = ColorPolicy::flat();
        let a = PriceLevel::new(1.0, "a", Tier::Critical, LevelType::Poc);
        let b = PriceLevel::new(2.0, "b", Tier::Minor, LevelType::Quarter);
        assert_eq!(policy.colors(&a), policy.colors(&b));
    }

    #[test]
    fn test_render_rows() {
        let level = PriceLevel::new(25000.5, "Quarter 25000.50", Tier::Minor, LevelType::Quarter);
        let row = NoteRow::from_level("/NQH26:XCME@DXFEED", &level, &ColorPolicy::TrafficLight);
        let csv = render_notes(&[row]).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Symbol,Price Level,Note,"));
        assert_eq!(
            lines[1],
            "/NQH26:XCME@DXFEED,25000.50,Quarter 25000.50,#ffffff,#FFD700,left,3,FALSE"
        );
    }

    #[test]
    fn test_label_with_comma_is_quoted() {
        let level = PriceLevel::new(10.0, "POC, VAH", Tier::Major, LevelType::Poc);
        let row = NoteRow::from_level("AMD@DXFEED", &level, &ColorPolicy::flat());
        let csv = render_notes(&[row]).unwrap();
        assert!(csv.contains("\"POC, VAH\""));
    }
}
