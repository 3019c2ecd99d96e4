//! Markdown rendering of aggregated statistics

use chrono::NaiveDateTime;

use super::aggregate::{GroupStats, Report};

/// Render the statistics report as markdown
pub fn render_report(report: &Report, generated_at: NaiveDateTime) -> String {
    let mut lines = vec![
        "# Level Statistics Report".to_string(),
        format!("\nGenerated: {}", generated_at.format("%Y-%m-%d %H:%M")),
        "\n## Overview\n".to_string(),
        format!("Total logged responses: **{}**", report.total_logs),
    ];

    lines.push("\n## Success Rate by Level Type\n".to_string());
    lines.push("| Level Type | Count | Bounces | Success % | Avg Move |".to_string());
    lines.push("|------------|-------|---------|-----------|----------|".to_string());
    for (level_type, group) in report.by_level_type.iter() {
        lines.push(format!(
            "| {} | {} | {} | {:.1}% | {:.1} |",
            level_type,
            group.stats.count,
            group.stats.bounces,
            group.stats.success_rate(),
            group.avg_move()
        ));
    }

    lines.push("\n## Success Rate by Symbol\n".to_string());
    lines.push("| Symbol | Count | Bounces | Success % |".to_string());
    lines.push("|--------|-------|---------|-----------|".to_string());
    for (symbol, stats) in report.by_symbol.iter() {
        lines.push(group_row(symbol, stats));
    }

    lines.push("\n## Time-of-Day Effect\n".to_string());
    lines.push("| Context | Count | Bounces | Success % |".to_string());
    lines.push("|---------|-------|---------|-----------|".to_string());
    for (context, stats) in report.by_time.iter() {
        lines.push(group_row(context, stats));
    }

    let conf = &report.confluence;
    lines.push("\n## Confluence Effect\n".to_string());
    lines.push(format!(
        "- **Single level:** {} logs, {:.1}% success",
        conf.single.count,
        conf.single.success_rate()
    ));
    lines.push(format!(
        "- **Multiple confluence:** {} logs, {:.1}% success",
        conf.multiple.count,
        conf.multiple.success_rate()
    ));
    if let Some(improvement) = conf.improvement() {
        lines.push(format!(
            "\n✅ **Confluence improves success rate by {:.1} percentage points**",
            improvement
        ));
    }

    lines.push("\n---\n*Update statistics with `levels report`*".to_string());

    lines.join("\n")
}

fn group_row(key: &str, stats: &GroupStats) -> String {
    format!(
        "| {} | {} | {} | {:.1}% |",
        key,
        stats.count,
        stats.bounces,
        stats.success_rate()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate::aggregate;
    use crate::stats::event::{Response, ResponseEvent, HALF_HOUR};
    use crate::types::LevelType;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 8)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn event(
        symbol: &str,
        response: Response,
        level_type: LevelType,
        confluence: &[&str],
    ) -> ResponseEvent {
        ResponseEvent {
            timestamp: at(10, 30),
            symbol: Some(symbol.to_string()),
            level: 100.0,
            response,
            level_type: Some(level_type),
            price_before: Some(100.0),
            price_after: Some(104.5),
            move_size: Some(4.5),
            confluence: confluence.iter().map(|c| c.to_string()).collect(),
            notes: None,
            time_context: Some(HALF_HOUR.to_string()),
        }
    }

    #[test]
    fn test_report_sections() {
        let events = vec![
            event("NQ", Response::Bounce, LevelType::Poc, &["poc", "round_major"]),
            event("ES", Response::False, LevelType::Poc, &["poc"]),
            event("ES", Response::Rejection, LevelType::PrevDayHigh, &[]),
        ];
        let md = render_report(&aggregate(&events), at(18, 5));

        assert!(md.starts_with("# Level Statistics Report"));
        assert!(md.contains("Generated: 2026-01-08 18:05"));
        assert!(md.contains("Total logged responses: **3**"));
        assert!(md.contains("| prev_day_high | 1 | 1 | 100.0% | 4.5 |"));
        assert!(md.contains("| poc | 2 | 1 | 50.0% | 4.5 |"));
        assert!(md.contains("| ES | 2 | 1 | 50.0% |"));
        assert!(md.contains("| half_hour | 3 | 2 | 66.7% |"));
        assert!(md.contains("- **Single level:** 2 logs, 50.0% success"));
        assert!(md.contains("Confluence improves success rate by 50.0 percentage points"));

        // ranked: prev_day_high (100%) before poc (50%)
        assert!(md.find("| prev_day_high").unwrap() < md.find("| poc").unwrap());
    }

    #[test]
    fn test_no_confluence_line_without_gain() {
        let events = vec![
            event("NQ", Response::Bounce, LevelType::Vah, &[]),
            event("NQ", Response::Breakout, LevelType::Vah, &["vah", "weekly_high"]),
        ];
        let md = render_report(&aggregate(&events), at(9, 0));
        assert!(!md.contains("Confluence improves"));
    }
}
