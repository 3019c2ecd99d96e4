use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use level_stats::config::{AnalysisSettings, InstrumentConfig};
use level_stats::generate::{generate_all, GenerateOptions};
use level_stats::levels::TierPolicy;
use level_stats::market_data::ChartApiClient;
use level_stats::notes::{save_notes, ColorPolicy};
use level_stats::stats::{aggregate, record_response, render_report, EventStore, RecordRequest};
use level_stats::types::Tier;

#[derive(Parser, Debug)]
#[command(name = "levels")]
#[command(about = "Chart level notes and level response statistics")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Instrument table (JSON); built-in table when omitted
    #[arg(long, global = true, env = "LEVELS_INSTRUMENTS")]
    instruments: Option<PathBuf>,

    /// Print verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TierArg {
    /// Majors with quarter sublevels, other round levels minor
    Tiered,
    /// Every round level minor, no quarters
    Flat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorArg {
    /// Red / orange / yellow by tier
    TrafficLight,
    /// One color for every note
    Flat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate chart notes CSV with price levels for every instrument
    Notes {
        /// Output CSV path
        #[arg(short, long, default_value = "notes.csv")]
        output: PathBuf,

        /// Round level tiering
        #[arg(long, value_enum, default_value = "tiered")]
        tiers: TierArg,

        /// Note color scheme
        #[arg(long, value_enum, default_value = "traffic-light")]
        colors: ColorArg,

        /// Only these symbols (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Max distance between levels in one confluence zone
        #[arg(long, default_value = "2.0")]
        confluence_tolerance: f64,
    },

    /// Log how price reacted at a level
    Log {
        /// Trading symbol (e.g. NQ)
        symbol: String,

        /// Price level
        #[arg(allow_negative_numbers = true)]
        level: f64,

        /// Market response: bounce, rejection, breakout, false
        response: String,

        /// Price before touch
        #[arg(long)]
        before: Option<f64>,

        /// Price after move
        #[arg(long)]
        after: Option<f64>,

        /// Time (HH:MM), today
        #[arg(long)]
        time: Option<String>,

        /// Level type (e.g. poc, prev_day_high, round_major)
        #[arg(long)]
        level_type: Option<String>,

        /// Comma-separated confluence factors
        #[arg(long)]
        confluence: Option<String>,

        /// Additional notes
        #[arg(long)]
        notes: Option<String>,

        /// Event log path
        #[arg(long, env = "LEVEL_STATS_PATH", default_value = "level-stats.json")]
        store: PathBuf,
    },

    /// Analyze logged responses and write a markdown report
    Report {
        /// Event log path
        #[arg(long, env = "LEVEL_STATS_PATH", default_value = "level-stats.json")]
        store: PathBuf,

        /// Output markdown path
        #[arg(short, long, default_value = "stats-report.md")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.instruments {
        Some(path) => InstrumentConfig::from_json_file(path)?,
        None => InstrumentConfig::default(),
    };

    match args.command {
        Commands::Notes {
            output,
            tiers,
            colors,
            symbols,
            confluence_tolerance,
        } => {
            run_notes(config, output, tiers, colors, symbols, confluence_tolerance).await?;
        }
        Commands::Log {
            symbol,
            level,
            response,
            before,
            after,
            time,
            level_type,
            confluence,
            notes,
            store,
        } => {
            let request = RecordRequest {
                symbol,
                level,
                response,
                price_before: before,
                price_after: after,
                time,
                level_type,
                confluence,
                notes,
            };
            run_log(&config, request, store)?;
        }
        Commands::Report { store, output } => {
            run_report(store, output)?;
        }
    }

    Ok(())
}

async fn run_notes(
    mut config: InstrumentConfig,
    output: PathBuf,
    tiers: TierArg,
    colors: ColorArg,
    symbols: Vec<String>,
    confluence_tolerance: f64,
) -> Result<()> {
    if !symbols.is_empty() {
        for symbol in &symbols {
            config.lookup(symbol)?;
        }
        config.instruments.retain(|p| symbols.contains(&p.symbol));
    }

    let options = GenerateOptions {
        settings: AnalysisSettings {
            confluence_tolerance,
            ..Default::default()
        },
        tier_policy: match tiers {
            TierArg::Tiered => TierPolicy::Tiered,
            TierArg::Flat => TierPolicy::Flat(Tier::Minor),
        },
    };
    let color_policy = match colors {
        ColorArg::TrafficLight => ColorPolicy::TrafficLight,
        ColorArg::Flat => ColorPolicy::flat(),
    };

    let provider = ChartApiClient::from_env()?;
    let results = generate_all(&provider, &config, &options).await;

    let mut rows = Vec::new();
    for instrument in &results {
        for zone in &instrument.zones {
            info!(
                "{} confluence at {:.2} ({:.2}-{:.2}) {}: --confluence {}",
                instrument.symbol,
                zone.mid(),
                zone.low,
                zone.high,
                zone.labels.join(" / "),
                zone.tags().join(",")
            );
        }
        rows.extend(instrument.note_rows(&color_policy));
    }

    if results.len() < config.instruments.len() {
        warn!(
            "Generated levels for {} of {} instruments",
            results.len(),
            config.instruments.len()
        );
    }

    save_notes(&output, &rows)?;
    info!("Wrote {} notes to {:?}", rows.len(), output);

    Ok(())
}

fn run_log(config: &InstrumentConfig, request: RecordRequest, store: PathBuf) -> Result<()> {
    let store = EventStore::new(store);
    let now = chrono::Local::now().naive_local();
    let (event, total) = record_response(&store, config, request, now)?;

    println!(
        "✓ Logged {} {} {}",
        event.symbol.as_deref().unwrap_or_default(),
        event.level,
        event.response
    );
    println!("  Total entries: {}", total);

    Ok(())
}

fn run_report(store: PathBuf, output: PathBuf) -> Result<()> {
    let store = EventStore::new(store);
    let events = store.load_all()?;

    if events.is_empty() {
        warn!(
            "No log entries found in {:?}. Add entries with `levels log` first.",
            store.path()
        );
        return Ok(());
    }

    let report = aggregate(&events);
    let markdown = render_report(&report, chrono::Local::now().naive_local());
    std::fs::write(&output, markdown)
        .with_context(|| format!("Failed to write report: {:?}", output))?;

    println!("✓ Generated report: {:?}", output);
    println!("  Analyzed {} log entries", events.len());

    Ok(())
}
