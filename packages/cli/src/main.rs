#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the crime dashboard data tools.
//!
//! Every command loads the given yearly exports, cleans them into the
//! canonical table and then summarizes, queries or exports it. Logging
//! goes through [`crime_dash_cli_utils::init_logger`] so log lines and the
//! load progress bar share the terminal.

mod summary;

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use crime_dash_aggregate::{aggregate, animation_frames, filter_options};
use crime_dash_aggregate_models::{
    ALL_CATEGORIES_LABEL, ALL_STREETS_LABEL, FrameKey, RawFilterRequest, Selection,
};
use crime_dash_cli_utils::{IndicatifProgress, MultiProgress};
use crime_dash_loader::{SourceId, load_sources};
use crime_dash_normalize::{CleaningOptions, clean, parse_cleaning_toml};
use crime_dash_report_models::CanonicalTable;

use crate::summary::Summary;

#[derive(Parser)]
#[command(name = "crime_dash", about = "Crime incident dashboard data tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// Incident exports to load, one per year (paths or http(s) URLs)
    #[arg(required = true)]
    sources: Vec<String>,
    /// Cleaning options TOML (defaults to the built-in Boston preset)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print row counts, the year range and distinct value counts
    Summary {
        #[command(flatten)]
        input: Input,
    },
    /// Print the selector options as JSON
    Options {
        #[command(flatten)]
        input: Input,
    },
    /// Run one aggregation and print the resulting tables as JSON
    Query {
        #[command(flatten)]
        input: Input,
        /// Year to scope the views to
        #[arg(long)]
        year: i32,
        /// Category for the flow table (repeatable; omit for all)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Street filter (repeatable; omit for all)
        #[arg(long = "street")]
        streets: Vec<String>,
        /// Drop flow groups with fewer incidents than this
        #[arg(long, default_value = "0")]
        min_count: u64,
        /// Category for the time series and map (repeatable; defaults to `--category`)
        #[arg(long = "series-category")]
        series_categories: Vec<String>,
    },
    /// Write the cleaned table as CSV
    Export {
        #[command(flatten)]
        input: Input,
        /// Output file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print map animation frames for one category as JSON
    Animate {
        #[command(flatten)]
        input: Input,
        /// Category to animate
        #[arg(long, default_value = ALL_CATEGORIES_LABEL)]
        category: String,
        /// Frame key: `year`, `month_year` or `day_month_year`
        #[arg(long, default_value = "month_year")]
        key: FrameKey,
    },
}

fn selection(values: Vec<String>, all_label: &str) -> Selection {
    if values.is_empty() {
        Selection::One(all_label.to_owned())
    } else {
        Selection::Many(values)
    }
}

fn cleaning_options(config: Option<&Path>) -> Result<CleaningOptions, Box<dyn std::error::Error>> {
    let Some(path) = config else {
        return Ok(CleaningOptions::boston());
    };
    log::info!("Reading cleaning options from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_cleaning_toml(&contents)?)
}

async fn load(input: &Input, multi: &MultiProgress) -> Result<CanonicalTable, Box<dyn std::error::Error>> {
    let options = cleaning_options(input.config.as_deref())?;
    let sources: Vec<SourceId> = input.sources.iter().map(|s| SourceId::from(s.as_str())).collect();

    let progress = IndicatifProgress::sources_bar(multi, "Loading sources");
    let raw = load_sources(&sources, &progress).await?;

    let start = Instant::now();
    let table = clean(raw, &options)?;
    log::info!(
        "Cleaned {} records in {:.1}s",
        table.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(table)
}

fn export_csv(table: &CanonicalTable, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let writer: Box<dyn std::io::Write> = match output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut out = csv::Writer::from_writer(writer);
    for record in table {
        out.serialize(record)?;
    }
    out.flush()?;

    if let Some(path) = output {
        log::info!("Wrote {} records to {}", table.len(), path.display());
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_dash_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { input } => {
            let table = load(&input, &multi).await?;
            println!("{}", Summary::of(&table));
        }
        Commands::Options { input } => {
            let table = load(&input, &multi).await?;
            print_json(&filter_options(&table))?;
        }
        Commands::Query {
            input,
            year,
            categories,
            streets,
            min_count,
            series_categories,
        } => {
            let table = load(&input, &multi).await?;
            let raw = RawFilterRequest {
                year,
                categories: selection(categories, ALL_CATEGORIES_LABEL),
                streets: selection(streets, ALL_STREETS_LABEL),
                min_count,
                series_categories: (!series_categories.is_empty())
                    .then(|| Selection::Many(series_categories)),
            };
            print_json(&aggregate(&table, &raw.resolve()))?;
        }
        Commands::Export { input, output } => {
            let table = load(&input, &multi).await?;
            export_csv(&table, output.as_deref())?;
        }
        Commands::Animate {
            input,
            category,
            key,
        } => {
            let table = load(&input, &multi).await?;
            print_json(&animation_frames(&table, &category, key))?;
        }
    }

    Ok(())
}
