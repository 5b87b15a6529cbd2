//! CLI entry point for the hotel listings pipeline.
//!
//! Provides subcommands for cleaning the raw Booking.com and TripAdvisor
//! exports, analyzing the cleaned datasets, or doing both in one run.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hotel_insights::analyzers::analyzer::{analyze, analyze_dir};
use hotel_insights::cleaner::{CleaningSummary, clean_booking_file, clean_tripadvisor_file};
use hotel_insights::config::{AnalysisConfig, CleaningConfig};
use hotel_insights::output::{
    BOOKING_CLEANED_FILE, TRIPADVISOR_CLEANED_FILE, write_json, write_records,
};
use hotel_insights::records::{CleanedHotelRecord, CleanedReviewRecord};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "hotel_insights")]
#[command(about = "Clean and analyze hotel listing exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean both raw exports into CSV datasets
    Clean {
        /// Raw Booking.com export
        #[arg(long, default_value = "data/raw/booking_hotel.csv")]
        booking: PathBuf,

        /// Raw TripAdvisor export
        #[arg(long, default_value = "data/raw/tripadvisor_room.csv")]
        tripadvisor: PathBuf,

        /// Directory to write the cleaned CSVs to
        #[arg(short, long, default_value = "data/cleaned")]
        output_dir: PathBuf,
    },
    /// Analyze previously cleaned datasets into a JSON report
    Analyze {
        /// Directory holding the cleaned CSVs
        #[arg(short = 'd', long, default_value = "data/cleaned")]
        cleaned_dir: PathBuf,

        /// Report file to write
        #[arg(short, long, default_value = "output/analysis_report.json")]
        output: PathBuf,

        /// Optional JSON file overriding analysis thresholds
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Clean and analyze in one go
    Run {
        #[arg(long, default_value = "data/raw/booking_hotel.csv")]
        booking: PathBuf,

        #[arg(long, default_value = "data/raw/tripadvisor_room.csv")]
        tripadvisor: PathBuf,

        #[arg(short = 'd', long, default_value = "data/cleaned")]
        cleaned_dir: PathBuf,

        #[arg(short, long, default_value = "output/analysis_report.json")]
        output: PathBuf,

        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/hotel_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("hotel_insights.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            booking,
            tripadvisor,
            output_dir,
        } => {
            clean(&booking, &tripadvisor, &output_dir)?;
        }
        Commands::Analyze {
            cleaned_dir,
            output,
            config,
        } => {
            let config = load_analysis_config(config.as_deref())?;
            let report = analyze_dir(&cleaned_dir, &config)?;
            write_json(&output, &report)?;
        }
        Commands::Run {
            booking,
            tripadvisor,
            cleaned_dir,
            output,
            config,
        } => {
            let config = load_analysis_config(config.as_deref())?;
            let (hotels, reviews, summaries) = clean(&booking, &tripadvisor, &cleaned_dir)?;
            let report = analyze(&hotels, &reviews, &config).with_cleaning(summaries);
            write_json(&output, &report)?;
        }
    }

    Ok(())
}

fn load_analysis_config(path: Option<&str>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load(path),
        None => Ok(AnalysisConfig::default()),
    }
}

type Cleaned = (
    Vec<CleanedHotelRecord>,
    Vec<CleanedReviewRecord>,
    Vec<CleaningSummary>,
);

/// Cleans both sources and writes them to `output_dir`.
#[tracing::instrument(skip_all, fields(
    booking = %booking.display(),
    tripadvisor = %tripadvisor.display(),
    output_dir = %output_dir.display(),
))]
fn clean(booking: &Path, tripadvisor: &Path, output_dir: &Path) -> Result<Cleaned> {
    let config = CleaningConfig::default();

    let (hotels, booking_summary) = clean_booking_file(booking, &config)
        .with_context(|| format!("cleaning '{}' failed", booking.display()))?
        .into_parts();
    let (reviews, tripadvisor_summary) = clean_tripadvisor_file(tripadvisor, &config)
        .with_context(|| format!("cleaning '{}' failed", tripadvisor.display()))?
        .into_parts();

    write_records(&output_dir.join(BOOKING_CLEANED_FILE), &hotels)?;
    write_records(&output_dir.join(TRIPADVISOR_CLEANED_FILE), &reviews)?;

    info!(
        booking = hotels.len(),
        tripadvisor = reviews.len(),
        "Cleaning finished"
    );
    Ok((hotels, reviews, vec![booking_summary, tripadvisor_summary]))
}
