//! `RainAlert` command-line interface
//!
//! `run` collects forecasts once, `watch` repeats the collection on an interval
//! and `report` renders the notification from the most recent stored run.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rainalert::config::{AppConfig, GroupingMode};
use rainalert::models::ForecastDay;
use rainalert::rain::{Report, build_reports, strategy_for};
use rainalert::{AccuWeatherClient, ForecastStore, RainAlertError, job, logging};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Hourly rain forecast notifications for branch networks
#[derive(Parser, Debug)]
#[command(name = "rainalert")]
#[command(about = "Collect hourly rain forecasts and render branch notifications")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user config dir, then ./config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch forecasts once, store them and write exports and notifications
    Run {
        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the collection now and then every N minutes
    Watch {
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
        interval_minutes: u64,
    },
    /// Render reports from the most recent stored run without fetching
    Report {
        /// Only this day (today, tomorrow, day-after)
        #[arg(long, value_parser = parse_day)]
        day: Option<ForecastDay>,

        /// Override the configured grouping (rain_hours, phrase)
        #[arg(long)]
        grouping: Option<GroupingMode>,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_day(value: &str) -> std::result::Result<ForecastDay, String> {
    ForecastDay::from_slug(value)
        .ok_or_else(|| format!("unknown day '{value}', expected today, tomorrow or day-after"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<RainAlertError>() {
            Some(err) => eprintln!("{}\n{e:#}", err.user_message()),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load_from_path(cli.config)?;
    logging::init(&config.logging, cli.verbose)?;
    info!("rainalert {}", rainalert::VERSION);

    match cli.command {
        Command::Run { json } => {
            let client = AccuWeatherClient::new(&config.fetch)?;
            let outcome = job::run_once(&config, &client).await?;
            print_reports(outcome.reports.values(), json)?;
        }
        Command::Watch { interval_minutes } => {
            watch(&config, interval_minutes).await?;
        }
        Command::Report {
            day,
            grouping,
            json,
        } => {
            let store = ForecastStore::open(&config.paths.database).with_context(|| {
                format!(
                    "Failed to open database {}",
                    config.paths.database.display()
                )
            })?;
            let Some(stored) = store.latest_run(&config.vocabulary.day_labels)? else {
                println!("No stored forecast runs in {}", config.paths.database.display());
                return Ok(());
            };
            info!("Rendering run of {}", stored.scraped_at);

            let mode = grouping.unwrap_or(config.report.grouping);
            let strategy = strategy_for(mode, &config.vocabulary);
            let reports = build_reports(&stored.records, strategy.as_ref(), &config.vocabulary);
            print_reports(
                reports
                    .values()
                    .filter(|report| day.is_none_or(|d| d == report.day)),
                json,
            )?;
        }
    }

    Ok(())
}

async fn watch(config: &AppConfig, interval_minutes: u64) -> Result<()> {
    let client = AccuWeatherClient::new(&config.fetch)?;
    let mut interval = tokio::time::interval(Duration::from_secs(interval_minutes * 60));
    info!("Collecting every {} minutes", interval_minutes);

    loop {
        interval.tick().await;
        match job::run_once(config, &client).await {
            Ok(outcome) => info!(
                "Run at {} stored {} rows, wrote {} files",
                outcome.scraped_at,
                outcome.records.len(),
                outcome.files.len()
            ),
            Err(e) => error!("Weather job failed: {:#}", e),
        }
    }
}

fn print_reports<'a>(reports: impl Iterator<Item = &'a Report>, json: bool) -> Result<()> {
    if json {
        let reports: Vec<&Report> = reports.collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in reports {
            println!("{report}\n");
        }
    }
    Ok(())
}
