//! Collection Job Module
//!
//! One run loads the branch directory, fetches every supported district once
//! per forecast day, summarizes each branch, persists everything under a single
//! timestamp and writes the CSV exports and notification files.

use crate::branches::load_branches;
use crate::config::AppConfig;
use crate::export::Exporter;
use crate::fetcher::ForecastSource;
use crate::models::{Branch, DailySummary, District, ForecastDay, HourlyForecast, HourlyObservation};
use crate::rain::{Report, build_reports, strategy_for, summarize_branches};
use crate::storage::ForecastStore;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, Timelike};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What one run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub scraped_at: NaiveDateTime,
    /// Branches whose district is supported
    pub branches_processed: usize,
    /// Branches skipped for an unsupported or unknown district
    pub branches_skipped: usize,
    /// District-day pages that could not be fetched
    pub failed_fetches: usize,
    pub records: Vec<HourlyForecast>,
    pub summaries: Vec<DailySummary>,
    pub reports: BTreeMap<ForecastDay, Report>,
    /// Export and notification files written
    pub files: Vec<PathBuf>,
}

/// Current local time truncated to whole seconds
#[must_use]
pub fn run_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Run the whole pipeline against the configured branch file and database
pub async fn run_once(config: &AppConfig, source: &dyn ForecastSource) -> Result<RunOutcome> {
    let branches = load_branches(&config.paths.branches_file, &config.districts)?;
    let mut store = ForecastStore::open(&config.paths.database).with_context(|| {
        format!(
            "Failed to open database {}",
            config.paths.database.display()
        )
    })?;
    run_with(config, &branches, source, &mut store, run_timestamp()).await
}

/// Run the pipeline for already loaded branches
pub async fn run_with(
    config: &AppConfig,
    branches: &[Branch],
    source: &dyn ForecastSource,
    store: &mut ForecastStore,
    scraped_at: NaiveDateTime,
) -> Result<RunOutcome> {
    info!("Running weather job at {}", scraped_at);

    let supported: HashMap<&str, &District> = config
        .districts
        .iter()
        .map(|district| (district.name.as_str(), district))
        .collect();

    let (active, skipped): (Vec<&Branch>, Vec<&Branch>) = branches.iter().partition(|branch| {
        branch
            .district
            .as_deref()
            .is_some_and(|name| supported.contains_key(name))
    });
    for branch in &skipped {
        info!(
            "Skipping branch {} - district not supported: {}",
            branch.name,
            branch.district.as_deref().unwrap_or("unknown")
        );
    }

    // Each district is fetched once per day no matter how many branches share it
    let mut districts: Vec<&District> = Vec::new();
    for branch in &active {
        if let Some(district) = branch.district.as_deref().and_then(|n| supported.get(n).copied()) {
            if !districts.iter().any(|d| d.name == district.name) {
                districts.push(district);
            }
        }
    }

    let (pages, failed_fetches) = fetch_all(source, &districts, config.fetch.concurrency).await;

    let mut records = Vec::new();
    for branch in &active {
        let district = branch.district.as_deref().unwrap_or_default();
        for day in ForecastDay::ALL {
            let Some(observations) = pages.get(&(district.to_string(), day)) else {
                continue;
            };
            records.extend(
                observations
                    .iter()
                    .cloned()
                    .map(|obs| HourlyForecast::new(branch, district, day, obs)),
            );
        }
    }

    let mut outcome = RunOutcome {
        scraped_at,
        branches_processed: active.len(),
        branches_skipped: skipped.len(),
        failed_fetches,
        records: Vec::new(),
        summaries: Vec::new(),
        reports: BTreeMap::new(),
        files: Vec::new(),
    };

    if records.is_empty() {
        info!("No data collected, skipping database, CSV export and notifications");
        return Ok(outcome);
    }

    let vocabulary = &config.vocabulary;
    let summaries = summarize_branches(&records, vocabulary);
    for summary in &summaries {
        debug!("{}", summary.summary_text);
    }

    store
        .append_run(scraped_at, &records, &summaries, &vocabulary.day_labels)
        .context("Failed to store forecast rows")?;

    let strategy = strategy_for(config.report.grouping, vocabulary);
    let reports = build_reports(&records, strategy.as_ref(), vocabulary);

    let exporter = Exporter::new(&config.paths.output_dir, scraped_at);
    outcome
        .files
        .push(exporter.write_hourly(&records, &vocabulary.day_labels)?);
    outcome
        .files
        .push(exporter.write_summaries(&summaries, &vocabulary.day_labels)?);
    for report in reports.values() {
        outcome.files.push(exporter.write_notification(report)?);
    }

    info!(
        "Job finished: {} hourly rows, {} summaries, {} failed fetches",
        records.len(),
        summaries.len(),
        failed_fetches
    );

    outcome.records = records;
    outcome.summaries = summaries;
    outcome.reports = reports;
    Ok(outcome)
}

type Pages = HashMap<(String, ForecastDay), Vec<HourlyObservation>>;

/// Fetch every `(district, day)` page with bounded concurrency; failures are logged and counted
async fn fetch_all(
    source: &dyn ForecastSource,
    districts: &[&District],
    concurrency: usize,
) -> (Pages, usize) {
    let jobs: Vec<(&District, ForecastDay)> = districts
        .iter()
        .flat_map(|district| ForecastDay::ALL.into_iter().map(move |day| (*district, day)))
        .collect();
    info!(
        "Fetching {} pages for {} districts",
        jobs.len(),
        districts.len()
    );

    let results: Vec<_> = stream::iter(jobs)
        .map(|(district, day)| async move { (district, day, source.fetch_day(district, day).await) })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut pages = Pages::new();
    let mut failed = 0;
    for (district, day, result) in results {
        match result {
            Ok(observations) => {
                debug!(
                    "Fetched {} entries for {} ({})",
                    observations.len(),
                    district.name,
                    day
                );
                pages.insert((district.name.clone(), day), observations);
            }
            Err(e) => {
                failed += 1;
                warn!(
                    "Could not fetch {} for day {}: {}",
                    district.name,
                    day.index(),
                    e
                );
            }
        }
    }
    (pages, failed)
}
