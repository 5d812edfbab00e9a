//! SQLite persistence for collected forecasts and summaries
//!
//! Two append-only tables keep every run; rows of one run share the same
//! `scraped_at` value. The forecast day is stored as its display label.

use crate::RainAlertError;
use crate::config::DayLabels;
use crate::models::{DailySummary, ForecastDay, HourlyForecast};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::{info, warn};

/// Timestamp layout of the `scraped_at` column
pub const SCRAPED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepts stored stamps with or without fractional seconds
const STORED_STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS weather_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scraped_at TIMESTAMP,
    branch TEXT, address TEXT, latitude REAL, longitude REAL, district TEXT,
    forecast_day TEXT, hour TEXT, temperature TEXT, content TEXT,
    wind TEXT, humidity TEXT, uv_index TEXT
);
CREATE TABLE IF NOT EXISTS daily_summaries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scraped_at TIMESTAMP,
    branch TEXT, address TEXT, latitude REAL, longitude REAL, district TEXT,
    forecast_day TEXT, summary_text TEXT
);
CREATE INDEX IF NOT EXISTS idx_weather_data_scraped_at ON weather_data(scraped_at);
";

/// All rows written by one run
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    pub scraped_at: NaiveDateTime,
    pub records: Vec<HourlyForecast>,
    pub summaries: Vec<DailySummary>,
}

/// Append-only store over a SQLite database
pub struct ForecastStore {
    conn: Connection,
}

impl ForecastStore {
    /// Open or create the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RainAlertError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.initialize()?;
        info!("Opened forecast database {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> Result<Self, RainAlertError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), RainAlertError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Append a run's hourly rows and summaries in a single transaction
    pub fn append_run(
        &mut self,
        scraped_at: NaiveDateTime,
        records: &[HourlyForecast],
        summaries: &[DailySummary],
        labels: &DayLabels,
    ) -> Result<(), RainAlertError> {
        let scraped_at = scraped_at.format(SCRAPED_AT_FORMAT).to_string();
        let tx = self.conn.transaction()?;
        {
            let mut insert_hour = tx.prepare(
                "INSERT INTO weather_data (scraped_at, branch, address, latitude, longitude, district,
                    forecast_day, hour, temperature, content, wind, humidity, uv_index)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )?;
            for r in records {
                insert_hour.execute(params![
                    scraped_at,
                    r.branch,
                    r.address,
                    r.latitude,
                    r.longitude,
                    r.district,
                    labels.label(r.day),
                    r.hour,
                    r.temperature,
                    r.content,
                    r.wind,
                    r.humidity,
                    r.uv_index,
                ])?;
            }

            let mut insert_summary = tx.prepare(
                "INSERT INTO daily_summaries (scraped_at, branch, address, latitude, longitude,
                    district, forecast_day, summary_text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for s in summaries {
                insert_summary.execute(params![
                    scraped_at,
                    s.branch,
                    s.address,
                    s.latitude,
                    s.longitude,
                    s.district,
                    labels.label(s.day),
                    s.summary_text,
                ])?;
            }
        }
        tx.commit()?;

        info!(
            "Stored {} hourly rows and {} summaries for run {}",
            records.len(),
            summaries.len(),
            scraped_at
        );
        Ok(())
    }

    /// Rows of the most recent run, `None` when nothing has been stored
    pub fn latest_run(&self, labels: &DayLabels) -> Result<Option<StoredRun>, RainAlertError> {
        let latest: Option<String> = self
            .conn
            .query_row("SELECT MAX(scraped_at) FROM weather_data", [], |row| row.get(0))
            .optional()?
            .flatten();
        let Some(stamp) = latest else {
            return Ok(None);
        };
        let scraped_at = NaiveDateTime::parse_from_str(&stamp, STORED_STAMP_FORMAT).map_err(|e| {
            RainAlertError::parse(format!("Stored timestamp '{stamp}' is invalid: {e}"))
        })?;

        let mut stmt = self.conn.prepare(
            "SELECT branch, address, latitude, longitude, district, forecast_day, hour,
                    temperature, content, wind, humidity, uv_index
             FROM weather_data WHERE scraped_at = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([&stamp], |row| {
            Ok((
                row.get::<_, String>(5)?,
                HourlyRow {
                    branch: row.get(0)?,
                    address: row.get(1)?,
                    latitude: row.get(2)?,
                    longitude: row.get(3)?,
                    district: row.get(4)?,
                    hour: row.get(6)?,
                    temperature: row.get(7)?,
                    content: row.get(8)?,
                    wind: row.get(9)?,
                    humidity: row.get(10)?,
                    uv_index: row.get(11)?,
                },
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (label, row) = row?;
            match labels.day_for_label(&label) {
                Some(day) => records.push(row.into_forecast(day)),
                None => warn!("Skipping stored row with unknown forecast day '{}'", label),
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT branch, address, latitude, longitude, district, forecast_day, summary_text
             FROM daily_summaries WHERE scraped_at = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([&stamp], |row| {
            Ok((
                row.get::<_, String>(5)?,
                (
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(6)?,
                ),
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (label, (branch, address, latitude, longitude, district, summary_text)) = row?;
            if let Some(day) = labels.day_for_label(&label) {
                summaries.push(DailySummary {
                    branch,
                    address,
                    latitude,
                    longitude,
                    district,
                    day,
                    summary_text,
                });
            }
        }

        Ok(Some(StoredRun {
            scraped_at,
            records,
            summaries,
        }))
    }
}

/// Stored hourly row before its day label is resolved
struct HourlyRow {
    branch: String,
    address: String,
    latitude: f64,
    longitude: f64,
    district: String,
    hour: String,
    temperature: String,
    content: String,
    wind: String,
    humidity: String,
    uv_index: String,
}

impl HourlyRow {
    fn into_forecast(self, day: ForecastDay) -> HourlyForecast {
        HourlyForecast {
            branch: self.branch,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            district: self.district,
            day,
            hour: self.hour,
            temperature: self.temperature,
            content: self.content,
            wind: self.wind,
            humidity: self.humidity,
            uv_index: self.uv_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Branch, HourlyObservation};
    use chrono::NaiveDate;

    fn stamp(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 14)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn record(day: ForecastDay, hour: &str, content: &str) -> HourlyForecast {
        let branch = Branch::new("ICOOL A".into(), "1 Lê Lợi, Quận 1".into(), 10.77, 106.7);
        HourlyForecast::new(
            &branch,
            "Quận 1",
            day,
            HourlyObservation {
                hour: hour.into(),
                temperature: "31°".into(),
                content: content.into(),
                ..Default::default()
            },
        )
    }

    fn summary(day: ForecastDay, text: &str) -> DailySummary {
        DailySummary {
            branch: "ICOOL A".into(),
            address: "1 Lê Lợi, Quận 1".into(),
            latitude: 10.77,
            longitude: 106.7,
            district: "Quận 1".into(),
            day,
            summary_text: text.into(),
        }
    }

    #[test]
    fn test_empty_store_has_no_run() {
        let store = ForecastStore::open_in_memory().unwrap();
        assert!(store.latest_run(&DayLabels::default()).unwrap().is_none());
    }

    #[test]
    fn test_latest_run_returns_only_newest_rows() {
        let labels = DayLabels::default();
        let mut store = ForecastStore::open_in_memory().unwrap();

        store
            .append_run(stamp(6), &[record(ForecastDay::Today, "07h", "Nắng")], &[], &labels)
            .unwrap();
        let newer = vec![
            record(ForecastDay::Today, "14h", "Có mưa"),
            record(ForecastDay::DayAfter, "09h", "Nhiều mây"),
        ];
        let summaries = vec![summary(ForecastDay::Today, "Dự báo cho ICOOL A")];
        store.append_run(stamp(12), &newer, &summaries, &labels).unwrap();

        let run = store.latest_run(&labels).unwrap().unwrap();
        assert_eq!(run.scraped_at, stamp(12));
        assert_eq!(run.records, newer);
        assert_eq!(run.summaries, summaries);
    }

    #[test]
    fn test_day_stored_as_label() {
        let labels = DayLabels::default();
        let mut store = ForecastStore::open_in_memory().unwrap();
        store
            .append_run(stamp(6), &[record(ForecastDay::Tomorrow, "07h", "Nắng")], &[], &labels)
            .unwrap();

        let label: String = store
            .conn
            .query_row("SELECT forecast_day FROM weather_data", [], |row| row.get(0))
            .unwrap();
        assert_eq!(label, "ngày mai");
    }

    #[test]
    fn test_replays_run_with_fractional_seconds() {
        let labels = DayLabels::default();
        let mut store = ForecastStore::open_in_memory().unwrap();
        store
            .append_run(stamp(6), &[record(ForecastDay::Today, "07h", "Nắng")], &[], &labels)
            .unwrap();
        store
            .conn
            .execute(
                "INSERT INTO weather_data (scraped_at, branch, address, latitude, longitude,
                    district, forecast_day, hour, temperature, content, wind, humidity, uv_index)
                 VALUES ('2025-07-14 09:05:07.123456', 'ICOOL B', '5 Nguyễn Trãi, Quận 5',
                    10.75, 106.66, 'Quận 5', 'hôm nay', '15h', '30°', 'Mưa rào', '', '', '')",
                [],
            )
            .unwrap();

        let run = store.latest_run(&labels).unwrap().unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 7, 14)
            .unwrap()
            .and_hms_micro_opt(9, 5, 7, 123_456)
            .unwrap();
        assert_eq!(run.scraped_at, expected);
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].branch, "ICOOL B");
        assert_eq!(run.records[0].day, ForecastDay::Today);
        assert_eq!(run.records[0].content, "Mưa rào");
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("weather.db");
        let labels = DayLabels::default();

        {
            let mut store = ForecastStore::open(&path).unwrap();
            store
                .append_run(stamp(8), &[record(ForecastDay::Today, "10h", "Dông")], &[], &labels)
                .unwrap();
        }

        let store = ForecastStore::open(&path).unwrap();
        let run = store.latest_run(&labels).unwrap().unwrap();
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].content, "Dông");
    }
}
