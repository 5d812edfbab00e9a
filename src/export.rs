//! Timestamped run exports
//!
//! Every run writes an hourly CSV, a summary CSV and one notification text file
//! per forecast day into the output folder. All files of a run share the same
//! timestamp suffix.

use crate::RainAlertError;
use crate::config::DayLabels;
use crate::csv_io::CsvWriter;
use crate::models::{DailySummary, HourlyForecast};
use crate::rain::Report;
use crate::storage::SCRAPED_AT_FORMAT;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use tracing::info;

/// Timestamp layout used in export file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const HOURLY_COLUMNS: [&str; 13] = [
    "scraped_at",
    "branch",
    "address",
    "latitude",
    "longitude",
    "district",
    "forecast_day",
    "hour",
    "temperature",
    "content",
    "wind",
    "humidity",
    "uv_index",
];

const SUMMARY_COLUMNS: [&str; 8] = [
    "scraped_at",
    "branch",
    "address",
    "latitude",
    "longitude",
    "district",
    "forecast_day",
    "summary_text",
];

/// Writes the files of one run
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    scraped_at: NaiveDateTime,
}

impl Exporter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, scraped_at: NaiveDateTime) -> Self {
        Self {
            output_dir: output_dir.into(),
            scraped_at,
        }
    }

    fn file_stamp(&self) -> String {
        self.scraped_at.format(FILE_TIMESTAMP_FORMAT).to_string()
    }

    fn row_stamp(&self) -> String {
        self.scraped_at.format(SCRAPED_AT_FORMAT).to_string()
    }

    fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf, RainAlertError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            RainAlertError::export(format!(
                "Cannot create output folder {}: {e}",
                self.output_dir.display()
            ))
        })?;
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, contents)
            .map_err(|e| RainAlertError::export(format!("Cannot write {}: {e}", path.display())))?;
        info!("Saved {}", path.display());
        Ok(path)
    }

    /// `hourly_weather_{ts}.csv`, rows in collection order
    pub fn write_hourly(
        &self,
        records: &[HourlyForecast],
        labels: &DayLabels,
    ) -> Result<PathBuf, RainAlertError> {
        let stamp = self.row_stamp();
        let mut csv = CsvWriter::with_bom();
        csv.write_row(HOURLY_COLUMNS);
        for r in records {
            csv.write_row([
                stamp.as_str(),
                &r.branch,
                &r.address,
                &r.latitude.to_string(),
                &r.longitude.to_string(),
                &r.district,
                labels.label(r.day),
                &r.hour,
                &r.temperature,
                &r.content,
                &r.wind,
                &r.humidity,
                &r.uv_index,
            ]);
        }
        self.write(
            &format!("hourly_weather_{}.csv", self.file_stamp()),
            &csv.finish(),
        )
    }

    /// `rain_summaries_{ts}.csv`, sorted by forecast day then branch name
    pub fn write_summaries(
        &self,
        summaries: &[DailySummary],
        labels: &DayLabels,
    ) -> Result<PathBuf, RainAlertError> {
        let mut sorted: Vec<&DailySummary> = summaries.iter().collect();
        sorted.sort_by(|a, b| (a.day, &a.branch).cmp(&(b.day, &b.branch)));

        let stamp = self.row_stamp();
        let mut csv = CsvWriter::with_bom();
        csv.write_row(SUMMARY_COLUMNS);
        for s in sorted {
            csv.write_row([
                stamp.as_str(),
                &s.branch,
                &s.address,
                &s.latitude.to_string(),
                &s.longitude.to_string(),
                &s.district,
                labels.label(s.day),
                &s.summary_text,
            ]);
        }
        self.write(
            &format!("rain_summaries_{}.csv", self.file_stamp()),
            &csv.finish(),
        )
    }

    /// `report_notification_{day}_{ts}.txt`, lines joined by `\n`
    pub fn write_notification(&self, report: &Report) -> Result<PathBuf, RainAlertError> {
        self.write(
            &format!(
                "report_notification_{}_{}.txt",
                report.day.slug(),
                self.file_stamp()
            ),
            &report.text(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_io;
    use crate::models::{Branch, ForecastDay, HourlyObservation};
    use chrono::NaiveDate;

    fn scraped_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 14)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    fn summary(branch: &str, day: ForecastDay) -> DailySummary {
        DailySummary {
            branch: branch.into(),
            address: "1 Lê Lợi, Quận 1".into(),
            latitude: 10.77,
            longitude: 106.7,
            district: "Quận 1".into(),
            day,
            summary_text: format!("Dự báo cho {branch}"),
        }
    }

    #[test]
    fn test_hourly_csv() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), scraped_at());
        let branch = Branch::new("ICOOL A".into(), "1 Lê Lợi, Quận 1".into(), 10.77, 106.7);
        let records = vec![HourlyForecast::new(
            &branch,
            "Quận 1",
            ForecastDay::Today,
            HourlyObservation {
                hour: "14".into(),
                temperature: "32°".into(),
                content: "Có mưa dông".into(),
                wind: "TTN 13 km/h".into(),
                humidity: "74%".into(),
                uv_index: "3".into(),
            },
        )];

        let path = exporter.write_hourly(&records, &DayLabels::default()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "hourly_weather_2025-07-14_09-05-07.csv"
        );

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(csv_io::BOM));
        let rows = csv_io::parse(&text).unwrap();
        assert_eq!(rows[0], HOURLY_COLUMNS);
        assert_eq!(
            rows[1],
            [
                "2025-07-14 09:05:07",
                "ICOOL A",
                "1 Lê Lợi, Quận 1",
                "10.77",
                "106.7",
                "Quận 1",
                "hôm nay",
                "14",
                "32°",
                "Có mưa dông",
                "TTN 13 km/h",
                "74%",
                "3"
            ]
        );
    }

    #[test]
    fn test_summary_csv_sorted_by_day_then_branch() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), scraped_at());
        let summaries = vec![
            summary("ICOOL B", ForecastDay::DayAfter),
            summary("ICOOL B", ForecastDay::Today),
            summary("ICOOL A", ForecastDay::Tomorrow),
            summary("ICOOL A", ForecastDay::Today),
        ];

        let path = exporter
            .write_summaries(&summaries, &DayLabels::default())
            .unwrap();
        let rows = csv_io::parse(&std::fs::read_to_string(path).unwrap()).unwrap();
        let order: Vec<(&str, &str)> = rows[1..]
            .iter()
            .map(|row| (row[6].as_str(), row[1].as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("hôm nay", "ICOOL A"),
                ("hôm nay", "ICOOL B"),
                ("ngày mai", "ICOOL A"),
                ("2 ngày tới", "ICOOL B"),
            ]
        );
    }

    #[test]
    fn test_notification_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("reports"), scraped_at());
        let report = Report {
            day: ForecastDay::Tomorrow,
            lines: vec!["Thông báo".into(), "Toàn hệ thống: Trời không mưa.".into()],
        };

        let path = exporter.write_notification(&report).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "report_notification_tomorrow_2025-07-14_09-05-07.txt"
        );
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "Thông báo\nToàn hệ thống: Trời không mưa."
        );
    }
}
