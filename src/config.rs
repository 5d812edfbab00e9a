//! Configuration management for the `RainAlert` service
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings. The report
//! vocabulary lives here too so every component receives it explicitly.

use crate::RainAlertError;
use crate::models::{District, ForecastDay};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Root configuration structure for the `RainAlert` service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Files and folders used by a run
    pub paths: PathsConfig,
    /// Forecast page retrieval settings
    pub fetch: FetchConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Report generation settings
    pub report: ReportConfig,
    /// Supported districts, in the order they are matched against addresses
    pub districts: Vec<District>,
    /// Fixed output vocabulary
    pub vocabulary: Vocabulary,
}

/// Files and folders used by a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// SQLite database file
    pub database: PathBuf,
    /// Folder receiving CSV exports and notification files
    pub output_dir: PathBuf,
    /// Branch directory CSV
    pub branches_file: PathBuf,
}

/// Forecast page retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of districts fetched at the same time
    pub concurrency: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// Log output destination (console or file)
    pub output: String,
    /// Log file path, used when output is "file"
    pub file_path: PathBuf,
}

/// How locations are grouped into report lines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Group by the set of rainy hours
    #[default]
    RainHours,
    /// Group by the verbatim rainy forecast phrase per hour
    Phrase,
}

impl std::str::FromStr for GroupingMode {
    type Err = RainAlertError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rain_hours" | "rain-hours" => Ok(GroupingMode::RainHours),
            "phrase" => Ok(GroupingMode::Phrase),
            other => Err(RainAlertError::config(format!(
                "Invalid grouping '{other}'. Must be one of: rain_hours, phrase"
            ))),
        }
    }
}

/// Report generation settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    pub grouping: GroupingMode,
}

/// Labels for the three forecast days
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DayLabels {
    pub today: String,
    pub tomorrow: String,
    pub day_after: String,
}

impl DayLabels {
    #[must_use]
    pub fn label(&self, day: ForecastDay) -> &str {
        match day {
            ForecastDay::Today => &self.today,
            ForecastDay::Tomorrow => &self.tomorrow,
            ForecastDay::DayAfter => &self.day_after,
        }
    }

    /// Reverse lookup used when reading stored rows back
    #[must_use]
    pub fn day_for_label(&self, label: &str) -> Option<ForecastDay> {
        ForecastDay::ALL
            .into_iter()
            .find(|day| self.label(*day) == label)
    }
}

impl Default for DayLabels {
    fn default() -> Self {
        Self {
            today: "hôm nay".to_string(),
            tomorrow: "ngày mai".to_string(),
            day_after: "2 ngày tới".to_string(),
        }
    }
}

/// Fixed output vocabulary; changing it changes every produced artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Vocabulary {
    /// Substrings that mark a forecast phrase as rainy (case-insensitive)
    pub rain_keywords: Vec<String>,
    pub day_labels: DayLabels,
    pub header: String,
    /// Label replacing the member list of the largest multi-location group
    pub aggregate_label: String,
    /// Rain wording placed before the hour ranges
    pub rain_label: String,
    /// Line emitted when no location has rain
    pub no_rain_line: String,
    pub footer: String,
    /// Emitted alone when a day has no data; `{day}` is the day label
    pub no_data_template: String,
    /// Prefixes removed from location names before display
    pub display_strip_prefixes: Vec<String>,
    /// `{branch}`, `{district}`, `{day}`, `{hours}` placeholders
    pub summary_rain_template: String,
    /// `{branch}`, `{district}`, `{day}` placeholders
    pub summary_dry_template: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            rain_keywords: ["mưa", "dông", "giông", "mưa rào"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            day_labels: DayLabels::default(),
            header: "Thông báo: 📢 THÔNG BÁO DỰ BÁO THỜI TIẾT".to_string(),
            aggregate_label: "Toàn hệ thống".to_string(),
            rain_label: "Mưa dông".to_string(),
            no_rain_line: "Toàn hệ thống: Trời không mưa.".to_string(),
            footer: "Lưu ý: Mưa trùng các khung giờ đón khách, các chi nhánh cần chuẩn bị vật dụng OMOTENASHI hỗ trợ khách.".to_string(),
            no_data_template: "Không có dữ liệu dự báo cho {day}.".to_string(),
            display_strip_prefixes: vec!["TP ".to_string()],
            summary_rain_template:
                "Dự báo cho {branch} ({district}) {day}: Có khả năng mưa vào các giờ: {hours}."
                    .to_string(),
            summary_dry_template: "Dự báo cho {branch} ({district}) {day}: Trời không mưa."
                .to_string(),
        }
    }
}

// Default value functions
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36".to_string()
}

fn default_fetch_timeout() -> u32 {
    30
}

fn default_fetch_concurrency() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_output() -> String {
    "console".to_string()
}

fn default_log_file_path() -> PathBuf {
    PathBuf::from("rainalert.log")
}

const ACCUWEATHER_VI: &str = "https://www.accuweather.com/vi/vn";

/// Ho Chi Minh City and Vung Tau districts with AccuWeather hourly pages
#[must_use]
pub fn default_districts() -> Vec<District> {
    [
        ("Quận 1", "district-1/3554433"),
        ("Quận 2", "district-2/3554434"),
        ("Quận 3", "district-3/3554435"),
        ("Quận 5", "district-5/3554437"),
        ("Quận 6", "district-6/3554438"),
        ("Quận 8", "district-8/3554440"),
        ("Quận 10", "district-10/3554442"),
        ("Quận 12", "district-12/3554444"),
        ("Bình Thạnh", "binh-thanh/1696411"),
        ("Tân Phú", "tan-phu/3554445"),
        ("Tân Bình", "tan-binh/416036"),
        ("Phú Nhuận", "phu-nhuan/418146"),
        ("TP Thủ Đức", "thu-duc/414495"),
        ("TP Vũng Tàu", "vung-tau/352089"),
    ]
    .iter()
    .map(|(name, path)| {
        let key = path.rsplit('/').next().unwrap_or_default();
        District::new(
            name,
            &format!("{ACCUWEATHER_VI}/{path}/hourly-weather-forecast/{key}?day={{day}}"),
        )
    })
    .collect()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("weather_forecasts.db"),
            output_dir: PathBuf::from("weather_reports"),
            branches_file: PathBuf::from("data/branches/branches_icool.csv"),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_fetch_timeout(),
            concurrency: default_fetch_concurrency(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output: default_log_output(),
            file_path: default_log_file_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides: RAINALERT__FETCH__CONCURRENCY=8
        builder = builder.add_source(
            Environment::with_prefix("RAINALERT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rainalert").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.fetch.user_agent.is_empty() {
            self.fetch.user_agent = default_user_agent();
        }
        if self.fetch.timeout_seconds == 0 {
            self.fetch.timeout_seconds = default_fetch_timeout();
        }
        if self.fetch.concurrency == 0 {
            self.fetch.concurrency = default_fetch_concurrency();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.logging.output.is_empty() {
            self.logging.output = default_log_output();
        }
        if self.districts.is_empty() {
            self.districts = default_districts();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_districts()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.fetch.timeout_seconds > 300 {
            return Err(
                RainAlertError::config("Fetch timeout cannot exceed 300 seconds").into(),
            );
        }

        if !(1..=32).contains(&self.fetch.concurrency) {
            return Err(
                RainAlertError::config("Fetch concurrency must be between 1 and 32").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RainAlertError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RainAlertError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_log_outputs = ["console", "file"];
        if !valid_log_outputs.contains(&self.logging.output.as_str()) {
            return Err(RainAlertError::config(format!(
                "Invalid log output '{}'. Must be one of: {}",
                self.logging.output,
                valid_log_outputs.join(", ")
            ))
            .into());
        }

        if self
            .vocabulary
            .rain_keywords
            .iter()
            .all(|keyword| keyword.trim().is_empty())
        {
            return Err(RainAlertError::config("At least one rain keyword is required").into());
        }

        Ok(())
    }

    /// Validate the supported district table
    fn validate_districts(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for district in &self.districts {
            if district.name.trim().is_empty() {
                return Err(RainAlertError::config("District name cannot be empty").into());
            }
            if !seen.insert(district.name.as_str()) {
                return Err(RainAlertError::config(format!(
                    "Duplicate district '{}'",
                    district.name
                ))
                .into());
            }
            if !district.url_template.contains("{day}") {
                return Err(RainAlertError::config(format!(
                    "URL template for '{}' must contain {{day}}",
                    district.name
                ))
                .into());
            }
            if !district.url_template.starts_with("http://")
                && !district.url_template.starts_with("https://")
            {
                return Err(RainAlertError::config(format!(
                    "URL template for '{}' must be an HTTP or HTTPS URL",
                    district.name
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Configuration with every default applied, as used when no file exists
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut config = Self::default();
        config.apply_defaults();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::with_defaults();
        assert_eq!(config.fetch.timeout_seconds, 30);
        assert_eq!(config.fetch.concurrency, 4);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.report.grouping, GroupingMode::RainHours);
        assert_eq!(config.districts.len(), 14);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_district_urls() {
        let districts = default_districts();
        let q1 = districts.iter().find(|d| d.name == "Quận 1").unwrap();
        assert_eq!(
            q1.url_for_day(1),
            "https://www.accuweather.com/vi/vn/district-1/3554433/hourly-weather-forecast/3554433?day=1"
        );
        let vt = districts.iter().find(|d| d.name == "TP Vũng Tàu").unwrap();
        assert!(vt.url_for_day(3).contains("vung-tau/352089/hourly-weather-forecast/352089?day=3"));
    }

    #[test]
    fn test_day_labels_lookup() {
        let labels = DayLabels::default();
        assert_eq!(labels.label(ForecastDay::Tomorrow), "ngày mai");
        assert_eq!(labels.day_for_label("2 ngày tới"), Some(ForecastDay::DayAfter));
        assert_eq!(labels.day_for_label("unknown"), None);
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AppConfig::with_defaults();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AppConfig::with_defaults();
        config.fetch.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = AppConfig::with_defaults();
        config.fetch.concurrency = 64;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_template_without_day() {
        let mut config = AppConfig::with_defaults();
        config.districts.push(District::new("Quận 7", "https://example.com/q7"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{day}"));
    }

    #[test]
    fn test_config_validation_rejects_duplicate_district() {
        let mut config = AppConfig::with_defaults();
        let first = config.districts[0].clone();
        config.districts.push(first);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate district"));
    }

    #[test]
    fn test_config_validation_rejects_empty_keywords() {
        let mut config = AppConfig::with_defaults();
        config.vocabulary.rain_keywords = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_grouping_mode_from_str() {
        assert_eq!("phrase".parse::<GroupingMode>().unwrap(), GroupingMode::Phrase);
        assert_eq!(
            "rain-hours".parse::<GroupingMode>().unwrap(),
            GroupingMode::RainHours
        );
        assert!("daily".parse::<GroupingMode>().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[fetch]
concurrency = 2

[report]
grouping = "phrase"

[[districts]]
name = "Quận 1"
url_template = "https://example.com/q1?day={{day}}"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.fetch.concurrency, 2);
        assert_eq!(config.fetch.timeout_seconds, 30);
        assert_eq!(config.report.grouping, GroupingMode::Phrase);
        assert_eq!(config.districts.len(), 1);
        assert_eq!(config.districts[0].name, "Quận 1");
        assert_eq!(config.vocabulary, Vocabulary::default());
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = AppConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("rainalert"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
