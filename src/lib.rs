//! `RainAlert` - Hourly rain forecasts turned into branch notifications
//!
//! This library collects hourly forecasts for the districts a branch network
//! operates in, stores them, and renders the daily rain notification that
//! tells branches when to prepare for rain.

pub mod branches;
pub mod config;
pub mod csv_io;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod job;
pub mod logging;
pub mod models;
pub mod rain;
pub mod storage;

// Re-export core types for public API
pub use branches::{extract_district, load_branches};
pub use config::{AppConfig, GroupingMode, Vocabulary};
pub use error::RainAlertError;
pub use fetcher::{AccuWeatherClient, ForecastSource};
pub use job::{RunOutcome, run_once};
pub use models::{Branch, DailySummary, District, ForecastDay, HourlyForecast, HourlyObservation};
pub use rain::{Report, ReportRenderer, Signature, build_reports, compress, group};
pub use storage::ForecastStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RainAlertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
