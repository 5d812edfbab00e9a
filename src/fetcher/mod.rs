//! Forecast retrieval
//!
//! The run pipeline talks to a [`ForecastSource`]; the production source scrapes
//! the AccuWeather hourly pages, tests plug in canned observations.

pub mod accuweather;

pub use accuweather::{AccuWeatherClient, parse_hourly_page};

use crate::RainAlertError;
use crate::models::{District, ForecastDay, HourlyObservation};
use async_trait::async_trait;

/// Source of hourly observations for one district and day
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Fetch every hourly entry published for `district` on `day`.
    ///
    /// One attempt per call; callers decide what a failure means for the run.
    async fn fetch_day(
        &self,
        district: &District,
        day: ForecastDay,
    ) -> Result<Vec<HourlyObservation>, RainAlertError>;
}
