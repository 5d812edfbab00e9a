//! Forecast day and hourly forecast row models

use super::Branch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three forecast offsets reported independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastDay {
    Today,
    Tomorrow,
    DayAfter,
}

impl ForecastDay {
    /// All forecast days in report order
    pub const ALL: [ForecastDay; 3] = [
        ForecastDay::Today,
        ForecastDay::Tomorrow,
        ForecastDay::DayAfter,
    ];

    /// Day index used by the forecast pages (1 = today)
    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            ForecastDay::Today => 1,
            ForecastDay::Tomorrow => 2,
            ForecastDay::DayAfter => 3,
        }
    }

    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(ForecastDay::Today),
            2 => Some(ForecastDay::Tomorrow),
            3 => Some(ForecastDay::DayAfter),
            _ => None,
        }
    }

    /// Stable ASCII name used in file names and on the command line
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            ForecastDay::Today => "today",
            ForecastDay::Tomorrow => "tomorrow",
            ForecastDay::DayAfter => "day-after",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.slug() == slug)
    }
}

impl fmt::Display for ForecastDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// One hourly entry as returned by a forecast source, before it is tied to a branch
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct HourlyObservation {
    /// Hour label as published (e.g. "14h" or "14")
    pub hour: String,
    pub temperature: String,
    /// Free-text forecast phrase
    pub content: String,
    pub wind: String,
    pub humidity: String,
    pub uv_index: String,
}

/// A forecast row for one branch, one day and one hour
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyForecast {
    pub branch: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub district: String,
    pub day: ForecastDay,
    pub hour: String,
    pub temperature: String,
    pub content: String,
    pub wind: String,
    pub humidity: String,
    pub uv_index: String,
}

impl HourlyForecast {
    /// Tie an observation to the branch it was fetched for
    #[must_use]
    pub fn new(branch: &Branch, district: &str, day: ForecastDay, obs: HourlyObservation) -> Self {
        Self {
            branch: branch.name.clone(),
            address: branch.address.clone(),
            latitude: branch.latitude,
            longitude: branch.longitude,
            district: district.to_string(),
            day,
            hour: obs.hour,
            temperature: obs.temperature,
            content: obs.content,
            wind: obs.wind,
            humidity: obs.humidity,
            uv_index: obs.uv_index,
        }
    }

    /// Hour of day parsed from the hour label, `None` when it is not in 0..=23
    #[must_use]
    pub fn hour_of_day(&self) -> Option<u8> {
        parse_hour_label(&self.hour)
    }
}

/// Parse the leading digits of an hour label ("07h", "7", "23 giờ")
#[must_use]
pub fn parse_hour_label(label: &str) -> Option<u8> {
    let digits: String = label
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u8>().ok().filter(|hour| *hour < 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_day_index_round_trip() {
        for day in ForecastDay::ALL {
            assert_eq!(ForecastDay::from_index(day.index()), Some(day));
            assert_eq!(ForecastDay::from_slug(day.slug()), Some(day));
        }
        assert_eq!(ForecastDay::from_index(0), None);
        assert_eq!(ForecastDay::from_index(4), None);
    }

    #[test]
    fn test_forecast_days_sort_in_report_order() {
        let mut days = vec![ForecastDay::DayAfter, ForecastDay::Today, ForecastDay::Tomorrow];
        days.sort();
        assert_eq!(days, ForecastDay::ALL.to_vec());
    }

    #[test]
    fn test_parse_hour_label() {
        assert_eq!(parse_hour_label("07h"), Some(7));
        assert_eq!(parse_hour_label("23"), Some(23));
        assert_eq!(parse_hour_label(" 0h "), Some(0));
        assert_eq!(parse_hour_label("24h"), None);
        assert_eq!(parse_hour_label("h"), None);
        assert_eq!(parse_hour_label(""), None);
    }
}
