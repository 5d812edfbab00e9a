//! Branch model: a business location and its forecast district

use serde::{Deserialize, Serialize};

/// A business branch loaded from the branch directory
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Branch {
    /// Branch display name
    pub name: String,
    /// Free-text street address
    pub address: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Supported district extracted from the address, if any
    pub district: Option<String>,
}

impl Branch {
    /// Create a new branch without a resolved district
    #[must_use]
    pub fn new(name: String, address: String, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            address,
            latitude,
            longitude,
            district: None,
        }
    }

    /// Attach the resolved district
    #[must_use]
    pub fn with_district(mut self, district: Option<String>) -> Self {
        self.district = district;
        self
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A supported forecast district and the page it is scraped from
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct District {
    /// District name as it appears in addresses (e.g. "Quận 1", "TP Thủ Đức")
    pub name: String,
    /// Hourly forecast page URL; `{day}` is replaced by the day index 1..=3
    pub url_template: String,
}

impl District {
    #[must_use]
    pub fn new(name: &str, url_template: &str) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
        }
    }

    /// Forecast page URL for a day index
    #[must_use]
    pub fn url_for_day(&self, day_index: u8) -> String {
        self.url_template.replace("{day}", &day_index.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_url_for_day() {
        let district = District::new(
            "Quận 1",
            "https://www.accuweather.com/vi/vn/district-1/3554433/hourly-weather-forecast/3554433?day={day}",
        );
        assert!(district.url_for_day(2).ends_with("?day=2"));
    }

    #[test]
    fn test_branch_with_district() {
        let branch = Branch::new("ICOOL A".into(), "12 Lê Lợi, Quận 1".into(), 10.77, 106.70)
            .with_district(Some("Quận 1".into()));
        assert_eq!(branch.district.as_deref(), Some("Quận 1"));
        assert_eq!(branch.format_coordinates(), "10.7700, 106.7000");
    }
}
