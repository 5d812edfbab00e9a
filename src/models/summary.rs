//! Per-branch daily rain summary

use super::ForecastDay;
use serde::{Deserialize, Serialize};

/// One summary sentence per `(branch, forecast day)`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailySummary {
    pub branch: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub district: String,
    pub day: ForecastDay,
    pub summary_text: String,
}
