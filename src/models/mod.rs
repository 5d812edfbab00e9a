//! Data models for the `RainAlert` service
//!
//! This module contains the domain models organized by concern:
//! - Branch: business locations and the districts they map to
//! - Forecast: forecast days and hourly forecast rows
//! - Summary: per-branch daily rain summaries

pub mod branch;
pub mod forecast;
pub mod summary;

// Re-export all public types for convenient access
pub use branch::{Branch, District};
pub use forecast::{ForecastDay, HourlyForecast, HourlyObservation};
pub use summary::DailySummary;
