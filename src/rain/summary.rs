//! Per-branch daily summary sentences

use super::RainDetector;
use crate::config::Vocabulary;
use crate::models::{DailySummary, ForecastDay, HourlyForecast};
use std::collections::BTreeMap;

/// One summary per `(branch, day)` that has records, ordered by day then branch.
///
/// Rainy hours are listed with their published labels in record order.
#[must_use]
pub fn summarize_branches(records: &[HourlyForecast], vocabulary: &Vocabulary) -> Vec<DailySummary> {
    let detector = RainDetector::new(&vocabulary.rain_keywords);

    let mut by_branch: BTreeMap<(ForecastDay, &str), Vec<&HourlyForecast>> = BTreeMap::new();
    for record in records {
        by_branch
            .entry((record.day, record.branch.as_str()))
            .or_default()
            .push(record);
    }

    by_branch
        .into_iter()
        .filter_map(|((day, _), rows)| {
            let first = *rows.first()?;
            let rainy_hours: Vec<&str> = rows
                .iter()
                .filter(|row| detector.is_rainy(&row.content))
                .map(|row| row.hour.as_str())
                .collect();

            let template = if rainy_hours.is_empty() {
                &vocabulary.summary_dry_template
            } else {
                &vocabulary.summary_rain_template
            };
            let summary_text = template
                .replace("{branch}", &first.branch)
                .replace("{district}", &first.district)
                .replace("{day}", vocabulary.day_labels.label(day))
                .replace("{hours}", &rainy_hours.join(", "));

            Some(DailySummary {
                branch: first.branch.clone(),
                address: first.address.clone(),
                latitude: first.latitude,
                longitude: first.longitude,
                district: first.district.clone(),
                day,
                summary_text,
            })
        })
        .collect()
}
