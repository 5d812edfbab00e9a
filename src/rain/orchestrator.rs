//! Per-day report generation

use super::{Report, ReportRenderer, SignatureStrategy, group};
use crate::config::Vocabulary;
use crate::models::{ForecastDay, HourlyForecast};
use std::collections::BTreeMap;
use tracing::debug;

/// Build one report per forecast day; each day is grouped and rendered on its own
#[must_use]
pub fn build_reports(
    records: &[HourlyForecast],
    strategy: &dyn SignatureStrategy,
    vocabulary: &Vocabulary,
) -> BTreeMap<ForecastDay, Report> {
    let renderer = ReportRenderer::new(vocabulary);

    ForecastDay::ALL
        .into_iter()
        .map(|day| {
            let groups = group(records, day, strategy);
            debug!(%day, groups = groups.len(), "Rendering report");
            (day, renderer.render(&groups, day))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupingMode;
    use crate::models::{Branch, HourlyObservation};
    use crate::rain::strategy_for;

    fn record(district: &str, day: ForecastDay, hour: u8, content: &str) -> HourlyForecast {
        let branch = Branch::new(format!("ICOOL {district}"), district.into(), 10.7, 106.7);
        HourlyForecast::new(
            &branch,
            district,
            day,
            HourlyObservation {
                hour: format!("{hour:02}h"),
                content: content.into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_every_day_gets_a_report() {
        let vocabulary = Vocabulary::default();
        let strategy = strategy_for(GroupingMode::RainHours, &vocabulary);
        let records = vec![
            record("Quận 1", ForecastDay::Today, 14, "Có mưa"),
            record("Quận 3", ForecastDay::Today, 14, "Có mưa"),
            record("Quận 1", ForecastDay::Tomorrow, 9, "Nắng"),
        ];

        let reports = build_reports(&records, strategy.as_ref(), &vocabulary);
        assert_eq!(reports.len(), 3);
        assert_eq!(
            reports[&ForecastDay::Today].lines[1],
            "Toàn hệ thống: Mưa dông 14h-15h."
        );
        assert_eq!(
            reports[&ForecastDay::Tomorrow].lines[1],
            "Toàn hệ thống: Trời không mưa."
        );
        assert_eq!(
            reports[&ForecastDay::DayAfter].lines,
            vec!["Không có dữ liệu dự báo cho 2 ngày tới."]
        );
    }
}
