//! Rain signatures and the strategies that derive them
//!
//! A signature describes when a district is forecast to have rain on one day.
//! The default strategy keys every rainy hour under one rain label; the phrase
//! strategy keys rainy hours by the verbatim forecast phrase, so districts only
//! share a signature when both the hours and the wording match.

use super::RainDetector;
use super::hours::compress;
use crate::config::{GroupingMode, Vocabulary};
use crate::models::HourlyForecast;
use std::collections::{BTreeMap, BTreeSet};

/// Rainy hours of one district and day, keyed by rain description
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    parts: BTreeMap<String, BTreeSet<u8>>,
}

impl Signature {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rainy hour under a description
    pub fn insert(&mut self, description: impl Into<String>, hour: u8) {
        self.parts.entry(description.into()).or_default().insert(hour);
    }

    /// True when the district has no rainy hour
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// All rainy hours regardless of description
    #[must_use]
    pub fn hours(&self) -> BTreeSet<u8> {
        self.parts.values().flatten().copied().collect()
    }

    /// `"{description} {ranges}"` per description, joined by `"; "`
    #[must_use]
    pub fn render(&self) -> String {
        self.parts
            .iter()
            .map(|(description, hours)| {
                format!("{description} {}", compress(hours.iter().copied()).join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Maps one hourly record to the rain description it contributes, if any
pub trait SignatureStrategy: Send + Sync {
    fn classify(&self, record: &HourlyForecast) -> Option<String>;
}

/// Every rainy hour counts under the same rain label
#[derive(Debug, Clone)]
pub struct RainHours {
    detector: RainDetector,
    rain_label: String,
}

impl RainHours {
    #[must_use]
    pub fn new(detector: RainDetector, rain_label: impl Into<String>) -> Self {
        Self {
            detector,
            rain_label: rain_label.into(),
        }
    }
}

impl SignatureStrategy for RainHours {
    fn classify(&self, record: &HourlyForecast) -> Option<String> {
        self.detector
            .is_rainy(&record.content)
            .then(|| self.rain_label.clone())
    }
}

/// Rainy hours are keyed by their trimmed forecast phrase
#[derive(Debug, Clone)]
pub struct VerbatimPhrase {
    detector: RainDetector,
}

impl VerbatimPhrase {
    #[must_use]
    pub fn new(detector: RainDetector) -> Self {
        Self { detector }
    }
}

impl SignatureStrategy for VerbatimPhrase {
    fn classify(&self, record: &HourlyForecast) -> Option<String> {
        self.detector
            .is_rainy(&record.content)
            .then(|| record.content.trim().to_string())
    }
}

/// Strategy for a configured grouping mode
#[must_use]
pub fn strategy_for(mode: GroupingMode, vocabulary: &Vocabulary) -> Box<dyn SignatureStrategy> {
    let detector = RainDetector::new(&vocabulary.rain_keywords);
    match mode {
        GroupingMode::RainHours => Box::new(RainHours::new(detector, &vocabulary.rain_label)),
        GroupingMode::Phrase => Box::new(VerbatimPhrase::new(detector)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Branch, ForecastDay, HourlyObservation};

    fn record(hour: &str, content: &str) -> HourlyForecast {
        let branch = Branch::new("ICOOL A".into(), "1 Lê Lợi, Quận 1".into(), 10.7, 106.7);
        HourlyForecast::new(
            &branch,
            "Quận 1",
            ForecastDay::Today,
            HourlyObservation {
                hour: hour.into(),
                content: content.into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_signature_render_single_description() {
        let mut signature = Signature::new();
        for hour in [15, 14, 18] {
            signature.insert("Mưa dông", hour);
        }
        assert_eq!(signature.render(), "Mưa dông 14h-16h, 18h-19h");
        assert_eq!(signature.hours().len(), 3);
    }

    #[test]
    fn test_signature_render_multiple_descriptions() {
        let mut signature = Signature::new();
        signature.insert("Mưa rào", 9);
        signature.insert("Dông", 14);
        signature.insert("Dông", 15);
        assert_eq!(signature.render(), "Dông 14h-16h; Mưa rào 09h-10h");
    }

    #[test]
    fn test_signature_equality_ignores_insert_order() {
        let mut a = Signature::new();
        a.insert("Mưa dông", 14);
        a.insert("Mưa dông", 15);
        let mut b = Signature::new();
        b.insert("Mưa dông", 15);
        b.insert("Mưa dông", 14);
        assert_eq!(a, b);
        assert!(Signature::new().is_empty());
    }

    #[test]
    fn test_rain_hours_strategy() {
        let strategy = strategy_for(GroupingMode::RainHours, &Vocabulary::default());
        assert_eq!(
            strategy.classify(&record("14h", "Có mưa rào")),
            Some("Mưa dông".to_string())
        );
        assert_eq!(strategy.classify(&record("14h", "Nhiều mây")), None);
    }

    #[test]
    fn test_verbatim_phrase_strategy() {
        let strategy = strategy_for(GroupingMode::Phrase, &Vocabulary::default());
        assert_eq!(
            strategy.classify(&record("14h", "  Có mưa rào ")),
            Some("Có mưa rào".to_string())
        );
        assert_eq!(strategy.classify(&record("14h", "Nắng")), None);
    }
}
