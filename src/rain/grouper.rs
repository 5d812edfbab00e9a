//! Grouping of districts by rain signature

use super::{Signature, SignatureStrategy};
use crate::models::{ForecastDay, HourlyForecast};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// District names bucketed by their signature for one day
pub type SignatureGroups = BTreeMap<Signature, BTreeSet<String>>;

/// Partition the districts that have records on `day` by their signature.
///
/// Every district with at least one record lands in exactly one group; a district
/// without rain lands in the group of the empty signature. Districts with no
/// record on `day` are absent. The result does not depend on record order.
#[must_use]
pub fn group(
    records: &[HourlyForecast],
    day: ForecastDay,
    strategy: &dyn SignatureStrategy,
) -> SignatureGroups {
    let mut signatures: BTreeMap<&str, Signature> = BTreeMap::new();

    for record in records.iter().filter(|record| record.day == day) {
        let signature = signatures.entry(record.district.as_str()).or_default();
        let Some(description) = strategy.classify(record) else {
            continue;
        };
        match record.hour_of_day() {
            Some(hour) => signature.insert(description, hour),
            None => debug!(
                district = %record.district,
                hour = %record.hour,
                "Ignoring rainy record with unreadable hour"
            ),
        }
    }

    let mut groups = SignatureGroups::new();
    for (district, signature) in signatures {
        groups
            .entry(signature)
            .or_default()
            .insert(district.to_string());
    }
    groups
}
