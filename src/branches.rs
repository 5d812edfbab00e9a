//! Branch Directory Module
//!
//! Loads business branches from the branch CSV and resolves the forecast
//! district of each branch from its address.

use crate::RainAlertError;
use crate::csv_io;
use crate::models::{Branch, District};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

const REQUIRED_COLUMNS: [&str; 4] = ["branch", "address", "latitude", "longitude"];

/// Find the supported district named in a free-text address.
///
/// Matching is case-insensitive and the leftmost mention wins. A district whose
/// name ends in a number also matches without the space ("Quận10"), and never
/// matches when more digits follow, so "Quận 1" is not found inside "Quận 10".
#[must_use]
pub fn extract_district(address: &str, districts: &[District]) -> Option<String> {
    let haystack = address.to_lowercase();

    let mut best: Option<(usize, usize, &District)> = None;
    for district in districts {
        for needle in spellings(&district.name) {
            let Some((start, len)) = find_bounded(&haystack, &needle) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((best_start, best_len, _)) => {
                    start < best_start || (start == best_start && len > best_len)
                }
            };
            if better {
                best = Some((start, len, district));
            }
        }
    }

    best.map(|(_, _, district)| district.name.clone())
}

/// Lowercase spellings accepted for a district name
fn spellings(name: &str) -> Vec<String> {
    let lower = name.trim().to_lowercase();
    let mut spellings = vec![lower.clone()];
    if let Some((prefix, number)) = lower.rsplit_once(' ') {
        if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
            spellings.push(format!("{prefix}{number}"));
        }
    }
    spellings
}

/// First occurrence of `needle` not directly followed by a digit when it ends in one
fn find_bounded(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let ends_in_digit = needle.chars().last().is_some_and(|c| c.is_ascii_digit());
    haystack
        .match_indices(needle)
        .find(|(start, _)| {
            !ends_in_digit
                || !haystack[start + needle.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit())
        })
        .map(|(start, matched)| (start, matched.len()))
}

/// Load branches from a CSV file
pub fn load_branches(path: impl AsRef<Path>, districts: &[District]) -> Result<Vec<Branch>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read branch file {}", path.display()))?;
    let branches = parse_branches(&text, districts)
        .with_context(|| format!("Invalid branch file {}", path.display()))?;
    info!(
        "Loaded {} branches from {}",
        branches.len(),
        path.display()
    );
    Ok(branches)
}

/// Parse branch CSV text.
///
/// Requires `branch,address,latitude,longitude` columns in any order. An optional
/// `district` column is used when it names a supported district; otherwise the
/// district is extracted from the address.
pub fn parse_branches(text: &str, districts: &[District]) -> Result<Vec<Branch>, RainAlertError> {
    let mut records = csv_io::parse(text)?.into_iter();
    let header: Vec<String> = records
        .next()
        .ok_or_else(|| RainAlertError::parse("Branch file is empty"))?
        .iter()
        .map(|column| column.trim().to_lowercase())
        .collect();

    let column = |name: &str| header.iter().position(|column| column == name);
    let mut indices = [0usize; 4];
    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = column(name).ok_or_else(|| {
            RainAlertError::parse(format!("Branch file is missing the '{name}' column"))
        })?;
    }
    let [name_idx, address_idx, lat_idx, lon_idx] = indices;
    let district_idx = column("district");

    let mut branches = Vec::new();
    for (offset, record) in records.enumerate() {
        // header is line 1
        let line = offset + 2;
        let field = |idx: usize| record.get(idx).map_or("", |value| value.trim());

        let name = field(name_idx);
        if name.is_empty() {
            return Err(RainAlertError::parse(format!(
                "Line {line}: branch name is empty"
            )));
        }
        let latitude = parse_coordinate(field(lat_idx), "latitude", line)?;
        let longitude = parse_coordinate(field(lon_idx), "longitude", line)?;
        let address = field(address_idx);

        let district = district_idx
            .map(field)
            .and_then(|declared| extract_district(declared, districts))
            .or_else(|| extract_district(address, districts));

        if district.is_none() {
            debug!(branch = name, address, "No supported district in address");
        }

        branches.push(
            Branch::new(name.to_string(), address.to_string(), latitude, longitude)
                .with_district(district),
        );
    }

    Ok(branches)
}

fn parse_coordinate(value: &str, what: &str, line: usize) -> Result<f64, RainAlertError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RainAlertError::parse(format!("Line {line}: invalid {what} '{value}'")))
}
