//! Hour-range compression
//!
//! A set of rainy hours is rendered as contiguous hour blocks. The upper bound is
//! exclusive and wraps at midnight, so hour 23 alone renders as `23h-00h`.

use std::collections::BTreeSet;
use std::fmt;

/// One contiguous block of hours, `end_exclusive = (last + 1) mod 24`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    pub start_hour: u8,
    pub end_hour_exclusive: u8,
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}h-{:02}h",
            self.start_hour, self.end_hour_exclusive
        )
    }
}

/// Split hours into ascending contiguous runs
#[must_use]
pub fn ranges<I>(hours: I) -> Vec<HourRange>
where
    I: IntoIterator<Item = u8>,
{
    let sorted: BTreeSet<u8> = hours.into_iter().filter(|hour| *hour < 24).collect();

    let mut runs: Vec<(u8, u8)> = Vec::new();
    for hour in sorted {
        match runs.last_mut() {
            Some((_, end)) if *end + 1 == hour => *end = hour,
            _ => runs.push((hour, hour)),
        }
    }

    runs.into_iter()
        .map(|(start, end)| HourRange {
            start_hour: start,
            end_hour_exclusive: (end + 1) % 24,
        })
        .collect()
}

/// Compress hours into `"HHh-HHh"` strings, sorted by start hour
#[must_use]
pub fn compress<I>(hours: I) -> Vec<String>
where
    I: IntoIterator<Item = u8>,
{
    ranges(hours).iter().map(ToString::to_string).collect()
}
