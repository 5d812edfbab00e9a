//! Notification report rendering
//!
//! Turns the signature groups of one day into the lines of the notification text.

use super::SignatureGroups;
use crate::config::Vocabulary;
use crate::models::ForecastDay;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// The notification for one forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub day: ForecastDay,
    pub lines: Vec<String>,
}

impl Report {
    /// Lines joined by `\n`, as written to notification files
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Renders reports with a fixed vocabulary
#[derive(Debug, Clone, Copy)]
pub struct ReportRenderer<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> ReportRenderer<'a> {
    #[must_use]
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Location name as shown in a report line
    #[must_use]
    pub fn display_name<'n>(&self, name: &'n str) -> &'n str {
        self.vocabulary
            .display_strip_prefixes
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix.as_str()))
            .unwrap_or(name)
    }

    /// Render one day.
    ///
    /// Groups are ordered by member count descending, then by smallest member
    /// name, then by signature. The dry group is never listed. The first rainy
    /// group with more than one member is labelled with the aggregate label.
    #[must_use]
    pub fn render(&self, groups: &SignatureGroups, day: ForecastDay) -> Report {
        let vocabulary = self.vocabulary;

        if groups.values().all(|members| members.is_empty()) {
            let label = vocabulary.day_labels.label(day);
            return Report {
                day,
                lines: vec![vocabulary.no_data_template.replace("{day}", label)],
            };
        }

        let mut ordered: Vec<_> = groups.iter().collect();
        ordered.sort_by(|(sig_a, members_a), (sig_b, members_b)| {
            (Reverse(members_a.len()), members_a.first(), *sig_a).cmp(&(
                Reverse(members_b.len()),
                members_b.first(),
                *sig_b,
            ))
        });

        let mut lines = vec![vocabulary.header.clone()];
        let mut aggregate_used = false;

        for (signature, members) in ordered {
            if signature.is_empty() {
                continue;
            }
            let label = if !aggregate_used && members.len() > 1 {
                aggregate_used = true;
                vocabulary.aggregate_label.clone()
            } else {
                members
                    .iter()
                    .map(|name| self.display_name(name))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            lines.push(format!("{label}: {}.", signature.render()));
        }

        if lines.len() == 1 {
            lines.push(vocabulary.no_rain_line.clone());
        }
        lines.push(vocabulary.footer.clone());

        Report { day, lines }
    }
}
