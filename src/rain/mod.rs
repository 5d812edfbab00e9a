//! Rain report core
//!
//! Pure, synchronous transformation from fetched hourly forecasts to report text:
//! - Rain detection over free-text forecast phrases
//! - Hour-range compression with an exclusive, midnight-wrapping upper bound
//! - Grouping of districts by their rain signature
//! - Report rendering with a system-wide aggregate line
//! - Per-branch daily summary sentences

pub mod detector;
pub mod grouper;
pub mod hours;
pub mod orchestrator;
pub mod report;
pub mod signature;
pub mod summary;

pub use detector::RainDetector;
pub use grouper::{SignatureGroups, group};
pub use hours::{HourRange, compress};
pub use orchestrator::build_reports;
pub use report::{Report, ReportRenderer};
pub use signature::{RainHours, Signature, SignatureStrategy, VerbatimPhrase, strategy_for};
pub use summary::summarize_branches;
