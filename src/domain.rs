use std::fmt;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use serde::Serialize;

pub const HOURS_PER_DAY: u8 = 24;

/// One hourly archive file: where it lives remotely and where it belongs locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    pub day: NaiveDate,
    pub hour: u8,
    pub url: String,
    pub local_path: Utf8PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationResult {
    Missing,
    Valid,
    Corrupt,
}

impl VerificationResult {
    pub fn needs_download(self) -> bool {
        matches!(self, VerificationResult::Missing | VerificationResult::Corrupt)
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationResult::Missing => write!(f, "missing"),
            VerificationResult::Valid => write!(f, "valid"),
            VerificationResult::Corrupt => write!(f, "corrupt"),
        }
    }
}

/// A resource the planner decided must be (re-)downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub resource: Resource,
    pub found: VerificationResult,
}

impl WorkItem {
    pub fn url(&self) -> &str {
        &self.resource.url
    }

    pub fn local_path(&self) -> &Utf8PathBuf {
        &self.resource.local_path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlan {
    pub day: NaiveDate,
    pub work_items: Vec<WorkItem>,
    pub valid: usize,
    pub deletion_failures: usize,
}

impl DayPlan {
    pub fn is_complete(&self) -> bool {
        self.work_items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub succeeded: bool,
    pub requested: usize,
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn nothing_to_do() -> Self {
        Self {
            succeeded: true,
            requested: 0,
            error: None,
        }
    }
}

pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_and_corrupt_need_download() {
        assert!(VerificationResult::Missing.needs_download());
        assert!(VerificationResult::Corrupt.needs_download());
        assert!(!VerificationResult::Valid.needs_download());
    }

    #[test]
    fn format_day_is_zero_padded() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(format_day(day), "2024-06-05");
    }
}
