use chrono::NaiveDate;

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::{DayPlan, VerificationResult, WorkItem, format_day};
use crate::naming::ResourceNamer;
use crate::store::Store;
use crate::verify::verify_all;

/// Decides which of a day's 24 hourly files must be fetched.
#[derive(Debug, Clone)]
pub struct Planner {
    namer: ResourceNamer,
    workers: usize,
}

impl Planner {
    pub fn new(namer: ResourceNamer, workers: usize) -> Self {
        Self {
            namer,
            workers: workers.max(1),
        }
    }

    pub fn namer(&self) -> &ResourceNamer {
        &self.namer
    }

    /// Verifies every hour of `day`, deletes corrupt files, and returns the
    /// work list in hour order. Temp files left by an interrupted transfer
    /// are swept from the day's directory first.
    ///
    /// A corrupt file that cannot be deleted is still queued; the transport
    /// replaces it or reports the failure.
    pub fn plan(&self, day: NaiveDate, sink: &dyn ProgressSink) -> DayPlan {
        self.reconcile(day, true, sink)
    }

    /// Same work list as [`Planner::plan`], but leaves the local tree untouched.
    pub fn preview(&self, day: NaiveDate, sink: &dyn ProgressSink) -> DayPlan {
        self.reconcile(day, false, sink)
    }

    fn reconcile(&self, day: NaiveDate, mutate: bool, sink: &dyn ProgressSink) -> DayPlan {
        let label = format_day(day);
        sink.event(ProgressEvent {
            message: format!("phase=Verify; checking {label}"),
            elapsed: None,
        });

        if mutate {
            let swept = Store::remove_stale_parts(&self.namer.day_dir(day));
            if swept > 0 {
                tracing::info!(day = %label, swept, "removed stale partial downloads");
            }
        }

        let checked = verify_all(self.namer.name_all(day), self.workers);
        let mut work_items = Vec::new();
        let mut valid = 0usize;
        let mut deletion_failures = 0usize;

        for (resource, found) in checked {
            match found {
                VerificationResult::Valid => {
                    valid += 1;
                    tracing::debug!(path = %resource.local_path, "exists and is valid");
                    continue;
                }
                VerificationResult::Corrupt if !mutate => {
                    sink.event(ProgressEvent {
                        message: format!("corrupted, would delete: {}", resource.local_path),
                        elapsed: None,
                    });
                }
                VerificationResult::Corrupt => {
                    sink.event(ProgressEvent {
                        message: format!("corrupted, will retry: {}", resource.local_path),
                        elapsed: None,
                    });
                    if let Err(err) = Store::remove_corrupt(&resource.local_path) {
                        deletion_failures += 1;
                        tracing::warn!(error = %err, "queuing undeletable corrupt file anyway");
                        sink.event(ProgressEvent {
                            message: err.to_string(),
                            elapsed: None,
                        });
                    }
                }
                VerificationResult::Missing => {
                    sink.event(ProgressEvent {
                        message: format!("missing: {}", resource.local_path),
                        elapsed: None,
                    });
                }
            }
            work_items.push(WorkItem { resource, found });
        }

        if valid > 0 {
            sink.event(ProgressEvent {
                message: format!("{label}: {valid} file(s) exist and are valid"),
                elapsed: None,
            });
        }

        DayPlan {
            day,
            work_items,
            valid,
            deletion_failures,
        }
    }
}
