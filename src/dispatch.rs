use std::collections::BTreeSet;
use std::time::Instant;

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::{DayPlan, DispatchResult, format_day};
use crate::store::Store;
use crate::transport::{Downloader, TransportOptions};

/// Submits a day's work list to the downloader as one batch.
pub struct Dispatcher<D: Downloader> {
    downloader: D,
    options: TransportOptions,
}

impl<D: Downloader> Dispatcher<D> {
    pub fn new(downloader: D, options: TransportOptions) -> Self {
        Self {
            downloader,
            options,
        }
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    pub fn dispatch(&self, plan: &DayPlan, sink: &dyn ProgressSink) -> DispatchResult {
        if plan.work_items.is_empty() {
            return DispatchResult::nothing_to_do();
        }
        let requested = plan.work_items.len();
        let label = format_day(plan.day);

        let dirs: BTreeSet<_> = plan
            .work_items
            .iter()
            .filter_map(|item| item.local_path().parent())
            .collect();
        for dir in dirs {
            if let Err(err) = Store::ensure_dir(dir) {
                return failed(requested, err.to_string());
            }
        }

        sink.event(ProgressEvent {
            message: format!("phase=Fetch; downloading {requested} file(s) for {label}"),
            elapsed: None,
        });
        let start = Instant::now();
        let outcome = self
            .downloader
            .download_batch(&plan.work_items, &self.options);
        let elapsed = start.elapsed();

        match outcome {
            Ok(()) => {
                tracing::info!(day = %label, requested, "batch complete");
                sink.event(ProgressEvent {
                    message: format!("{label}: downloaded {requested} file(s)"),
                    elapsed: Some(elapsed),
                });
                DispatchResult {
                    succeeded: true,
                    requested,
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(day = %label, requested, error = %err, "batch failed");
                sink.event(ProgressEvent {
                    message: format!("{label}: download failed: {err}"),
                    elapsed: Some(elapsed),
                });
                failed(requested, err.to_string())
            }
        }
    }
}

fn failed(requested: usize, error: String) -> DispatchResult {
    DispatchResult {
        succeeded: false,
        requested,
        error: Some(error),
    }
}
