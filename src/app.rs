use std::time::Duration;

use serde::Serialize;

use crate::calendar::{EndDateClamp, ResolvedRange};
use crate::dispatch::Dispatcher;
use crate::domain::{DayPlan, DispatchResult, format_day};
use crate::planner::Planner;
use crate::transport::Downloader;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOutcome {
    AlreadyComplete,
    Downloaded,
    Failed,
    Planned,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub day: String,
    pub outcome: DayOutcome,
    pub valid: usize,
    pub requested: usize,
    pub deletion_failures: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub days_processed: usize,
    pub days_fully_valid: usize,
    pub days_with_failures: usize,
    pub days_already_complete: usize,
    pub files_requested: usize,
}

impl RunSummary {
    fn record(&mut self, report: &DayReport) {
        self.days_processed += 1;
        self.files_requested += report.requested;
        match report.outcome {
            DayOutcome::AlreadyComplete => {
                self.days_already_complete += 1;
                self.days_fully_valid += 1;
            }
            DayOutcome::Downloaded => self.days_fully_valid += 1,
            DayOutcome::Failed => self.days_with_failures += 1,
            DayOutcome::Planned => {}
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub start: String,
    pub end: String,
    pub clamp: Option<EndDateClamp>,
    pub dry_run: bool,
    pub days: Vec<DayReport>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Walks the date range one day at a time: plan, dispatch, next day.
///
/// A failed day never stops the loop. Re-running the whole program is the
/// retry mechanism, since planning re-verifies everything from disk.
pub struct App<D: Downloader> {
    planner: Planner,
    dispatcher: Dispatcher<D>,
}

impl<D: Downloader> App<D> {
    pub fn new(planner: Planner, dispatcher: Dispatcher<D>) -> Self {
        Self {
            planner,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<D> {
        &self.dispatcher
    }

    pub fn run(
        &self,
        resolved: &ResolvedRange,
        options: RunOptions,
        sink: &dyn ProgressSink,
    ) -> RunReport {
        let range = resolved.range;
        if let Some(clamp) = &resolved.clamp {
            sink.event(ProgressEvent {
                message: format!(
                    "warning: end date {} is in the future, using {}",
                    format_day(clamp.configured),
                    format_day(clamp.effective)
                ),
                elapsed: None,
            });
        }
        sink.event(ProgressEvent {
            message: format!(
                "phase=Resolve; {} day(s) from {} to {}",
                range.day_count(),
                format_day(range.start()),
                format_day(range.end())
            ),
            elapsed: None,
        });

        let mut summary = RunSummary::default();
        let mut days = Vec::with_capacity(range.day_count());
        for day in range.days() {
            let report = if options.dry_run {
                day_report(&self.planner.preview(day, sink), None)
            } else {
                let plan = self.planner.plan(day, sink);
                let dispatched = self.dispatcher.dispatch(&plan, sink);
                day_report(&plan, Some(dispatched))
            };
            sink.event(ProgressEvent {
                message: outcome_message(&report),
                elapsed: None,
            });
            summary.record(&report);
            days.push(report);
        }

        tracing::info!(
            processed = summary.days_processed,
            failed = summary.days_with_failures,
            "run finished"
        );

        RunReport {
            start: format_day(range.start()),
            end: format_day(range.end()),
            clamp: resolved.clamp,
            dry_run: options.dry_run,
            days,
            summary,
        }
    }
}

fn day_report(plan: &DayPlan, dispatched: Option<DispatchResult>) -> DayReport {
    let requested = plan.work_items.len();
    let (outcome, error) = match dispatched {
        None if plan.is_complete() => (DayOutcome::AlreadyComplete, None),
        None => (DayOutcome::Planned, None),
        Some(result) if !result.succeeded => (DayOutcome::Failed, result.error),
        Some(_) if plan.is_complete() => (DayOutcome::AlreadyComplete, None),
        Some(_) => (DayOutcome::Downloaded, None),
    };
    DayReport {
        day: format_day(plan.day),
        outcome,
        valid: plan.valid,
        requested,
        deletion_failures: plan.deletion_failures,
        error,
    }
}

fn outcome_message(report: &DayReport) -> String {
    match report.outcome {
        DayOutcome::AlreadyComplete => format!("{}: already complete", report.day),
        DayOutcome::Downloaded => format!("{}: downloaded", report.day),
        DayOutcome::Failed => format!("{}: failed, re-run to retry", report.day),
        DayOutcome::Planned => format!("{}: {} file(s) to download", report.day, report.requested),
    }
}
