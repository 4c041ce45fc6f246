use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, RunReport};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(report: &RunReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Streams progress lines to stdout as the run advances.
pub struct TextOutput;

impl TextOutput {
    pub fn format_event(event: &ProgressEvent) -> String {
        let message = event.message.trim();
        let line = match parse_phase(message) {
            Some((phase, payload)) => format!("[{phase}] {payload}"),
            None => message.to_string(),
        };
        match event.elapsed {
            Some(elapsed) => format!("{line} ({:.1}s)", elapsed.as_secs_f64()),
            None => line,
        }
    }

    pub fn print_summary(report: &RunReport) {
        let green = "\x1b[32m";
        let yellow = "\x1b[33m";
        let cyan = "\x1b[36m";
        let red = "\x1b[31m";
        let reset = "\x1b[0m";
        let summary = &report.summary;

        println!("{cyan}archive-mirror summary{reset}");
        println!(
            "{green}days complete: {} of {} ({} already on disk){reset}",
            summary.days_fully_valid, summary.days_processed, summary.days_already_complete
        );
        if report.dry_run {
            println!(
                "{yellow}dry run: {} file(s) would be downloaded{reset}",
                summary.files_requested
            );
        } else {
            println!("{cyan}files requested: {}{reset}", summary.files_requested);
        }
        if summary.days_with_failures > 0 {
            println!(
                "{red}days with failures: {} (run again to retry){reset}",
                summary.days_with_failures
            );
            for day in report.days.iter().filter(|day| day.error.is_some()) {
                println!(
                    "{red}   {}: {}{reset}",
                    day.day,
                    day.error.as_deref().unwrap_or_default()
                );
            }
        }
        println!("processed {} to {}", report.start, report.end);
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        println!("{}", Self::format_event(&event));
    }
}

fn parse_phase(message: &str) -> Option<(&str, &str)> {
    let rest = message.strip_prefix("phase=")?;
    let (phase, payload) = rest.split_once(';')?;
    Some((phase.trim(), payload.trim()))
}
