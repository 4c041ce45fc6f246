use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use archive_mirror::app::{App, RunOptions, RunReport};
use archive_mirror::aria2::Aria2Downloader;
use archive_mirror::calendar::DateRange;
use archive_mirror::config::{ConfigLoader, ConfigOverrides, ResolvedConfig};
use archive_mirror::dispatch::Dispatcher;
use archive_mirror::error::MirrorError;
use archive_mirror::http::HttpDownloader;
use archive_mirror::naming::ResourceNamer;
use archive_mirror::output::{JsonOutput, OutputMode, TextOutput};
use archive_mirror::planner::Planner;
use archive_mirror::transport::{Downloader, TransportKind};

const EXIT_FAILED_DAYS: u8 = 4;

#[derive(Parser)]
#[command(name = "archive-mirror")]
#[command(about = "Mirror hourly .json.gz archive files into a date-partitioned directory tree")]
#[command(version, author)]
struct Cli {
    /// First day to mirror (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Last day to mirror (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    end: Option<String>,

    /// Root of the local archive tree
    #[arg(long)]
    dir: Option<String>,

    /// Parallel verifications and downloads per day
    #[arg(long)]
    concurrency: Option<usize>,

    /// Archive host or base URL
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    transport: Option<TransportKind>,

    #[arg(long)]
    config: Option<String>,

    /// Verify and plan only, download nothing
    #[arg(long)]
    dry_run: bool,

    /// Exit non-zero when any day failed to download
    #[arg(long)]
    strict: bool,

    #[arg(long)]
    non_interactive: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(completion) => {
            if completion.strict && completion.failed_days > 0 {
                return ExitCode::from(EXIT_FAILED_DAYS);
            }
            ExitCode::SUCCESS
        }
        Err(report) => {
            eprintln!("{report:?}");
            if let Some(err) = report.downcast_ref::<MirrorError>() {
                return ExitCode::from(map_exit_code(err));
            }
            ExitCode::from(1)
        }
    }
}

struct Completion {
    strict: bool,
    failed_days: usize,
}

fn map_exit_code(error: &MirrorError) -> u8 {
    match error {
        MirrorError::InvalidDate(_)
        | MirrorError::InvalidRange { .. }
        | MirrorError::MissingStartDate
        | MirrorError::ConfigRead(_)
        | MirrorError::ConfigParse(_)
        | MirrorError::InvalidConfig(_) => 2,
        MirrorError::MissingTool(_) | MirrorError::ArchiveHttp(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<Completion> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let overrides = ConfigOverrides {
        start_date: cli.start,
        end_date: cli.end,
        download_dir: cli.dir,
        concurrency: cli.concurrency,
        archive_host: cli.host,
        transport: cli.transport,
    };
    let config = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;

    let today = chrono::Local::now().date_naive();
    let resolved = DateRange::resolve(&config.start_date, config.end_date.as_deref(), today)?;

    let downloader = build_downloader(&config, cli.dry_run)?;
    let app = build_app(&config, downloader);
    let options = RunOptions {
        dry_run: cli.dry_run,
    };

    let report = match output_mode {
        OutputMode::NonInteractive => {
            let report = app.run(&resolved, options, &JsonOutput);
            JsonOutput::print_run(&report).into_diagnostic()?;
            report
        }
        OutputMode::Interactive => {
            let report = app.run(&resolved, options, &TextOutput);
            TextOutput::print_summary(&report);
            report
        }
    };

    Ok(completion(&report, cli.strict))
}

fn build_downloader(
    config: &ResolvedConfig,
    dry_run: bool,
) -> Result<Box<dyn Downloader>, MirrorError> {
    match config.transport {
        TransportKind::Http => Ok(Box::new(HttpDownloader::new()?)),
        TransportKind::Aria2 if dry_run => Ok(Box::new(Aria2Downloader::with_program("aria2c"))),
        TransportKind::Aria2 => Ok(Box::new(Aria2Downloader::new()?)),
    }
}

fn build_app(config: &ResolvedConfig, downloader: Box<dyn Downloader>) -> App<Box<dyn Downloader>> {
    let namer = ResourceNamer::new(&config.archive_host, config.download_dir.clone());
    let planner = Planner::new(namer, config.concurrency);
    let dispatcher = Dispatcher::new(downloader, config.transport_options.clone());
    App::new(planner, dispatcher)
}

fn completion(report: &RunReport, strict: bool) -> Completion {
    Completion {
        strict,
        failed_days: report.summary.days_with_failures,
    }
}
