use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MirrorError {
    #[error("invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("missing start date (pass --start or set start_date in the config file)")]
    #[diagnostic(help("for example: archive-mirror --start 2024-06-15"))]
    MissingStartDate,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to verify {path}: {message}")]
    Verification { path: String, message: String },

    #[error("failed to delete corrupt file {path}: {message}")]
    Deletion { path: String, message: String },

    #[error("download batch failed: {0}")]
    Dispatch(String),

    #[error("archive request failed: {0}")]
    ArchiveHttp(String),

    #[error("archive returned status {status} for {url}")]
    ArchiveStatus { status: u16, url: String },

    #[error("required tool not found: {0}")]
    MissingTool(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
