use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::WorkItem;
use crate::error::MirrorError;

/// Tuning knobs handed to the downloader. The reconciliation engine never
/// interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    pub max_concurrent_downloads: usize,
    pub max_connections_per_server: usize,
    pub split_count: usize,
    pub min_split_size: String,
    pub continue_on_partial: bool,
    pub disable_auto_renaming: bool,
}

impl TransportOptions {
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            max_concurrent_downloads: concurrency.max(1),
            ..Self::default()
        }
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: crate::pool::default_concurrency(),
            max_connections_per_server: 16,
            split_count: 16,
            min_split_size: "1M".to_string(),
            continue_on_partial: true,
            disable_auto_renaming: true,
        }
    }
}

/// Fetches a batch of `(url, destination)` pairs.
///
/// Success or failure is reported for the batch as a whole. Callers rely on
/// the next verification pass, not on this result, to find which files are
/// still missing.
pub trait Downloader: Send + Sync {
    fn download_batch(
        &self,
        items: &[WorkItem],
        options: &TransportOptions,
    ) -> Result<(), MirrorError>;
}

impl<D: Downloader + ?Sized> Downloader for Box<D> {
    fn download_batch(
        &self,
        items: &[WorkItem],
        options: &TransportOptions,
    ) -> Result<(), MirrorError> {
        (**self).download_batch(items, options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Http,
    Aria2,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Http => write!(f, "http"),
            TransportKind::Aria2 => write!(f, "aria2"),
        }
    }
}
