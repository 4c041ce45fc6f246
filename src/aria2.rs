use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::WorkItem;
use crate::error::MirrorError;
use crate::transport::{Downloader, TransportOptions};

/// Hands the batch to an external `aria2c` process.
#[derive(Debug, Clone)]
pub struct Aria2Downloader {
    program: PathBuf,
}

impl Aria2Downloader {
    pub fn new() -> Result<Self, MirrorError> {
        let program =
            find_in_path("aria2c").ok_or_else(|| MirrorError::MissingTool("aria2c".to_string()))?;
        Ok(Self::with_program(program))
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// aria2 input file: the URL, then indented per-download options.
    pub fn input_file(items: &[WorkItem]) -> Result<String, MirrorError> {
        let mut out = String::new();
        for item in items {
            let path = item.local_path();
            let (dir, name) = path
                .parent()
                .zip(path.file_name())
                .ok_or_else(|| MirrorError::Filesystem(format!("not a file path: {path}")))?;
            out.push_str(item.url());
            out.push('\n');
            out.push_str(&format!("  dir={dir}\n  out={name}\n"));
        }
        Ok(out)
    }

    pub fn args(input: &Path, options: &TransportOptions) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-j".to_string(),
            options.max_concurrent_downloads.max(1).to_string(),
            "-x".to_string(),
            options.max_connections_per_server.max(1).to_string(),
            "-s".to_string(),
            options.split_count.max(1).to_string(),
            "-k".to_string(),
            options.min_split_size.clone(),
        ];
        if options.continue_on_partial {
            args.push("-c".to_string());
        }
        if options.disable_auto_renaming {
            args.push("--auto-file-renaming=false".to_string());
        }
        args
    }
}

impl Downloader for Aria2Downloader {
    fn download_batch(
        &self,
        items: &[WorkItem],
        options: &TransportOptions,
    ) -> Result<(), MirrorError> {
        let mut input = tempfile::Builder::new()
            .prefix("archive-mirror-aria2")
            .suffix(".txt")
            .tempfile()
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        input
            .write_all(Self::input_file(items)?.as_bytes())
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        input
            .flush()
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;

        let args = Self::args(input.path(), options);
        tracing::debug!(program = %self.program.display(), ?args, "starting aria2c");
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|err| MirrorError::Dispatch(format!("{}: {err}", self.program.display())))?;
        if status.success() {
            return Ok(());
        }
        Err(MirrorError::Dispatch(format!(
            "aria2c exited with {status} for {} file(s)",
            items.len()
        )))
    }
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        [dir.join(format!("{name}.exe")), dir.join(name)]
            .into_iter()
            .find(|candidate| candidate.is_file())
    })
}
