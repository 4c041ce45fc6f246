use std::fs;
use std::io::{self, Read};

use camino::Utf8Path;

use crate::error::MirrorError;

const PART_PREFIX: &str = ".archive-mirror";
const PART_SUFFIX: &str = ".part";

/// Filesystem mutations on the local archive tree. The tree is the only
/// persistent state; there is no manifest.
pub struct Store;

impl Store {
    pub fn ensure_dir(path: &Utf8Path) -> Result<(), MirrorError> {
        fs::create_dir_all(path.as_std_path())
            .map_err(|err| MirrorError::Filesystem(format!("create {path}: {err}")))
    }

    pub fn ensure_parent(path: &Utf8Path) -> Result<(), MirrorError> {
        let parent = path
            .parent()
            .ok_or_else(|| MirrorError::Filesystem(format!("no parent directory for {path}")))?;
        Self::ensure_dir(parent)
    }

    /// Removes a file that failed verification. A file that is already gone
    /// counts as removed.
    pub fn remove_corrupt(path: &Utf8Path) -> Result<(), MirrorError> {
        match fs::remove_file(path.as_std_path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MirrorError::Deletion {
                path: path.to_string(),
                message: err.to_string(),
            }),
        }
    }

    /// Deletes temp files left in `dir` by transfers that were killed before
    /// they could be renamed into place. Returns how many were removed.
    pub fn remove_stale_parts(dir: &Utf8Path) -> usize {
        let Ok(entries) = fs::read_dir(dir.as_std_path()) else {
            return 0;
        };
        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !is_partial_download(name) || !entry.path().is_file() {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(err) => {
                    tracing::warn!(path = %entry.path().display(), error = %err, "cannot remove stale partial download");
                }
            }
        }
        removed
    }

    /// Streams `source` into a temp file next to `dest` and renames it into
    /// place, replacing whatever is there.
    pub fn write_stream_atomic(dest: &Utf8Path, source: &mut dyn Read) -> Result<u64, MirrorError> {
        Self::ensure_parent(dest)?;
        let parent = dest
            .parent()
            .ok_or_else(|| MirrorError::Filesystem(format!("no parent directory for {dest}")))?;
        let mut temp = tempfile::Builder::new()
            .prefix(PART_PREFIX)
            .suffix(PART_SUFFIX)
            .tempfile_in(parent.as_std_path())
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        let written = io::copy(source, temp.as_file_mut())
            .map_err(|err| MirrorError::Filesystem(format!("write {dest}: {err}")))?;
        temp.as_file()
            .sync_all()
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        temp.persist(dest.as_std_path())
            .map_err(|err| MirrorError::Filesystem(format!("persist {dest}: {}", err.error)))?;
        Ok(written)
    }
}

fn is_partial_download(file_name: &str) -> bool {
    file_name.starts_with(PART_PREFIX) && file_name.ends_with(PART_SUFFIX)
}
