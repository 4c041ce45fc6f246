use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::domain::{Resource, VerificationResult};
use crate::error::MirrorError;
use crate::pool::run_bounded;

/// Classifies the file at `path` without modifying it.
///
/// The gzip container is decoded end to end into a sink: that checks every
/// member header, the deflate stream, and the CRC32/size trailers, which is
/// what catches truncated transfers and flipped bits. The JSON inside is not
/// inspected. I/O failures while testing count as corruption.
pub fn verify(path: &Path) -> VerificationResult {
    match fs::metadata(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => return VerificationResult::Missing,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "cannot stat archive file");
            return VerificationResult::Corrupt;
        }
        Ok(meta) if !meta.is_file() || meta.len() == 0 => return VerificationResult::Corrupt,
        Ok(_) => {}
    }

    match check_gzip(path) {
        Ok(()) => VerificationResult::Valid,
        Err(err) => {
            tracing::debug!(error = %err, "integrity check failed");
            VerificationResult::Corrupt
        }
    }
}

pub fn check_gzip(path: &Path) -> Result<(), MirrorError> {
    let to_error = |err: io::Error| MirrorError::Verification {
        path: path.display().to_string(),
        message: err.to_string(),
    };
    let file = File::open(path).map_err(to_error)?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(file));
    io::copy(&mut decoder, &mut io::sink()).map_err(to_error)?;
    Ok(())
}

/// Verifies a batch of resources on `workers` threads. Order is preserved.
pub fn verify_all(
    resources: Vec<Resource>,
    workers: usize,
) -> Vec<(Resource, VerificationResult)> {
    let results = run_bounded(&resources, workers, |resource| {
        verify(resource.local_path.as_std_path())
    });
    resources.into_iter().zip(results).collect()
}
