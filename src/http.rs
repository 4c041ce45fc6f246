use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::WorkItem;
use crate::error::MirrorError;
use crate::pool::run_bounded;
use crate::store::Store;
use crate::transport::{Downloader, TransportOptions};

/// Plain HTTPS transport: one GET per file, `max_concurrent_downloads` at a
/// time. Connection splitting options are ignored.
#[derive(Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self, MirrorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("archive-mirror/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MirrorError::ArchiveHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|err| MirrorError::ArchiveHttp(err.to_string()))?;
        Ok(Self { client })
    }

    fn download_one(&self, item: &WorkItem) -> Result<u64, MirrorError> {
        let url = item.url();
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| MirrorError::ArchiveHttp(err.to_string()))?;
        let mut response = Self::handle_status(response, url)?;
        Store::write_stream_atomic(item.local_path(), &mut response)
    }

    fn handle_status(
        response: reqwest::blocking::Response,
        url: &str,
    ) -> Result<reqwest::blocking::Response, MirrorError> {
        if response.status().is_success() {
            return Ok(response);
        }
        Err(MirrorError::ArchiveStatus {
            status: response.status().as_u16(),
            url: url.to_string(),
        })
    }
}

impl Downloader for HttpDownloader {
    fn download_batch(
        &self,
        items: &[WorkItem],
        options: &TransportOptions,
    ) -> Result<(), MirrorError> {
        let results = run_bounded(items, options.max_concurrent_downloads, |item| {
            let result = self.download_one(item);
            match &result {
                Ok(bytes) => tracing::debug!(url = item.url(), bytes, "downloaded"),
                Err(err) => tracing::warn!(url = item.url(), error = %err, "download failed"),
            }
            result
        });

        let mut failures = results.into_iter().filter_map(Result::err);
        let Some(first) = failures.next() else {
            return Ok(());
        };
        let failed = 1 + failures.count();
        Err(MirrorError::Dispatch(format!(
            "{failed} of {} downloads failed (first: {first})",
            items.len()
        )))
    }
}
