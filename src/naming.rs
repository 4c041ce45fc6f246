use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Datelike, NaiveDate};

use crate::domain::{HOURS_PER_DAY, Resource};

pub const DEFAULT_ARCHIVE_HOST: &str = "data.gharchive.org";

/// Maps `(day, hour)` to the remote URL and the local path of an archive file.
///
/// Year, month and day are zero padded; the hour is not. Both the archive and
/// the local tree use the same file name.
#[derive(Debug, Clone)]
pub struct ResourceNamer {
    base_url: String,
    root: Utf8PathBuf,
}

impl ResourceNamer {
    /// `host` may be a bare host name or a full `http(s)://` base URL.
    pub fn new(host: &str, root: impl Into<Utf8PathBuf>) -> Self {
        let host = host.trim().trim_end_matches('/');
        let base_url = if host.starts_with("https://") || host.starts_with("http://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        Self {
            base_url,
            root: root.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn file_name(day: NaiveDate, hour: u8) -> String {
        format!(
            "{:04}-{:02}-{:02}-{}.json.gz",
            day.year(),
            day.month(),
            day.day(),
            hour
        )
    }

    pub fn url(&self, day: NaiveDate, hour: u8) -> String {
        format!("{}/{}", self.base_url, Self::file_name(day, hour))
    }

    pub fn day_dir(&self, day: NaiveDate) -> Utf8PathBuf {
        self.root
            .join(format!("{:04}", day.year()))
            .join(format!("{:02}", day.month()))
    }

    pub fn local_path(&self, day: NaiveDate, hour: u8) -> Utf8PathBuf {
        self.day_dir(day).join(Self::file_name(day, hour))
    }

    pub fn name(&self, day: NaiveDate, hour: u8) -> Resource {
        Resource {
            day,
            hour,
            url: self.url(day, hour),
            local_path: self.local_path(day, hour),
        }
    }

    pub fn name_all(&self, day: NaiveDate) -> Vec<Resource> {
        (0..HOURS_PER_DAY).map(|hour| self.name(day, hour)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_https_scheme() {
        let namer = ResourceNamer::new("data.gharchive.org/", "data");
        assert_eq!(namer.base_url(), "https://data.gharchive.org");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let namer = ResourceNamer::new("http://127.0.0.1:8080", "data");
        let day = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        assert_eq!(namer.url(day, 7), "http://127.0.0.1:8080/2015-01-01-7.json.gz");
    }

    #[test]
    fn hour_is_not_padded_but_date_is() {
        let day = NaiveDate::from_ymd_opt(2011, 2, 3).unwrap();
        assert_eq!(ResourceNamer::file_name(day, 4), "2011-02-03-4.json.gz");
        assert_eq!(ResourceNamer::file_name(day, 23), "2011-02-03-23.json.gz");
    }
}
