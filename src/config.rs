use std::fs;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::MirrorError;
use crate::naming::DEFAULT_ARCHIVE_HOST;
use crate::pool::default_concurrency;
use crate::transport::{TransportKind, TransportOptions};

pub const CONFIG_FILE_NAME: &str = "archive-mirror.json";
pub const DEFAULT_DOWNLOAD_DIR: &str = "data";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub download_dir: Option<String>,
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub archive_host: Option<String>,
    #[serde(default)]
    pub transport: Option<TransportKind>,
    #[serde(default)]
    pub transport_options: Option<TransportOptions>,
}

/// Values given on the command line. Each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub download_dir: Option<String>,
    pub concurrency: Option<usize>,
    pub archive_host: Option<String>,
    pub transport: Option<TransportKind>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub start_date: String,
    pub end_date: Option<String>,
    pub download_dir: Utf8PathBuf,
    pub concurrency: usize,
    pub archive_host: String,
    pub transport: TransportKind,
    pub transport_options: TransportOptions,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads the config file, if any.
    ///
    /// An explicit path must exist. Otherwise `./archive-mirror.json` and then
    /// the per-user config directory are tried, and no file at all means an
    /// empty config.
    pub fn load(path: Option<&str>) -> Result<Config, MirrorError> {
        let candidate = match path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::default_locations()
                .into_iter()
                .find(|candidate| candidate.is_file()),
        };
        match candidate {
            Some(path) => Self::read(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, MirrorError> {
        Self::resolve_config(Self::load(path)?, overrides)
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, MirrorError> {
        let start_date = overrides
            .start_date
            .or(config.start_date)
            .ok_or(MirrorError::MissingStartDate)?;
        let end_date = overrides.end_date.or(config.end_date);

        let concurrency = overrides
            .concurrency
            .or(config.concurrency)
            .unwrap_or_else(default_concurrency);
        if concurrency == 0 {
            return Err(MirrorError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let download_dir = overrides
            .download_dir
            .or(config.download_dir)
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_DIR.to_string());
        if download_dir.trim().is_empty() {
            return Err(MirrorError::InvalidConfig(
                "download directory must not be empty".to_string(),
            ));
        }

        let archive_host = overrides
            .archive_host
            .or(config.archive_host)
            .unwrap_or_else(|| DEFAULT_ARCHIVE_HOST.to_string());

        let mut transport_options = config.transport_options.unwrap_or_default();
        transport_options.max_concurrent_downloads = concurrency;

        Ok(ResolvedConfig {
            start_date,
            end_date,
            download_dir: Utf8PathBuf::from(download_dir),
            concurrency,
            archive_host,
            transport: overrides.transport.or(config.transport).unwrap_or_default(),
            transport_options,
        })
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dirs) = BaseDirs::new() {
            locations.push(dirs.config_dir().join("archive-mirror").join("config.json"));
        }
        locations
    }

    fn read(path: &Path) -> Result<Config, MirrorError> {
        let content =
            fs::read_to_string(path).map_err(|_| MirrorError::ConfigRead(path.to_path_buf()))?;
        serde_json::from_str(&content).map_err(|err| MirrorError::ConfigParse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn cli_overrides_file_values() {
        let config: Config = serde_json::from_str(
            r#"{
                "start_date": "2015-01-01",
                "end_date": "2015-01-31",
                "download_dir": "/srv/archive",
                "concurrency": 8,
                "transport": "aria2",
                "transport_options": { "split_count": 4 }
            }"#,
        )
        .unwrap();
        let overrides = ConfigOverrides {
            start_date: Some("2015-01-10".to_string()),
            concurrency: Some(2),
            ..ConfigOverrides::default()
        };

        let resolved = ConfigLoader::resolve_config(config, overrides).unwrap();
        assert_eq!(resolved.start_date, "2015-01-10");
        assert_eq!(resolved.end_date.as_deref(), Some("2015-01-31"));
        assert_eq!(resolved.download_dir, Utf8PathBuf::from("/srv/archive"));
        assert_eq!(resolved.concurrency, 2);
        assert_eq!(resolved.transport, TransportKind::Aria2);
        assert_eq!(resolved.transport_options.max_concurrent_downloads, 2);
        assert_eq!(resolved.transport_options.split_count, 4);
        assert_eq!(resolved.archive_host, DEFAULT_ARCHIVE_HOST);
    }

    #[test]
    fn start_date_is_required() {
        let err =
            ConfigLoader::resolve_config(Config::default(), ConfigOverrides::default()).unwrap_err();
        assert_matches!(err, MirrorError::MissingStartDate);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let overrides = ConfigOverrides {
            start_date: Some("2015-01-01".to_string()),
            concurrency: Some(0),
            ..ConfigOverrides::default()
        };
        let err = ConfigLoader::resolve_config(Config::default(), overrides).unwrap_err();
        assert_matches!(err, MirrorError::InvalidConfig(_));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = ConfigLoader::load(Some("/definitely/not/here.json")).unwrap_err();
        assert_matches!(err, MirrorError::ConfigRead(_));
    }
}
