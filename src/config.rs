use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Soft-AP address the device serves its setup pages on
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.4.1/";

pub const STATUS_PATH: &str = "info.json";
pub const UPLOAD_PATH: &str = "/ota";
pub const RESTART_PATH: &str = "/restart";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    // Device endpoints
    pub device_url: String,
    pub status_path: String,
    pub upload_path: String,
    pub restart_path: String,

    // Request timeouts, 0 = wait forever
    pub status_timeout_secs: u64,
    pub upload_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            device_url: DEFAULT_DEVICE_URL.to_string(),
            status_path: STATUS_PATH.to_string(),
            upload_path: UPLOAD_PATH.to_string(),
            restart_path: RESTART_PATH.to_string(),
            status_timeout_secs: 5,
            upload_timeout_secs: 120,
        }
    }
}

impl ConsoleConfig {
    /// Device base URL, with a scheme and a trailing slash so relative paths
    /// like `info.json` resolve under it.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.device_url.trim().to_string();
        if !raw.contains("://") {
            raw = format!("http://{}", raw);
        }
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("Invalid device URL '{}'", self.device_url))
    }

    pub fn status_timeout(&self) -> Option<Duration> {
        timeout_from_secs(self.status_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Option<Duration> {
        timeout_from_secs(self.upload_timeout_secs)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Load the config file if there is one, falling back to defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ConsoleConfig> {
    let Some(path) = path else {
        log::debug!("No config file given, using defaults");
        return Ok(ConsoleConfig::default());
    };

    match load_from_file(path) {
        Ok(config) => {
            log::info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        Err(e) => {
            let missing = e
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == ErrorKind::NotFound);
            if missing {
                log::info!("Config file {} not found, using defaults", path.display());
            } else {
                log::warn!("Failed to load config from {}: {:?}, using defaults", path.display(), e);
            }
            Ok(ConsoleConfig::default())
        }
    }
}

fn load_from_file(path: &Path) -> Result<ConsoleConfig> {
    let data = fs::read(path)?;
    let config: ConsoleConfig = serde_json::from_slice(&data)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.status_path, "info.json");
        assert_eq!(config.upload_path, "/ota");
        assert_eq!(config.status_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.upload_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = ConsoleConfig {
            upload_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.upload_timeout(), None);
    }

    #[test]
    fn test_base_url_normalization() {
        let mut config = ConsoleConfig {
            device_url: "10.0.0.7".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url().unwrap().as_str(), "http://10.0.0.7/");

        config.device_url = "http://clock.local/setup".to_string();
        let base = config.base_url().unwrap();
        assert_eq!(base.as_str(), "http://clock.local/setup/");
        assert_eq!(base.join("info.json").unwrap().as_str(), "http://clock.local/setup/info.json");
        assert_eq!(base.join("/ota").unwrap().as_str(), "http://clock.local/ota");

        config.device_url = "http://[::1".to_string();
        assert!(config.base_url().is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(Some(&dir.path().join("nope.json"))).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.json");
        fs::write(&path, r#"{"device_url":"http://10.1.1.1/","upload_timeout_secs":0}"#).unwrap();

        let config = load_or_default(Some(&path)).unwrap();
        assert_eq!(config.device_url, "http://10.1.1.1/");
        assert_eq!(config.upload_timeout(), None);
        assert_eq!(config.status_path, "info.json");
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(load_or_default(Some(&path)).unwrap(), ConsoleConfig::default());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.json");
        let config = ConsoleConfig {
            device_url: "http://clock.local/".to_string(),
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(load_or_default(Some(&path)).unwrap(), config);
    }
}
