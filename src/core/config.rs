use crate::core::dashboard::FetchPolicy;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub metrics_path: String,
    pub status_path: String,
    /// Per-request transport timeout. No timeout when unset.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
            metrics_path: "/api/metrics".to_string(),
            status_path: "/api/status".to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub retries: u32,
    pub delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let policy = FetchPolicy::default();
        FetchConfig {
            retries: policy.retries,
            delay_ms: policy.delay_ms,
        }
    }
}

impl From<&FetchConfig> for FetchPolicy {
    fn from(config: &FetchConfig) -> Self {
        FetchPolicy {
            retries: config.retries,
            delay_ms: config.delay_ms,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Currencies shown inline before collapsing the rest into `+N`.
    pub exposure_preview: usize,
    /// Seconds between automatic refreshes in watch mode.
    pub refresh_interval_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            exposure_preview: 2,
            refresh_interval_secs: 300,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Loads the config from the default location, or falls back to built-in
    /// defaults when no file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "riskboard", "riskboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy::from(&self.fetch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
server:
  base_url: "http://risk.internal:9000"
  request_timeout_secs: 30
fetch:
  retries: 3
  delay_ms: 250
display:
  exposure_preview: 3
  refresh_interval_secs: 60
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.base_url, "http://risk.internal:9000");
        assert_eq!(config.server.metrics_path, "/api/metrics");
        assert_eq!(config.server.status_path, "/api/status");
        assert_eq!(config.server.request_timeout_secs, Some(30));
        assert_eq!(
            config.fetch_policy(),
            FetchPolicy {
                retries: 3,
                delay_ms: 250
            }
        );
        assert_eq!(config.display.exposure_preview, 3);
        assert_eq!(config.display.refresh_interval_secs, 60);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml_str = r#"
fetch:
  retries: 8
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.fetch.retries, 8);
        assert_eq!(config.fetch.delay_ms, 1000);
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_load_from_path_reports_bad_yaml() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "fetch: [not, a, map]").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
