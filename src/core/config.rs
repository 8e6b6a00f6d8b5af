use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.flatastic-app.com/index.php/api";
pub const API_KEY_ENV: &str = "FLATASTIC_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Per-installation secret sent as `x-api-key`.
    #[serde(default)]
    pub api_key: String,
    /// Overrides the household currency reported by the API.
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_recent_count")]
    pub recent_count: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_recent_count() -> usize {
    5
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "flatastic", "flatastic")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// A non-empty key from the environment wins over the file.
    pub fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            debug!("Using API key from {API_KEY_ENV}");
            self.api_key = key;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("api_key is required (set it in the config file or via {API_KEY_ENV})");
        }
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api_key: "secret"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api_key, "secret");
        assert!(config.currency.is_none());
        assert_eq!(config.provider, ProviderConfig::default());
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.recent_count, 5);
        assert!(config.validate().is_ok());

        let yaml_str_with_provider = r#"
api_key: "secret"
currency: "CHF"
provider:
  base_url: "http://example.com/api"
poll_interval_secs: 60
        "#;
        let config: AppConfig = serde_yaml::from_str(yaml_str_with_provider).unwrap();
        assert_eq!(config.currency.as_deref(), Some("CHF"));
        assert_eq!(config.provider.base_url, "http://example.com/api");
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.poll_interval_secs, 60);
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let mut config: AppConfig = serde_yaml::from_str("currency: EUR").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api_key is required"));

        config.apply_api_key_override(Some("  ".to_string()));
        assert!(config.validate().is_err());

        config.apply_api_key_override(Some("from-env".to_string()));
        assert_eq!(config.api_key, "from-env");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_path() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(file.path(), "api_key: abc\npoll_interval_secs: 5\n")?;

        let config = AppConfig::load_from_path(file.path())?;
        assert!(!config.api_key.is_empty());
        assert_eq!(config.poll_interval_secs, 5);
        Ok(())
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/nonexistent/flatastic/config.yaml");
        assert!(result.is_err());
    }
}
