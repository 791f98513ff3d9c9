use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const BASE_URL_ENV: &str = "CONTACT_WIDGET_BASE_URL";
const CSRF_TOKEN_ENV: &str = "CONTACT_WIDGET_CSRF_TOKEN";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub csrf_token: Option<String>,
    pub timeout_secs: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            csrf_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_file: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Environment variables win over the config file.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            self.base_url = url;
        }
        if let Ok(token) = std::env::var(CSRF_TOKEN_ENV) {
            self.csrf_token = Some(token);
        }
    }

    /// Command-line flags win over everything else.
    pub fn apply_overrides(
        &mut self,
        base_url: Option<String>,
        csrf_token: Option<String>,
        timeout_secs: Option<u64>,
    ) {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(token) = csrf_token {
            self.csrf_token = Some(token);
        }
        if let Some(secs) = timeout_secs {
            self.timeout_secs = secs;
        }
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }

        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

        Ok(cache_dir.join("contact-widget").join("contact-widget.log"))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("contact-widget").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.base_url = "https://yordam.example".to_string();
        config.csrf_token = Some("secret".to_string());
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "base_url": "http://10.0.0.2:8000" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.csrf_token.is_none());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::new();
        config.apply_overrides(Some("http://cli".to_string()), None, Some(3));
        assert_eq!(config.base_url, "http://cli");
        assert!(config.csrf_token.is_none());
        assert_eq!(config.timeout_secs, 3);
    }

    // The only test that touches these variables, so it cannot race another.
    #[test]
    fn test_env_beats_file_and_cli_beats_env() {
        let mut config = Config::new();
        config.base_url = "http://from-file".to_string();
        config.csrf_token = Some("file-token".to_string());

        std::env::set_var(BASE_URL_ENV, "http://from-env");
        std::env::set_var(CSRF_TOKEN_ENV, "env-token");
        config.apply_env();
        std::env::remove_var(BASE_URL_ENV);
        std::env::remove_var(CSRF_TOKEN_ENV);

        assert_eq!(config.base_url, "http://from-env");
        assert_eq!(config.csrf_token.as_deref(), Some("env-token"));

        config.apply_overrides(Some("http://from-cli".to_string()), None, None);
        assert_eq!(config.base_url, "http://from-cli");
        assert_eq!(config.csrf_token.as_deref(), Some("env-token"));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_explicit_log_path() {
        let mut config = Config::new();
        config.log_file = Some(PathBuf::from("/tmp/widget.log"));
        assert_eq!(config.log_path().unwrap(), PathBuf::from("/tmp/widget.log"));
    }
}
