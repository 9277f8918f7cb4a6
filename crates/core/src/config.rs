use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::paths::{write_private, Paths};
use crate::types::Credentials;

pub const USERNAME_ENV: &str = "HOH_USERNAME";
pub const PASSWORD_ENV: &str = "HOH_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `None` follows HTTPS_PROXY/HTTP_PROXY, `Some("")` forces a direct
    /// connection, anything else is used as the proxy URL.
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub no_proxy: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            proxy: None,
            no_proxy: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenterConfig {
    #[serde(default = "default_true")]
    pub open_browser: bool,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self { open_browser: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub presenter: PresenterConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            network: NetworkConfig::default(),
            presenter: PresenterConfig::default(),
            history: HistoryConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        write_private(path, content.as_bytes())?;
        Ok(())
    }

    /// Static credentials from the config file, if both fields are set.
    pub fn credentials(&self) -> Option<Credentials> {
        let creds = Credentials::new(
            self.username.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        );
        creds.is_complete().then_some(creds)
    }

    /// Static credentials from `HOH_USERNAME` / `HOH_PASSWORD`.
    pub fn env_credentials() -> Option<Credentials> {
        let username = std::env::var(USERNAME_ENV).ok()?;
        let password = std::env::var(PASSWORD_ENV).ok()?;
        let creds = Credentials::new(username, password);
        creds.is_complete().then_some(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.network.timeout_secs, 30);
        assert!(config.presenter.open_browser);
        assert!(config.history.enabled);
        assert_eq!(config.log_level, "info");
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_camel_case_keys() {
        let config: Config = serde_json::from_str(
            r#"{"network":{"timeoutSecs":5,"noProxy":["localhost"]},"presenter":{"openBrowser":false}}"#,
        )
        .unwrap();
        assert_eq!(config.network.timeout_secs, 5);
        assert_eq!(config.network.no_proxy, vec!["localhost".to_string()]);
        assert!(!config.presenter.open_browser);
    }

    #[test]
    fn test_credentials_require_both_fields() {
        let mut config = Config::default();
        config.username = Some("alice".into());
        assert!(config.credentials().is_none());
        config.password = Some("secret".into());
        assert_eq!(
            config.credentials(),
            Some(Credentials::new("alice", "secret"))
        );
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base(temp_dir.path().join("nested"));
        let mut config = Config::default();
        config.network.proxy = Some(String::new());
        config.save(&paths.config_file()).unwrap();

        let loaded = Config::load_or_default(&paths).unwrap();
        assert_eq!(loaded.network.proxy.as_deref(), Some(""));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_config_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base(temp_dir.path().to_path_buf());
        let config = Config {
            username: Some("alice".into()),
            password: Some("secret".into()),
            ..Config::default()
        };
        config.save(&paths.config_file()).unwrap();

        let mode = std::fs::metadata(paths.config_file())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base(temp_dir.path().to_path_buf());
        let config = Config::load_or_default(&paths).unwrap();
        assert_eq!(config.log_level, "info");
    }
}
