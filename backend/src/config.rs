//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! environment variables. The YAML file is read from `EXPENSE_TRACKER_CONFIG`
//! when set, otherwise from `config.yaml` inside the data directory.
//!
//! ```yaml
//! data_dir: /srv/expenses
//! port: 5056
//! api_key: change-me
//! app_password: change-me
//! lock_timeout_ms: 10000
//! cors_origin: http://localhost:8080
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::storage::CsvConnection;

pub const CONFIG_PATH_ENV: &str = "EXPENSE_TRACKER_CONFIG";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Shared secret for the sheet action surface
    pub api_key: String,
    /// Password for the REST login
    pub app_password: String,
    pub lock_timeout_ms: u64,
    /// Allowed browser origin; any origin when unset
    pub cors_origin: Option<String>,
    /// Directory of static client assets served at `/`
    pub static_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: CsvConnection::default_directory(),
            host: "127.0.0.1".to_string(),
            port: 5056,
            api_key: String::new(),
            app_password: String::new(),
            lock_timeout_ms: 10_000,
            cors_origin: None,
            static_dir: None,
        }
    }
}

impl AppConfig {
    /// Defaults, then the YAML file if present, then the process environment
    pub fn load() -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(&env)
    }

    /// Same as [`AppConfig::load`] with an explicit environment, for tests
    pub fn load_from(env: &HashMap<String, String>) -> Result<Self> {
        let data_dir_hint = env
            .get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(CsvConnection::default_directory);
        let config_path = env
            .get(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir_hint.join(CONFIG_FILE_NAME));

        let mut config = if config_path.exists() {
            info!("Loading configuration from {}", config_path.display());
            Self::from_yaml_file(&config_path)?
        } else {
            Self::default()
        };
        config.apply_env(env)?;

        if config.api_key.is_empty() {
            warn!("API_KEY is not set; every sheet request will be rejected");
        }
        if config.app_password.is_empty() {
            warn!("APP_PASSWORD is not set; REST login is disabled");
        }
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<()> {
        if let Some(dir) = env.get("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(host) = env.get("HOST") {
            self.host = host.clone();
        }
        if let Some(port) = env.get("PORT") {
            self.port = port.parse().with_context(|| format!("PORT is not a port number: {}", port))?;
        }
        if let Some(key) = env.get("API_KEY") {
            self.api_key = key.clone();
        }
        if let Some(password) = env.get("APP_PASSWORD") {
            self.app_password = password.clone();
        }
        if let Some(timeout) = env.get("LOCK_TIMEOUT_MS") {
            self.lock_timeout_ms = timeout
                .parse()
                .with_context(|| format!("LOCK_TIMEOUT_MS is not a number: {}", timeout))?;
        }
        if let Some(origin) = env.get("CORS_ORIGIN") {
            self.cors_origin = Some(origin.clone());
        }
        if let Some(dir) = env.get("STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn environment_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().to_string_lossy().to_string();
        let config = AppConfig::load_from(&env(&[
            ("DATA_DIR", data_dir.as_str()),
            ("PORT", "8081"),
            ("API_KEY", "k"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, temp_dir.path());
        assert_eq!(config.port, 8081);
        assert_eq!(config.api_key, "k");
        assert_eq!(config.lock_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn yaml_file_in_data_dir_is_read_then_env_wins() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "port: 9000\napi_key: from-file\napp_password: pw\n",
        )
        .unwrap();
        let data_dir = temp_dir.path().to_string_lossy().to_string();

        let config = AppConfig::load_from(&env(&[("DATA_DIR", data_dir.as_str()), ("API_KEY", "from-env")])).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.app_password, "pw");
        assert_eq!(config.api_key, "from-env");
    }

    #[test]
    fn bad_port_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().to_string_lossy().to_string();
        assert!(AppConfig::load_from(&env(&[("DATA_DIR", data_dir.as_str()), ("PORT", "web")])).is_err());
    }
}
