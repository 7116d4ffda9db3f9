//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/tasklist/config.toml)
//! 3. Environment variables (TASKLIST_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_OWNER_ID;

/// Environment variable prefix
const ENV_PREFIX: &str = "TASKLIST";

/// Remote collection endpoint of the demo API
pub const DEFAULT_API_URL: &str = "https://dummyjson.com/todos";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Which key-value backend holds the persisted state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    File,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "file" => Ok(StorageBackend::File),
            other => bail!("Unknown storage backend '{}'. Use 'sqlite' or 'file'.", other),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => f.write_str("sqlite"),
            StorageBackend::File => f.write_str("file"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory for local state storage
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Remote todos collection endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Backend for the persisted state blob
    #[serde(default)]
    pub storage_backend: StorageBackend,

    /// Owner id sent when creating todos
    #[serde(default = "default_owner_id")]
    pub owner_id: i64,

    /// Page size for full fetches (server default when unset)
    #[serde(default)]
    pub fetch_limit: Option<u32>,

    /// Per-request timeout for remote calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_url: default_api_url(),
            storage_backend: StorageBackend::default(),
            owner_id: DEFAULT_OWNER_ID,
            fetch_limit: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (TASKLIST_DATA_DIR, TASKLIST_API_URL, ...)
    /// 2. Config file (~/.config/tasklist/config.toml or TASKLIST_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_STORAGE_BACKEND", ENV_PREFIX)) {
            self.storage_backend = val.parse()?;
        }

        if let Ok(val) = std::env::var(format!("{}_OWNER_ID", ENV_PREFIX)) {
            self.owner_id = val
                .parse()
                .with_context(|| format!("Invalid {}_OWNER_ID: {}", ENV_PREFIX, val))?;
        }

        // Empty string clears the limit
        if let Ok(val) = std::env::var(format!("{}_FETCH_LIMIT", ENV_PREFIX)) {
            self.fetch_limit = if val.is_empty() {
                None
            } else {
                Some(
                    val.parse()
                        .with_context(|| format!("Invalid {}_FETCH_LIMIT: {}", ENV_PREFIX, val))?,
                )
            };
        }

        if let Ok(val) = std::env::var(format!("{}_REQUEST_TIMEOUT_SECS", ENV_PREFIX)) {
            self.request_timeout_secs = val.parse().with_context(|| {
                format!("Invalid {}_REQUEST_TIMEOUT_SECS: {}", ENV_PREFIX, val)
            })?;
        }

        Ok(())
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with TASKLIST_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tasklist")
            .join("config.toml")
    }

    /// Path to the SQLite key-value database
    pub fn state_db_path(&self) -> PathBuf {
        self.data_dir.join("tasklist.db")
    }

    /// Directory holding one file per key for the file backend
    pub fn state_file_path(&self) -> PathBuf {
        self.data_dir.join("state")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasklist")
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_owner_id() -> i64 {
    DEFAULT_OWNER_ID
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "TASKLIST_DATA_DIR",
        "TASKLIST_API_URL",
        "TASKLIST_STORAGE_BACKEND",
        "TASKLIST_OWNER_ID",
        "TASKLIST_FETCH_LIMIT",
        "TASKLIST_REQUEST_TIMEOUT_SECS",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://dummyjson.com/todos");
        assert_eq!(config.storage_backend, StorageBackend::Sqlite);
        assert_eq!(config.owner_id, 1);
        assert!(config.fetch_limit.is_none());
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.data_dir.ends_with("tasklist"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.state_db_path().ends_with("tasklist.db"));
        assert!(config.state_file_path().ends_with("state"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TASKLIST_DATA_DIR", "/tmp/tasklist-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/tasklist-test"));
    }

    #[test]
    fn test_env_override_backend_and_limit() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TASKLIST_STORAGE_BACKEND", "FILE");
        env::set_var("TASKLIST_FETCH_LIMIT", "20");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.fetch_limit, Some(20));

        // Empty string clears it
        env::set_var("TASKLIST_FETCH_LIMIT", "");
        config.apply_env_overrides().unwrap();
        assert!(config.fetch_limit.is_none());
    }

    #[test]
    fn test_env_override_rejects_bad_values() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TASKLIST_OWNER_ID", "not-a-number");
        assert!(config.apply_env_overrides().is_err());

        env::remove_var("TASKLIST_OWNER_ID");
        env::set_var("TASKLIST_STORAGE_BACKEND", "redis");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/tasklist"),
            api_url: "http://localhost:8080/todos".to_string(),
            storage_backend: StorageBackend::File,
            owner_id: 7,
            fetch_limit: Some(50),
            request_timeout_secs: 3,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("api_url"));
        assert!(toml_str.contains("storage_backend = \"file\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            api_url = "http://example.com/todos"
            fetch_limit = 10
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.api_url, "http://example.com/todos");
        assert_eq!(config.fetch_limit, Some(10));
        // Unspecified keys fall back to defaults
        assert_eq!(config.owner_id, 1);
        assert_eq!(config.storage_backend, StorageBackend::Sqlite);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("TASKLIST_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            fetch_limit: Some(5),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_writes_default_config_file() {
        let _guard = EnvGuard::new(&["TASKLIST_CONFIG", "TASKLIST_DATA_DIR"]);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("tasklist").join("config.toml");
        env::set_var("TASKLIST_CONFIG", &path);

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            owner_id: 3,
            ..Config::default()
        };
        config.save().unwrap();

        assert!(path.exists());
        assert_eq!(Config::load().unwrap(), config);
    }
}
