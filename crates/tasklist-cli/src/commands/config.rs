//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use tasklist_core::Config;

use crate::output::{Output, OutputFormat};

/// Load from the CLI-specified path, or the default location
pub fn load(config_path: Option<&PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config = load(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "api_url": config.api_url,
                    "storage_backend": config.storage_backend.to_string(),
                    "owner_id": config.owner_id,
                    "fetch_limit": config.fetch_limit,
                    "request_timeout_secs": config.request_timeout_secs,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  api_url:              {}", config.api_url);
            println!("  storage_backend:      {}", config.storage_backend);
            println!("  owner_id:             {}", config.owner_id);
            println!(
                "  fetch_limit:          {}",
                config
                    .fetch_limit
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "(server default)".to_string())
            );
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config = load(config_path).context("Failed to load configuration")?;
    apply(&mut config, &key, &value)?;

    match config_path {
        Some(path) => config.save_to_path(path),
        None => config.save(),
    }
    .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "api_url" => {
            if value.is_empty() {
                bail!("api_url cannot be empty");
            }
            config.api_url = value.to_string();
        }
        "storage_backend" => {
            config.storage_backend = value.parse()?;
        }
        "owner_id" => {
            config.owner_id = value
                .parse()
                .context("Invalid value for owner_id. Use an integer.")?;
        }
        "fetch_limit" => {
            config.fetch_limit = if value.is_empty() || value == "none" {
                None
            } else {
                Some(
                    value
                        .parse()
                        .context("Invalid value for fetch_limit. Use a positive integer or 'none'.")?,
                )
            };
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = value
                .parse()
                .context("Invalid value for request_timeout_secs. Use a number of seconds.")?;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, api_url, storage_backend, owner_id, fetch_limit, request_timeout_secs",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_core::StorageBackend;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "api_url", "http://localhost:9000/todos").unwrap();
        apply(&mut config, "storage_backend", "file").unwrap();
        apply(&mut config, "owner_id", "12").unwrap();
        apply(&mut config, "fetch_limit", "25").unwrap();

        assert_eq!(config.api_url, "http://localhost:9000/todos");
        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.owner_id, 12);
        assert_eq!(config.fetch_limit, Some(25));

        apply(&mut config, "fetch_limit", "none").unwrap();
        assert!(config.fetch_limit.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply(&mut config, "owner_id", "abc").is_err());
        assert!(apply(&mut config, "api_url", "").is_err());
        assert!(apply(&mut config, "storage_backend", "redis").is_err());
        assert!(apply(&mut config, "favorite_color", "blue").is_err());
    }

    #[test]
    fn test_set_writes_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            format!("data_dir = {:?}\n", temp.path().join("data").display().to_string()),
        )
        .unwrap();
        let output = Output::new(OutputFormat::Quiet);

        set("owner_id".to_string(), "42".to_string(), Some(&path), &output).unwrap();
        set("storage_backend".to_string(), "file".to_string(), Some(&path), &output).unwrap();

        let reloaded = load(Some(&path)).unwrap();
        assert_eq!(reloaded.owner_id, 42);
        assert_eq!(reloaded.storage_backend, StorageBackend::File);
        assert_eq!(reloaded.data_dir, temp.path().join("data"));
    }
}
