//! Configuration loader for Parlor.
//!
//! Reads `config.toml` from the data directory (`~/.parlor/` by default)
//! and deserializes it into [`AppConfig`]. A missing file means defaults;
//! an unreadable or malformed one is reported to the caller, which falls
//! back to defaults once logging is up.

use std::path::{Path, PathBuf};

use thiserror::Error;

use parlor_types::config::AppConfig;

/// Environment variable overriding `model.base_url`.
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to read or parse, returns the error.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path,
                source,
            });
        }
    };

    toml::from_str::<AppConfig>(&content).map_err(|source| ConfigError::Parse {
        path: config_path,
        source,
    })
}

/// Load the config, falling back to defaults on a bad file. The error is
/// handed back so it can be logged after tracing is installed.
pub async fn load_config_or_default(data_dir: &Path) -> (AppConfig, Option<ConfigError>) {
    match load_config(data_dir).await {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

/// Apply environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(host) = std::env::var(OLLAMA_HOST_ENV) {
        if let Some(url) = normalize_host(&host) {
            config.model.base_url = url;
        }
    }
}

/// Turn an `OLLAMA_HOST` value into a base URL. A bare `host:port` gets
/// an `http://` scheme; a trailing slash is dropped.
pub fn normalize_host(host: &str) -> Option<String> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return None;
    }
    if host.starts_with("http://") || host.starts_with("https://") {
        Some(host.to_string())
    } else {
        Some(format!("http://{host}"))
    }
}
