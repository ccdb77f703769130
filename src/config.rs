use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::transports::TransportKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("unknown transport type: {0}")]
    InvalidTransportType(String),
}

/// Application configuration: process settings from the environment, the
/// wiki list from a TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    pub poll_interval: Duration,
    pub wikis: Vec<WikiConfig>,
}

/// One wiki to watch and where to deliver its activity.
#[derive(Debug, Clone, Deserialize)]
pub struct WikiConfig {
    /// Platform identifier of the wiki.
    pub id: u64,
    /// Base address, e.g. `https://some-community.fandom.com`.
    pub url: String,
    #[serde(default)]
    pub transports: Vec<TransportConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

impl TransportConfig {
    /// The validated transport kind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTransportType`] for an unrecognized
    /// kind string.
    pub fn parsed_kind(&self) -> Result<TransportKind, ConfigError> {
        self.kind
            .parse()
            .map_err(ConfigError::InvalidTransportType)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    wikis: Vec<WikiConfig>,
}

impl Config {
    /// Load configuration from environment variables and the wiki list file.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables or the file are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = PathBuf::from(env_or_default("CONFIG_PATH", "./wikis.toml"));
        Self::load_from(&path)
    }

    /// Load configuration with the wiki list read from `path`.
    ///
    /// # Errors
    ///
    /// As [`Self::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&raw)?;

        Ok(Self {
            poll_interval: Duration::from_secs(parse_env_u64("POLL_INTERVAL_SECS", 60)?),
            wikis: file.wikis,
        })
    }

    /// Validate that the configuration is usable. Transport kinds are
    /// checked here, at load time, never at dispatch time.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "POLL_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.wikis.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "wikis".to_string(),
                message: "at least one wiki must be configured".to_string(),
            });
        }
        for wiki in &self.wikis {
            if wiki.url.is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: format!("wikis[{}].url", wiki.id),
                    message: "cannot be empty".to_string(),
                });
            }
            for transport in &wiki.transports {
                transport.parsed_kind()?;
                if transport.url.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        name: format!("wikis[{}].transports.url", wiki.id),
                        message: "cannot be empty".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
