use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::app::retention::{RemoveMode, RetentionPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("decoding {path} failed: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,

    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub shows: HashMap<String, ShowConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_hostname")]
    pub hostname: String,

    #[serde(default = "default_port", deserialize_with = "port_from_number_or_string")]
    pub port: u16,

    /// Path prefix SickBeard is served under, e.g. `/sickbeard`.
    #[serde(default)]
    pub web_root: String,

    pub api_key: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_retries")]
    pub retries: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub remove: RemoveMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowConfig {
    #[serde(default = "default_show_name")]
    pub name: String,

    #[serde(default)]
    pub remove: RemoveMode,

    pub keep_episodes: usize,
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> usize {
    3
}

fn default_show_name() -> String {
    "N/A Name".to_string()
}

// SickBeard's own settings store the port as a string, so accept both.
fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|_| serde::de::Error::custom(format!("invalid port `{raw}`"))),
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Decode {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The effective policy for a show, or `None` when the show has no entry.
    pub fn resolve_policy(&self, show_id: &str) -> Option<(&ShowConfig, RetentionPolicy)> {
        let show = self.shows.get(show_id)?;
        Some((
            show,
            RetentionPolicy {
                global: self.global.remove,
                show: show.remove,
                keep_episodes: show.keep_episodes,
            },
        ))
    }
}

impl ServerConfig {
    pub fn api_url(&self) -> String {
        format!(
            "http://{}:{}{}/api/{}/",
            self.hostname,
            self.port,
            self.web_root.trim_end_matches('/'),
            self.api_key
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
