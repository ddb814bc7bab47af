//! Configuration types and validation for the bot and the normalizer
//! Author: kartik4091

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_AUTHOR: &str = "Adobe User";
pub const DEFAULT_CREATOR: &str = "Adobe Acrobat Pro";
pub const DEFAULT_PRODUCER: &str = "Adobe PDF Library";
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Metadata values written into every processed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataTarget {
    pub author: String,
    pub creator: String,
    pub producer: String,
}

impl MetadataTarget {
    pub fn new(
        author: impl Into<String>,
        creator: impl Into<String>,
        producer: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            creator: creator.into(),
            producer: producer.into(),
        }
    }

    /// Replace any field for which `lookup` has a value
    fn overlay<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(author) = lookup("NEW_AUTHOR") {
            self.author = author;
        }
        if let Some(creator) = lookup("NEW_CREATOR") {
            self.creator = creator;
        }
        if let Some(producer) = lookup("NEW_PRODUCER") {
            self.producer = producer;
        }
        self
    }
}

impl Default for MetadataTarget {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR, DEFAULT_CREATOR, DEFAULT_PRODUCER)
    }
}

/// Process-wide settings, read once at startup
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub token: String,
    pub target: MetadataTarget,
    pub api_base_url: String,
    pub poll_timeout_secs: u64,
    pub process_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            target: MetadataTarget::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_timeout_secs: 30,
            process_timeout_secs: 120,
        }
    }
}

// The token never reaches the logs
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &if self.token.is_empty() { "<unset>" } else { "<redacted>" })
            .field("target", &self.target)
            .field("api_base_url", &self.api_base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("process_timeout_secs", &self.process_timeout_secs)
            .finish()
    }
}

impl BotConfig {
    /// Build the configuration from an optional JSON/YAML file and the process environment.
    ///
    /// Precedence is defaults, then file, then environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let contents = match config_file {
            Some(path) => Some(fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?),
            None => None,
        };
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Same as [`BotConfig::load`] with explicit sources
    pub fn from_sources<F>(file_contents: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match file_contents {
            Some(contents) => parse_config_file(contents)?,
            None => BotConfig::default(),
        };

        let mut config = BotConfig {
            target: base.target.clone().overlay(&lookup),
            ..base
        };

        if let Some(token) = lookup("BOT_TOKEN") {
            config.token = token;
        }
        if let Some(url) = lookup("BOT_API_URL") {
            config.api_base_url = url;
        }
        if let Some(secs) = lookup("POLL_TIMEOUT_SECS") {
            config.poll_timeout_secs = parse_secs("POLL_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("PROCESS_TIMEOUT_SECS") {
            config.process_timeout_secs = parse_secs("PROCESS_TIMEOUT_SECS", &secs)?;
        }

        Ok(config)
    }

    /// Checks required for running the bot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::Missing("BOT_TOKEN"));
        }
        if self.process_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "process_timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "api_base_url",
                reason: format!("not an http(s) URL: {}", self.api_base_url),
            });
        }
        Ok(())
    }

    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }
}

fn parse_config_file(contents: &str) -> Result<BotConfig, ConfigError> {
    // Try JSON first, then YAML
    serde_json::from_str(contents)
        .or_else(|_| serde_yaml::from_str(contents))
        .map_err(|e| ConfigError::Parse(e.to_string()))
}

fn parse_secs(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        reason: format!("expected a number of seconds, got {:?}", value),
    })
}
