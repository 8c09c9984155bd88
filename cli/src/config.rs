//! `mailcraft.toml` loading.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use mailcraft::{ExportOptions, ImportOptions};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "mailcraft.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub export: ExportOptions,
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeliveryConfig {
    /// `From` header of every outgoing message.
    pub from: String,
    /// Directory the outbox transport writes messages to.
    pub outbox: PathBuf,
    /// Relay to send through. Without one, messages go to the outbox.
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Upgrade the connection with STARTTLS; plain text when off.
    #[serde(default = "default_starttls")]
    pub starttls: bool,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_starttls() -> bool {
    true
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        DeliveryConfig {
            from: "Newsletter <newsletter@localhost>".to_string(),
            outbox: PathBuf::from("outbox"),
            smtp: None,
        }
    }
}

impl Config {
    pub fn parse(source: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, else `mailcraft.toml` in `dir` when it
    /// exists, else the defaults. An explicit path must exist.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Config, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    debug!("no {} in {}, using defaults", DEFAULT_CONFIG_FILE, dir.display());
                    return Ok(Config::default());
                }
                candidate
            }
        };

        let source = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        debug!("loaded config from {}", path.display());
        Config::parse(&source, &path)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions::from(&self.export)
    }
}
