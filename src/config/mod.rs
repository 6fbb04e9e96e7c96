use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_yml;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Evse, Meter};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CC_CONFIG";

const CONFIG_PATHS: [&str; 2] = ["config/chargecheck.yaml", "chargecheck.yaml"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read the config on {0}")]
    NotFound(String),
    #[error("Unable to read config file {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("Unable to parse config file: {0}")]
    Parse(#[from] serde_yml::Error),
}

fn httpd_enabled_default() -> bool { return true }
fn httpd_port_default() -> u16 { return 8240 }

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct HttpdConfig {
    #[serde(default="httpd_enabled_default")]
    pub enabled: bool,
    #[serde(default="httpd_port_default")]
    pub port: u16
}

fn httpd_default() -> HttpdConfig { return HttpdConfig { enabled: httpd_enabled_default(), port: httpd_port_default() } }
fn meters_default() -> Vec<Meter> { return Vec::new(); }
fn evses_default() -> Vec<Evse> { return Vec::new(); }

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    #[serde(default="httpd_default")]
    pub httpd: HttpdConfig,
    #[serde(default="meters_default")]
    pub meters: Vec<Meter>,
    #[serde(default="evses_default")]
    pub evses: Vec<Evse>,
}

impl Default for Config {
    fn default() -> Self {
        return Config {
            httpd: httpd_default(),
            meters: meters_default(),
            evses: evses_default(),
        };
    }
}

pub struct ConfigHolder {
    pub config: Config,
    /// File the config was read from, `None` for in memory configs
    pub path: Option<PathBuf>,
}

impl ConfigHolder {
    /// Load from `CC_CONFIG` or the first of the default locations that exists
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from(path);
        }

        for path in CONFIG_PATHS {
            if Path::new(path).exists() {
                return Self::load_from(path);
            }
        }
        Err(ConfigError::NotFound(CONFIG_PATHS.join(" or ")))
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        let mut holder = Self::from_str(&contents)?;
        info!("Config loaded from {} ({} meters, {} EVSEs)", path.display(), holder.config.meters.len(), holder.config.evses.len());
        holder.path = Some(path.to_path_buf());
        return Ok(holder);
    }

    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yml::from_str(contents)?;
        debug!("Config parsed, HTTP {} on port {}", if config.httpd.enabled { "enabled" } else { "disabled" }, config.httpd.port);
        return Ok(ConfigHolder { config, path: None });
    }

    pub fn get_complete_config(&self) -> Config {
        return self.config.clone();
    }
}
