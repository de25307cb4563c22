use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub meowifi: PortalConfig,
    pub chromedriver: BrowserConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub ssid: String,
    pub device: String,
    pub retry: RetryConfig,
    /// Network manager executable, `nmcli` unless overridden.
    #[serde(default = "default_tool")]
    pub tool: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub attempts: u32,
    /// Seconds to wait after each connect attempt.
    pub interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_settle")]
    pub settle: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    pub path: PathBuf,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_url")]
    pub url: String,
    #[serde(default = "default_probe_timeout")]
    pub timeout: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: default_probe_url(),
            timeout: default_probe_timeout(),
        }
    }
}

fn default_tool() -> String {
    "nmcli".to_string()
}

fn default_settle() -> u64 {
    10
}

fn default_headless() -> bool {
    true
}

fn default_probe_url() -> String {
    "http://www.google.com".to_string()
}

fn default_probe_timeout() -> u64 {
    5
}

impl RetryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

impl PortalConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle)
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("network.ssid", &self.network.ssid)?;
        require_non_empty("network.device", &self.network.device)?;
        require_non_empty("network.tool", &self.network.tool)?;
        require_non_empty("meowifi.username", &self.meowifi.username)?;
        require_url("meowifi.url", &self.meowifi.url)?;
        require_url("probe.url", &self.probe.url)?;

        if self.chromedriver.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "chromedriver.path",
                reason: "must not be empty".to_string(),
            });
        }

        if self.probe.timeout == 0 {
            return Err(ConfigError::Invalid {
                key: "probe.timeout",
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(())
    }
}

fn require_non_empty(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            key,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn require_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid {
            key,
            reason: format!("not a valid URL: {e}"),
        })
}
