use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::commands::executor::DEFAULT_OUTPUT_LIMIT;
use crate::commands::timeout::TimeoutStrategy;
use crate::media::FlagVocabulary;

/// Environment variable overriding the configured executable path
pub const EXECUTABLE_ENV: &str = "MEDIA_BRIDGE_EXECUTABLE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the media-control executable
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    #[serde(default)]
    pub flags: FlagVocabulary,
    #[serde(default = "TimeoutStrategy::status_default")]
    pub status_timeout: TimeoutStrategy,
    #[serde(default = "TimeoutStrategy::action_default")]
    pub action_timeout: TimeoutStrategy,
    /// Largest status payload accepted, in bytes
    #[serde(default = "default_max_status_bytes")]
    pub max_status_bytes: u64,
    /// Wait for action children to exit and report failures instead of acknowledging on spawn
    #[serde(default)]
    pub await_action_exit: bool,
    #[serde(default = "default_bind")]
    pub bind: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_executable() -> PathBuf {
    PathBuf::from("media-control")
}
fn default_max_status_bytes() -> u64 {
    DEFAULT_OUTPUT_LIMIT
}
fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}
fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            flags: FlagVocabulary::default(),
            status_timeout: TimeoutStrategy::status_default(),
            action_timeout: TimeoutStrategy::action_default(),
            max_status_bytes: default_max_status_bytes(),
            await_action_exit: false,
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).context("reading config file")?;
        let cfg: Config = serde_json::from_str(&raw).context("parsing JSON")?;
        Ok(cfg)
    }

    /// Load from `path` if given, otherwise use defaults, then apply environment overrides
    pub fn load(path: Option<&str>) -> Result<Self> {
        let cfg = match path {
            Some(p) => Self::from_file(p).with_context(|| format!("loading config from {p}"))?,
            None => Self::default(),
        };
        Ok(cfg.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(exe) = lookup(EXECUTABLE_ENV).filter(|s| !s.trim().is_empty()) {
            self.executable = PathBuf::from(exe);
        }
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
