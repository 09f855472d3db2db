use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const LOG_ENDPOINT_PATH: &str = "/ws/logs";

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOG_FILE: &str = "/var/log/syslog";
const DEFAULT_DIST_DIR: &str = "dist";
const DEFAULT_POLL_MS: u64 = 100;

/// Server settings, read from `DEVCONSOLE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub log_file: PathBuf,
    pub dist_dir: PathBuf,
    pub poll_interval: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let addr = get("DEVCONSOLE_ADDR", DEFAULT_ADDR);
        let addr = addr
            .parse()
            .with_context(|| format!("DEVCONSOLE_ADDR is not a socket address: {addr}"))?;

        let poll_ms = get("DEVCONSOLE_POLL_MS", &DEFAULT_POLL_MS.to_string());
        let poll_ms: u64 = poll_ms
            .parse()
            .with_context(|| format!("DEVCONSOLE_POLL_MS is not a number: {poll_ms}"))?;
        if poll_ms == 0 {
            anyhow::bail!("DEVCONSOLE_POLL_MS must be greater than zero");
        }

        Ok(Self {
            addr,
            log_file: PathBuf::from(get("DEVCONSOLE_LOG_FILE", DEFAULT_LOG_FILE)),
            dist_dir: PathBuf::from(get("DEVCONSOLE_DIST_DIR", DEFAULT_DIST_DIR)),
            poll_interval: Duration::from_millis(poll_ms),
        })
    }
}
