use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::console::ReconnectPolicy;

// Endpoint
pub const LOG_ENDPOINT_PATH: &str = "/ws/logs";

// DOM element ids
pub const LOG_OUTPUT_ID: &str = "log-output";
pub const CMD_FORM_ID: &str = "cmd-form";
pub const CMD_INPUT_ID: &str = "cmd-input";

// Reconnect
pub const RECONNECT_DELAY_MS: u64 = 3000;
pub const BACKOFF_MAX_MS: u64 = 30_000; // only used with ?backoff=exp
pub const BACKOFF_FACTOR: f64 = 2.0;

// Output
pub const HISTORY_CAPACITY: usize = 5000;
pub const MAX_HISTORY_CAPACITY: usize = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for `{key}`: {value}")]
    InvalidValue { key: String, value: String },
    #[error("malformed page query: {0}")]
    Query(String),
}

/// Page query parameters that override defaults. Values arrive
/// percent-decoded.
#[derive(Deserialize, Debug, Default)]
struct QueryOverrides {
    history: Option<String>,
    backoff: Option<String>,
}

/// Runtime settings for the console page.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsoleConfig {
    pub endpoint_path: String,
    pub reconnect: ReconnectPolicy,
    pub history_capacity: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            endpoint_path: LOG_ENDPOINT_PATH.to_string(),
            reconnect: ReconnectPolicy::Fixed(Duration::from_millis(RECONNECT_DELAY_MS)),
            history_capacity: HISTORY_CAPACITY,
        }
    }
}

impl ConsoleConfig {
    /// Apply overrides from a page query string such as
    /// `?history=200&backoff=exp`. Unknown keys are ignored.
    pub fn with_query(mut self, query: &str) -> Result<Self, ConfigError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let overrides: QueryOverrides =
            serde_urlencoded::from_str(query).map_err(|e| ConfigError::Query(e.to_string()))?;

        if let Some(value) = overrides.history {
            self.history_capacity = value
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_HISTORY_CAPACITY).contains(n))
                .ok_or_else(|| invalid("history", &value))?;
        }
        if let Some(value) = overrides.backoff {
            self.reconnect = match value.as_str() {
                "fixed" => ReconnectPolicy::Fixed(Duration::from_millis(RECONNECT_DELAY_MS)),
                "exp" | "exponential" => ReconnectPolicy::Exponential {
                    initial: Duration::from_millis(RECONNECT_DELAY_MS),
                    max: Duration::from_millis(BACKOFF_MAX_MS),
                    factor: BACKOFF_FACTOR,
                },
                _ => return Err(invalid("backoff", &value)),
            };
        }
        Ok(self)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
