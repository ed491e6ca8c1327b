//! Executor configuration
//!
//! Raw command-line values are validated here into an [`ExecutorConfig`]
//! before any remote call is made. Durations are the unit-suffixed strings
//! workflow templates already pass (`5m`, `1h30m`, `250ms`).

use std::time::Duration;

use crate::controller::ActionKind;
use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT: &str = "5m";
pub const DEFAULT_INTERVAL: &str = "10s";

/// Validated executor inputs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub action: ActionKind,
    pub timeout: Duration,
    pub interval: Duration,
    /// Base64-encoded payload, guaranteed non-empty
    pub data: String,
}

impl ExecutorConfig {
    pub fn new(action: &str, timeout: &str, interval: &str, data: &str) -> Result<Self> {
        let action: ActionKind = action.parse()?;
        let timeout = parse_positive(timeout, "timeout")?;
        let interval = parse_positive(interval, "interval")?;

        if data.trim().is_empty() {
            return Err(Error::ConfigError(
                "Data string to the executor cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            action,
            timeout,
            interval,
            data: data.trim().to_string(),
        })
    }
}

fn parse_positive(value: &str, flag: &str) -> Result<Duration> {
    let duration = parse_duration(value).map_err(|e| {
        Error::ConfigError(format!("Failed to parse {flag} as a duration: {e}"))
    })?;
    if duration.is_zero() {
        return Err(Error::ConfigError(format!("{flag} must be greater than zero")));
    }
    Ok(duration)
}

/// Parse a duration such as `300ms`, `10s` or `2h45m`
///
/// Go's bare `0` is accepted. Fractional values like `1.5h` are not.
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    let s = input.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.contains('.') {
        return Err(format!("fractional duration {input:?} is not supported"));
    }
    humantime::parse_duration(s).map_err(|e| format!("invalid duration {input:?}: {e}"))
}
