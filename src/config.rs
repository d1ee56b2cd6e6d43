//! Server configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PHASE_DURATION_MS: u64 = 8000;
pub const DEFAULT_CLIENT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub phase_duration: Duration,
    pub client_queue: usize,
}

impl Config {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `PHASE_DURATION_MS`: default 8000; apparatus period is three phases
    /// - `CLIENT_QUEUE_CAPACITY`: per-client outbound frame queue, default 256
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but unparsable or zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but unparsable or zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let phase_ms = parse_var(&lookup, "PHASE_DURATION_MS", DEFAULT_PHASE_DURATION_MS)?;
        if phase_ms == 0 {
            return Err(ConfigError::Zero { var: "PHASE_DURATION_MS" });
        }
        let client_queue = parse_var(&lookup, "CLIENT_QUEUE_CAPACITY", DEFAULT_CLIENT_QUEUE_CAPACITY)?;
        if client_queue == 0 {
            return Err(ConfigError::Zero { var: "CLIENT_QUEUE_CAPACITY" });
        }

        Ok(Self { port, phase_duration: Duration::from_millis(phase_ms), client_queue })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            phase_duration: Duration::from_millis(DEFAULT_PHASE_DURATION_MS),
            client_queue: DEFAULT_CLIENT_QUEUE_CAPACITY,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { var, value: raw })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
