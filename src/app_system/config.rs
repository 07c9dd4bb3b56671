use std::time::Duration;
use super::ConfigError;

pub const TIMEOUT_ENV: &str = "STOCK_REDUCER_TIMEOUT_SECS";
pub const STORE_BUFFER_ENV: &str = "STOCK_REDUCER_STORE_BUFFER";

/// Runtime settings for the stock reducer and its product store.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducerConfig {
    /// Deadline for one order, from opening the transaction to commit.
    pub timeout: Duration,
    /// Capacity of the product actor's request channel.
    pub store_buffer: usize,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            store_buffer: 32,
        }
    }
}

impl ReducerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(secs) = positive(&lookup, TIMEOUT_ENV)? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(buffer) = positive(&lookup, STORE_BUFFER_ENV)? {
            config.store_buffer = usize::try_from(buffer).map_err(|_| ConfigError::InvalidValue {
                key: STORE_BUFFER_ENV,
                value: buffer.to_string(),
            })?;
        }
        Ok(config)
    }
}

fn positive(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}
