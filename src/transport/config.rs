//! Server settings read from the environment.

use std::str::FromStr;
use std::time::Duration;

use crate::core::errors::{SimulationError, SimulationResult};
use crate::core::execution::config::{ConcurrencyMode, SimulationConfig};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_MAX_HEADER_BYTES: usize = 16 * 1024;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`SimulationServer`](super::http::SimulationServer)
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Request bodies above this size are refused with 413
    pub max_body_bytes: usize,
    /// Request line plus headers above this size are refused with 431
    pub max_header_bytes: usize,
    pub read_timeout: Duration,
    pub engine: SimulationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            read_timeout: DEFAULT_READ_TIMEOUT,
            engine: SimulationConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = address.into();
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    pub fn with_max_header_bytes(mut self, bytes: usize) -> Self {
        self.max_header_bytes = bytes;
        self
    }

    pub fn with_engine(mut self, engine: SimulationConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Read settings from the process environment.
    ///
    /// Recognized variables: `RANKSIM_ADDR`, `RANKSIM_THREADS`, `RANKSIM_SEED`,
    /// `RANKSIM_MAX_ATTEMPTS`, `RANKSIM_MAX_SIMULATIONS`, `RANKSIM_MAX_BODY_BYTES`
    /// and `RANKSIM_MAX_HEADER_BYTES`.
    pub fn from_env() -> SimulationResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> SimulationResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(address) = lookup("RANKSIM_ADDR") {
            config.bind_address = address;
        }

        if let Some(threads) = parse_var::<usize, _>(&lookup, "RANKSIM_THREADS")? {
            if threads == 0 {
                return Err(SimulationError::invalid(
                    "RANKSIM_THREADS must be greater than 0",
                ));
            }
            config.engine = config
                .engine
                .with_concurrency(ConcurrencyMode::Rayon)
                .with_thread_pool_size(threads);
        }

        if let Some(seed) = parse_var::<u64, _>(&lookup, "RANKSIM_SEED")? {
            config.engine = config.engine.with_seed(seed);
        }

        if let Some(attempts) = parse_var::<usize, _>(&lookup, "RANKSIM_MAX_ATTEMPTS")? {
            if attempts == 0 {
                return Err(SimulationError::invalid(
                    "RANKSIM_MAX_ATTEMPTS must be greater than 0",
                ));
            }
            config.engine = config.engine.with_max_rejection_attempts(attempts);
        }

        if let Some(limit) = parse_var::<usize, _>(&lookup, "RANKSIM_MAX_SIMULATIONS")? {
            if limit == 0 {
                return Err(SimulationError::invalid(
                    "RANKSIM_MAX_SIMULATIONS must be greater than 0",
                ));
            }
            config.engine = config.engine.with_max_simulations(limit);
        }

        if let Some(bytes) = parse_var::<usize, _>(&lookup, "RANKSIM_MAX_BODY_BYTES")? {
            config.max_body_bytes = bytes;
        }

        if let Some(bytes) = parse_var::<usize, _>(&lookup, "RANKSIM_MAX_HEADER_BYTES")? {
            config.max_header_bytes = bytes;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> SimulationResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            SimulationError::invalid(format!("{} has invalid value {:?}: {}", key, raw, e))
        }),
    }
}
