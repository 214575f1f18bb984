//! Server configuration from the environment.

use std::net::SocketAddr;
use thiserror::Error;

pub const ADDR_VAR: &str = "CHALKLINE_ADDR";
pub const CHANNEL_CAPACITY_VAR: &str = "CHALKLINE_CHANNEL_CAPACITY";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not a socket address: {value}")]
    Addr { var: &'static str, value: String },
    #[error("{var} must be a positive integer, got {value}")]
    Capacity { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Per-room broadcast buffer; slow peers lag past this many messages.
    pub channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3030)),
            channel_capacity: 256,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(ADDR_VAR) {
            config.addr = value.parse().map_err(|_| ConfigError::Addr {
                var: ADDR_VAR,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(CHANNEL_CAPACITY_VAR) {
            config.channel_capacity = match value.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Capacity {
                        var: CHANNEL_CAPACITY_VAR,
                        value,
                    });
                }
            };
        }
        Ok(config)
    }
}
