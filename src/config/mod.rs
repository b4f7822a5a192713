//! Configuration module - CLI argument and environment variable parsing

use std::env;
use std::net::SocketAddr;

/// Default listening port when neither a CLI argument nor PORT is given
const DEFAULT_PORT: u16 = 80;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origin for CORS ("*" allows any)
    pub client_origin: String,
    /// Optional fixed seed for the world RNG (reproducible simulations)
    pub world_seed: Option<u64>,
}

impl Config {
    /// Load configuration. The only CLI surface is a single positional
    /// argument selecting the listening port; PORT is honored as a fallback.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(env::args().nth(1))
    }

    fn from_sources(port_arg: Option<String>) -> Result<Self, ConfigError> {
        let port = match port_arg.or_else(|| env::var("PORT").ok()) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let world_seed = match env::var("WORLD_SEED") {
            Ok(raw) => Some(raw.parse::<u64>().map_err(|_| ConfigError::InvalidSeed(raw))?),
            Err(_) => None,
        };

        Ok(Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            client_origin: env::var("CLIENT_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            world_seed,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port argument: {0}")]
    InvalidPort(String),

    #[error("Invalid WORLD_SEED value: {0}")]
    InvalidSeed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_argument_overrides_default() {
        let config = Config::from_sources(Some("8080".to_string())).unwrap();
        assert_eq!(config.server_addr.port(), 8080);
    }

    #[test]
    fn bad_port_argument_is_rejected() {
        let err = Config::from_sources(Some("not-a-port".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));
    }
}
