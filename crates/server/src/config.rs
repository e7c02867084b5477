//! Service configuration read from the environment

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ServerError;

/// Default model artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "prophet_model.bin";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Where to listen and which artifact to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT` and `MODEL_PATH`, falling back to the defaults.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                ServerError::Config(format!("PORT must be a valid number, got '{}'", raw))
            })?,
            None => defaults.port,
        };

        let model_path = lookup("MODEL_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);

        Ok(Self {
            host,
            port,
            model_path,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| {
                ServerError::Config(format!(
                    "Invalid HOST:PORT configuration '{}:{}'",
                    self.host, self.port
                ))
            })
    }
}
