//! Deployment settings read from the environment.

use gemini::Gemini;
use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,story_server=debug,story_core=debug";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set (GOOGLE_GENERATIVE_AI_API_KEY is also accepted)")]
    MissingApiKey,

    #[error("Invalid STORY_BIND_ADDR '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: String,
    /// Overrides the Gemini API base URL when set.
    pub api_base: Option<String>,
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY")
            .or_else(|| get("GOOGLE_GENERATIVE_AI_API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let bind = get("STORY_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind.clone(),
                source,
            })?;

        Ok(Self {
            api_key,
            api_base: get("GEMINI_API_BASE"),
            bind_addr,
        })
    }

    pub fn gemini_client(&self) -> Gemini {
        let client = Gemini::new(self.api_key.clone());
        match &self.api_base {
            Some(base) => client.with_base_url(base.clone()),
            None => client,
        }
    }
}
