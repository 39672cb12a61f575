//! Runtime configuration loaded from the environment (and `.env`).

use crate::ai::openai::client::DEFAULT_BASE_URL;
use crate::{Error, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub default_model: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Fallback credential for callers that do not supply their own.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Zero disables the turn cache.
    pub capacity: usize,
    pub ttl: Duration,
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {}: {}", name, e))),
        _ => Ok(default),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: non_empty_var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_var("SERVER_PORT", 5050)?,
            },
            upstream: UpstreamConfig {
                api_key: non_empty_var("OPENAI_API_KEY"),
                base_url: non_empty_var("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout: Duration::from_secs(parse_var("OPENAI_TIMEOUT_SECS", 120)?),
            },
            cache: CacheConfig {
                capacity: parse_var("TURN_CACHE_CAPACITY", 256)?,
                ttl: Duration::from_secs(parse_var("TURN_CACHE_TTL_SECS", 3600)?),
            },
            default_model: non_empty_var("DEFAULT_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// The configured credential, or an error naming the variable to set.
    pub fn require_api_key(&self) -> Result<String> {
        self.upstream.api_key.clone().ok_or_else(|| {
            Error::Config(
                "OPENAI_API_KEY environment variable not set. Run: export OPENAI_API_KEY='your-key-here'"
                    .to_string(),
            )
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5050,
            },
            upstream: UpstreamConfig {
                api_key: None,
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout: Duration::from_secs(120),
            },
            cache: CacheConfig {
                capacity: 256,
                ttl: Duration::from_secs(3600),
            },
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}
