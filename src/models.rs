//! Data models and structures
//!
//! Defines the service configuration shared by the adapters and the server.

use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 8000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8888";

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub imagen_api_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
    pub api_base_url: String,
    pub upstream_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Read configuration from the process environment (and `.env`, if present).
    ///
    /// Missing API keys are not an error here: the affected handler answers
    /// every invocation with a configuration error instead.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY");
        let imagen_api_key = non_empty("IMAGEN_API_KEY").or_else(|| gemini_api_key.clone());

        let upstream_timeout = match non_empty("UPSTREAM_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse::<u64>().map_err(|_| {
                crate::Error::Config(format!("UPSTREAM_TIMEOUT_MS is not a number: {}", raw))
            })?),
            None => Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
        };

        let bind_raw = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.trim().parse::<SocketAddr>().map_err(|_| {
            crate::Error::Config(format!("BIND_ADDR is not a socket address: {}", bind_raw))
        })?;

        Ok(Self {
            gemini_api_key,
            imagen_api_key,
            text_model: non_empty("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: non_empty("IMAGEN_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            api_base_url: non_empty("GEMINI_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            upstream_timeout,
            bind_addr,
        })
    }
}
