//! Error handling and custom error types
//!
//! Provides unified error handling across the adapters using thiserror. Every
//! variant maps onto exactly one outcome of an invocation; the handler decides
//! which status and caller-visible message each one turns into.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Invalid JSON body: {0}")]
    InvalidJsonBody(String),

    #[error("Missing {0} in request body")]
    MissingField(&'static str),

    #[error("Upstream API error (status {status})")]
    Upstream { status: u16, message: Option<String> },

    #[error("Unexpected upstream response format: {0}")]
    UnexpectedFormat(String),

    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, Error>;
