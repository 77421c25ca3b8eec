//! Generative API integration
//!
//! Provides the transport seam ([`GenerativeApi`]) used by the adapter
//! handlers, the Gemini/Imagen REST implementation of it, and the two
//! adapters that shape prompts and responses for the frontend.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{BlameTextAdapter, GeminiHttpClient, ImagePromptAdapter};
pub use mock::{MockGenerativeApi, MockReply};

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A single model RPC, e.g. `gemini-2.0-flash:generateContent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCall {
    pub model: String,
    pub method: &'static str,
}

impl ModelCall {
    /// `model` may be given with or without its `models/` prefix.
    pub fn new(model: impl Into<String>, method: &'static str) -> Self {
        let model = model.into();
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();
        Self { model, method }
    }

    /// Path relative to the API base URL.
    pub fn path(&self) -> String {
        format!("/v1beta/models/{}:{}", self.model, self.method)
    }
}

/// Remote reply as seen by the handler: status plus the decoded JSON body.
///
/// A non-2xx reply whose body is not JSON carries `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `error.message` from a Google API error document, if present.
    pub fn error_message(&self) -> Option<String> {
        self.body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[async_trait]
pub trait GenerativeApi: Send + Sync {
    /// Issue one POST of `payload` to `call`, authenticated with `api_key`.
    async fn post(
        &self,
        call: &ModelCall,
        api_key: &str,
        payload: &Value,
    ) -> Result<UpstreamReply>;
}
