use crate::ai::{GenerativeApi, ModelCall, UpstreamReply};
use crate::models::DEFAULT_API_BASE_URL;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Lightweight REST client for the Gemini and Imagen endpoints.
///
/// Holds no per-request state; the inner `reqwest::Client` is only a
/// connection pool and may be shared between handlers.
pub struct GeminiHttpClient {
    client: Client,
    base_url: String,
}

impl GeminiHttpClient {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for GeminiHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeApi for GeminiHttpClient {
    async fn post(
        &self,
        call: &ModelCall,
        api_key: &str,
        payload: &Value,
    ) -> Result<UpstreamReply> {
        let url = format!("{}{}", self.base_url, call.path());
        tracing::debug!("Sending request to {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                // reqwest includes the URL (and so the key) in its message
                let e = e.without_url();
                tracing::error!("Failed to send request to {}: {}", call.model, e);
                e
            })?;

        let status = response.status().as_u16();
        tracing::info!("Received response from {} with status: {}", call.model, status);

        let text = response.text().await.map_err(|e| e.without_url())?;

        if !(200..300).contains(&status) {
            let body = serde_json::from_str(&text).unwrap_or_else(|_| {
                tracing::warn!("Non-JSON error body from {}: {}", call.model, text);
                Value::Null
            });
            return Ok(UpstreamReply { status, body });
        }

        let body = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse {} response: {}\nBody: {}", call.model, e, text);
            e
        })?;

        Ok(UpstreamReply { status, body })
    }
}
