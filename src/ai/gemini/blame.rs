use super::types::{Content, GenerateContentRequest, GenerateContentResponse, Part};
use crate::ai::ModelCall;
use crate::handler::{Adapter, AdapterMessages};
use crate::{prompts, Result};
use serde::Deserialize;
use serde_json::Value;

static MESSAGES: AdapterMessages = AdapterMessages {
    missing_key: "Server configuration error: Gemini API key not found.",
    upstream_fallback: "Gemini API error occurred.",
    unexpected_format: "Failed to generate blame: Unexpected AI response format.",
    timeout: "Gemini API request timed out. Please try again.",
    internal: "Internal server error during AI generation.",
};

/// Text adapter: sends the fixed blame prompt to `generateContent` and
/// returns the first candidate's text.
pub struct BlameTextAdapter {
    call: ModelCall,
}

impl BlameTextAdapter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            call: ModelCall::new(model, "generateContent"),
        }
    }
}

impl Adapter for BlameTextAdapter {
    type Output = GenerateContentResponse;

    fn name(&self) -> &'static str {
        "blame-charles"
    }

    fn messages(&self) -> &'static AdapterMessages {
        &MESSAGES
    }

    fn model_call(&self) -> &ModelCall {
        &self.call
    }

    // The inbound body is ignored.
    fn build_payload(&self, _body: Option<&[u8]>) -> Result<Value> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(prompts::BLAME_TEXT)],
            }],
        };
        Ok(serde_json::to_value(&request)?)
    }

    fn extract(&self, response: &Value) -> Option<Self::Output> {
        let parsed = GenerateContentResponse::deserialize(response).ok()?;
        let text = parsed.first_text()?.to_string();
        Some(GenerateContentResponse::from_text(text))
    }
}
