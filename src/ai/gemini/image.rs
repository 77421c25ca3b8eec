use super::types::{ImageInstance, ImageParameters, PredictRequest, PredictResponse};
use crate::ai::{mime, ModelCall};
use crate::handler::{Adapter, AdapterMessages};
use crate::{prompts, Error, Result};
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;

static MESSAGES: AdapterMessages = AdapterMessages {
    missing_key: "Server configuration error: Imagen API key not found.",
    upstream_fallback: "Imagen API error occurred.",
    unexpected_format: "Failed to generate image: Unexpected API response format.",
    timeout: "Imagen API request timed out. Please try again.",
    internal: "Internal server error during image generation.",
};

/// Image adapter: illustrates a caller-supplied blame text via Imagen
/// `predict` and returns the first prediction's base64 bytes.
pub struct ImagePromptAdapter {
    call: ModelCall,
}

impl ImagePromptAdapter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            call: ModelCall::new(model, "predict"),
        }
    }

    fn blame_text(body: Option<&[u8]>) -> Result<String> {
        let raw = body.ok_or_else(|| Error::InvalidJsonBody("empty body".to_string()))?;
        let parsed: Value =
            serde_json::from_slice(raw).map_err(|e| Error::InvalidJsonBody(e.to_string()))?;

        // Anything but a non-empty string counts as missing.
        parsed
            .get("prompt")
            .and_then(Value::as_str)
            .filter(|prompt| !prompt.is_empty())
            .map(str::to_string)
            .ok_or(Error::MissingField("prompt"))
    }
}

impl Adapter for ImagePromptAdapter {
    type Output = PredictResponse;

    fn name(&self) -> &'static str {
        "generate-image"
    }

    fn messages(&self) -> &'static AdapterMessages {
        &MESSAGES
    }

    fn model_call(&self) -> &ModelCall {
        &self.call
    }

    fn build_payload(&self, body: Option<&[u8]>) -> Result<Value> {
        let blame = Self::blame_text(body)?;

        let request = PredictRequest {
            instances: ImageInstance {
                prompt: prompts::render(prompts::BLAME_IMAGE, &[("blame", &blame)]),
            },
            parameters: ImageParameters { sample_count: 1 },
        };
        Ok(serde_json::to_value(&request)?)
    }

    fn extract(&self, response: &Value) -> Option<Self::Output> {
        let parsed = PredictResponse::deserialize(response).ok()?;
        let b64 = parsed.first_image()?;

        let bytes = match base64::engine::general_purpose::STANDARD.decode(b64) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Imagen returned undecodable image data: {}", e);
                return None;
            }
        };

        tracing::debug!(
            "Imagen returned {} bytes ({})",
            bytes.len(),
            mime::detect_image_mime(&bytes)
        );

        Some(PredictResponse::from_base64(b64.to_string()))
    }
}
