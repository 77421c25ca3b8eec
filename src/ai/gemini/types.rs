//! Gemini `generateContent` and Imagen `predict` payload types.
//!
//! Response-side fields are optional or defaulted so that shape checks happen
//! in the adapters instead of failing deserialization on harmless gaps. The
//! same types serialize the trimmed success envelopes sent to the frontend.

use serde::{Deserialize, Serialize};

/// Gemini content container used in both requests and responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Request body for `:generateContent`.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Envelope holding a single text candidate and nothing else.
    pub fn from_text(text: String) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: None,
                    parts: vec![Part::text(text)],
                }),
            }],
        }
    }

    /// `candidates[0].content.parts[0].text`
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

/// Request body for Imagen `:predict`.
///
/// `instances` is a single object, not a list, matching what the frontend's
/// deployment has always sent.
#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub instances: ImageInstance,
    pub parameters: ImageParameters,
}

#[derive(Debug, Serialize)]
pub struct ImageInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageParameters {
    pub sample_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

impl PredictResponse {
    pub fn from_base64(bytes_base64_encoded: String) -> Self {
        Self {
            predictions: vec![Prediction {
                bytes_base64_encoded: Some(bytes_base64_encoded),
                mime_type: None,
            }],
        }
    }

    /// `predictions[0].bytesBase64Encoded`, if non-empty.
    pub fn first_image(&self) -> Option<&str> {
        self.predictions
            .first()?
            .bytes_base64_encoded
            .as_deref()
            .filter(|b64| !b64.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_base64_encoded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}
