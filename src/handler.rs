//! Generic adapter pipeline.
//!
//! Every invocation runs `validate → build payload → call with deadline →
//! translate response` and ends in exactly one [`AdapterResponse`]. Adapters
//! only supply the payload builder, the response extractor and their
//! caller-visible messages.

use crate::ai::{GenerativeApi, ModelCall};
use crate::deadline::call_with_deadline;
use crate::{Error, Result};
use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// Caller-visible messages for each failure outcome of an adapter.
#[derive(Debug)]
pub struct AdapterMessages {
    pub missing_key: &'static str,
    pub upstream_fallback: &'static str,
    pub unexpected_format: &'static str,
    pub timeout: &'static str,
    pub internal: &'static str,
}

pub trait Adapter: Send + Sync {
    /// Success envelope returned to the caller.
    type Output: Serialize;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn messages(&self) -> &'static AdapterMessages;

    fn model_call(&self) -> &ModelCall;

    /// Build the outbound payload, rejecting unusable inbound bodies with
    /// [`Error::InvalidJsonBody`] or [`Error::MissingField`].
    fn build_payload(&self, body: Option<&[u8]>) -> Result<Value>;

    /// Pull the expected content out of a 2xx reply; `None` is a contract
    /// violation by the remote service.
    fn extract(&self, response: &Value) -> Option<Self::Output>;
}

#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub body: Option<Bytes>,
}

impl InboundRequest {
    /// An empty body is treated as absent.
    pub fn new(method: Method, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self {
            method,
            body: (!body.is_empty()).then_some(body),
        }
    }

    pub fn post(body: impl Into<Bytes>) -> Self {
        Self::new(Method::POST, body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// Normalized outcome of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl AdapterResponse {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
        }
    }

    /// `{ "error": message }`
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Text(body.into()),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Json(body) => body.get("error").and_then(Value::as_str),
            ResponseBody::Text(_) => None,
        }
    }
}

impl IntoResponse for AdapterResponse {
    fn into_response(self) -> Response {
        match self.body {
            ResponseBody::Json(body) => (self.status, Json(body)).into_response(),
            ResponseBody::Text(body) => (self.status, body).into_response(),
        }
    }
}

/// One adapter bound to its API key, transport and deadline.
pub struct AdapterHandler<A> {
    adapter: A,
    api: Arc<dyn GenerativeApi>,
    api_key: Option<String>,
    deadline: Duration,
}

impl<A: Adapter> AdapterHandler<A> {
    /// A `None` key is accepted; every invocation then answers with a
    /// configuration error.
    pub fn new(
        adapter: A,
        api: Arc<dyn GenerativeApi>,
        api_key: Option<String>,
        deadline: Duration,
    ) -> Self {
        Self {
            adapter,
            api,
            api_key,
            deadline,
        }
    }

    pub async fn handle(&self, request: InboundRequest) -> AdapterResponse {
        let span = tracing::info_span!(
            "invocation",
            adapter = self.adapter.name(),
            request_id = %Uuid::new_v4()
        );

        async move {
            info!("Function {} invoked", self.adapter.name());
            match self.process(&request).await {
                Ok(body) => {
                    info!("Successfully generated {} response", self.adapter.name());
                    AdapterResponse::json(StatusCode::OK, body)
                }
                Err(err) => self.reject(err),
            }
        }
        .instrument(span)
        .await
    }

    async fn process(&self, request: &InboundRequest) -> Result<Value> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::Config(format!("API key for {} not configured", self.adapter.name()))
        })?;

        if request.method != Method::POST {
            return Err(Error::MethodNotAllowed(request.method.to_string()));
        }

        let payload = self.adapter.build_payload(request.body.as_deref())?;
        let call = self.adapter.model_call();

        info!("Sending request to {}", call.model);
        let reply =
            call_with_deadline(self.deadline, self.api.post(call, api_key, &payload)).await?;
        debug!("{} response body: {}", call.model, reply.body);

        if !reply.is_success() {
            error!(
                "{} returned an error: status {} body {}",
                call.model, reply.status, reply.body
            );
            return Err(Error::Upstream {
                status: reply.status,
                message: reply.error_message(),
            });
        }

        let output = self
            .adapter
            .extract(&reply.body)
            .ok_or_else(|| Error::UnexpectedFormat(reply.body.to_string()))?;

        Ok(serde_json::to_value(output)?)
    }

    fn reject(&self, err: Error) -> AdapterResponse {
        let messages = self.adapter.messages();

        match err {
            Error::Config(reason) => {
                error!("{}", reason);
                AdapterResponse::error(StatusCode::INTERNAL_SERVER_ERROR, messages.missing_key)
            }
            Error::MethodNotAllowed(method) => {
                warn!("Method Not Allowed: {}", method);
                AdapterResponse::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
            }
            Error::InvalidJsonBody(reason) => {
                warn!("Rejected request body: {}", reason);
                AdapterResponse::text(StatusCode::BAD_REQUEST, "Invalid JSON body")
            }
            Error::MissingField(field) => {
                warn!("Request body has no usable {}", field);
                AdapterResponse::text(
                    StatusCode::BAD_REQUEST,
                    format!("Missing {} in request body.", field),
                )
            }
            Error::Upstream { status, message } => {
                // Only error statuses pass through; anything else is a bad gateway.
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                AdapterResponse::error(
                    status,
                    message.unwrap_or_else(|| messages.upstream_fallback.to_string()),
                )
            }
            Error::UnexpectedFormat(body) => {
                error!("Response structure unexpected or content missing: {}", body);
                AdapterResponse::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    messages.unexpected_format,
                )
            }
            Error::Timeout(deadline) => {
                error!("Request timed out after {:?}", deadline);
                AdapterResponse::error(StatusCode::GATEWAY_TIMEOUT, messages.timeout)
            }
            other => {
                error!("Error in {}: {}", self.adapter.name(), other);
                AdapterResponse::error(StatusCode::INTERNAL_SERVER_ERROR, messages.internal)
            }
        }
    }
}
