//! HTTP surface mounting both adapters at the paths the frontend calls.

use crate::ai::{BlameTextAdapter, GeminiHttpClient, GenerativeApi, ImagePromptAdapter};
use crate::handler::{AdapterHandler, AdapterResponse, InboundRequest};
use crate::models::Config;
use crate::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::response::Json;
use axum::routing::{any, get};
use axum::Router;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const BLAME_PATH: &str = "/.netlify/functions/blame-charles";
pub const IMAGE_PATH: &str = "/.netlify/functions/generate-image";

#[derive(Clone)]
pub struct AppState {
    blame: Arc<AdapterHandler<BlameTextAdapter>>,
    image: Arc<AdapterHandler<ImagePromptAdapter>>,
}

impl AppState {
    pub fn new(
        blame: AdapterHandler<BlameTextAdapter>,
        image: AdapterHandler<ImagePromptAdapter>,
    ) -> Self {
        Self {
            blame: Arc::new(blame),
            image: Arc::new(image),
        }
    }

    /// Wire both handlers to one shared Gemini client.
    pub fn from_config(config: &Config) -> Self {
        let api: Arc<dyn GenerativeApi> =
            Arc::new(GeminiHttpClient::new().with_base_url(config.api_base_url.clone()));

        info!(
            "Text model: {} / image model: {} / deadline: {:?}",
            config.text_model, config.image_model, config.upstream_timeout
        );

        Self::new(
            AdapterHandler::new(
                BlameTextAdapter::new(config.text_model.clone()),
                api.clone(),
                config.gemini_api_key.clone(),
                config.upstream_timeout,
            ),
            AdapterHandler::new(
                ImagePromptAdapter::new(config.image_model.clone()),
                api,
                config.imagen_api_key.clone(),
                config.upstream_timeout,
            ),
        )
    }
}

/// Method filtering is left to the handlers so a wrong method still gets
/// their 405 (or configuration error) instead of the router's.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(BLAME_PATH, any(blame_charles))
        .route(IMAGE_PATH, any(generate_image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `config.bind_addr` and serve until `shutdown` resolves.
pub async fn serve<F>(config: &Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(AppState::from_config(config));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn blame_charles(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> AdapterResponse {
    state.blame.handle(InboundRequest::new(method, body)).await
}

async fn generate_image(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> AdapterResponse {
    state.image.handle(InboundRequest::new(method, body)).await
}
