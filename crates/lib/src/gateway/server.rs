//! Gateway HTTP server: `POST /chat` relay plus a health probe.

use crate::config::{self, Config};
use crate::gateway::protocol::{
    message_from_body, ChatReply, ErrorReply, GENERIC_FAILURE_REPLY, INTERNAL_ERROR_REPLY,
    NO_MESSAGE_ERROR,
};
use crate::llm::{GeminiClient, ReplyBackend};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures_util::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};

/// Shared state for the gateway (config and the reply backend).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    /// Translates one message per request. Holds no per-request state.
    pub backend: Arc<dyn ReplyBackend>,
}

impl GatewayState {
    pub fn new(config: Config, backend: Arc<dyn ReplyBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }
}

/// Routes: `GET /` health, `POST /chat`. CORS is permissive on every route: any origin,
/// any method, and whatever headers the preflight asks for.
pub fn router(state: GatewayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(AllowHeaders::mirror_request());

    Router::new()
        .route("/", get(health_http))
        .route("/chat", post(chat_http))
        .layer(cors)
        .with_state(state)
}

/// Build the upstream client from config and an already-resolved API key.
/// `None` (no GEMINI_API_KEY and no upstream.apiKey) is a startup error.
pub fn build_client(config: &Config, api_key: Option<String>) -> Result<GeminiClient> {
    let api_key = api_key.with_context(|| {
        format!(
            "{} not found (set it in the environment or upstream.apiKey); refusing to start",
            config::API_KEY_ENV
        )
    })?;
    GeminiClient::new(
        &config.upstream.base_url,
        &config.upstream.model,
        api_key,
        config::upstream_timeout(config),
    )
    .context("building upstream http client")
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Fails before binding when no API key is configured (GEMINI_API_KEY or upstream.apiKey).
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let client = build_client(&config, config::resolve_api_key(&config))?;
    log::info!(
        "upstream: {} (timeout {}s)",
        client.generate_url(),
        config::upstream_timeout(&config).as_secs()
    );

    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let app = router(GatewayState::new(config, Arc::new(client)));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
    }))
}

/// POST /chat — one message in, one reply out. Panics inside the handler become a 500.
/// If the client disconnects, this future is dropped and the upstream request with it.
async fn chat_http(State(state): State<GatewayState>, body: Bytes) -> Response {
    match AssertUnwindSafe(handle_chat(&state, &body))
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(_) => {
            log::error!("chat: handler panicked");
            internal_error()
        }
    }
}

async fn handle_chat(state: &GatewayState, body: &[u8]) -> Response {
    let message = match message_from_body(body) {
        Ok(Some(m)) => m,
        Ok(None) => {
            let error = ErrorReply {
                error: NO_MESSAGE_ERROR.to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
        Err(e) => {
            log::warn!("chat: unreadable request body: {}", e);
            return internal_error();
        }
    };
    log::debug!("chat: received message ({} bytes)", message.len());

    match state.backend.translate(&message).await {
        Ok(reply) => (StatusCode::OK, Json(ChatReply::new(reply))).into_response(),
        Err(e) => {
            log::warn!("chat: upstream processing error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatReply::new(GENERIC_FAILURE_REPLY)),
            )
                .into_response()
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ChatReply::new(INTERNAL_ERROR_REPLY)),
    )
        .into_response()
}
