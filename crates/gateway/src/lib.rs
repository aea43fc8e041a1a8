//! HTTP gateway for chatbridge.
//!
//! Endpoints:
//!
//! - `GET  /`                     — liveness text
//! - `GET  /health`               — status, version, tracked users
//! - `POST /chat`                 — resolve a reply and record the exchange
//! - `GET  /history/{user}`       — a user's recent exchanges
//! - `POST /clear_history/{user}` — forget a user's exchanges
//!
//! Built on Axum; every response carries permissive CORS headers.

pub mod chat;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Path, State},
    http::{Method, header},
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use chatbridge_agent::ResponseResolver;
use chatbridge_core::exchange::Exchange;
use chatbridge_core::history::HistoryBackend;
use chatbridge_memory::InMemoryHistory;

pub use chat::{ApiError, ChatResponse, ValidChat};

/// Text served at `GET /`.
pub const LIVENESS_TEXT: &str = "SecondLife AI Chatbot Server is running!";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub resolver: Arc<ResponseResolver>,
    pub history: Arc<dyn HistoryBackend>,
}

impl GatewayState {
    pub fn new(resolver: Arc<ResponseResolver>, history: Arc<dyn HistoryBackend>) -> Self {
        Self { resolver, history }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS allowing any origin, `GET`/`POST`/`OPTIONS`
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route(
            "/chat",
            post(chat::chat_handler).options(chat::chat_options),
        )
        .route("/history/{user}", get(history_handler))
        .route("/clear_history/{user}", post(clear_history_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the inference chain, resolver, and history store once and shares
/// them across all requests.
pub async fn start(config: chatbridge_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = Arc::new(chatbridge_providers::build_from_config(&config)?);
    let resolver = Arc::new(ResponseResolver::from_config(&config, provider));
    let history: Arc<dyn HistoryBackend> =
        Arc::new(InMemoryHistory::with_capacity(config.history.max_exchanges));

    if !config.has_api_token() {
        info!("No HF_TOKEN configured; inference requests are sent unauthenticated");
    }

    let history_name = history.name().to_string();
    let app = build_router(Arc::new(GatewayState::new(resolver, history)));

    info!(addr = %addr, history = %history_name, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

async fn root_handler() -> &'static str {
    LIVENESS_TEXT
}

#[derive(Debug, Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub users: usize,
}

async fn health_handler(State(state): State<SharedState>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        users: state.history.user_count().await?,
    }))
}

async fn history_handler(
    State(state): State<SharedState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<Exchange>>, ApiError> {
    Ok(Json(state.history.get(&user).await?))
}

#[derive(Debug, Serialize, serde::Deserialize)]
pub struct ClearResponse {
    pub status: String,
}

async fn clear_history_handler(
    State(state): State<SharedState>,
    Path(user): Path<String>,
) -> Result<Json<ClearResponse>, ApiError> {
    state.history.clear(&user).await?;
    info!(user = %user, "History cleared");
    Ok(Json(ClearResponse {
        status: "cleared".into(),
    }))
}
