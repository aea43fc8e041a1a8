//! `POST /chat` — request validation, resolution, and the error responses.

use std::time::Instant;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chatbridge_core::error::HistoryError;
use chatbridge_core::exchange::Exchange;
use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::SharedState;

/// User identifier recorded when the request names none.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Reply carried by every 500 response.
pub const INTERNAL_ERROR_REPLY: &str = "申し訳ございません。エラーが発生しました。";

const NOT_JSON: &str = "JSONフォーマットが必要です";
const EMPTY_BODY: &str = "データが空です";
const EMPTY_MESSAGE: &str = "メッセージが空です";

/// Errors a gateway handler can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400, `{"response": <message>}`.
    #[error("bad request: {0}")]
    BadRequest(&'static str),

    /// 500, `{"response": <apology>, "error": <detail>}`.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<HistoryError> for ApiError {
    fn from(e: HistoryError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "response": message }))).into_response()
            }
            Self::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "response": INTERNAL_ERROR_REPLY, "error": detail })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    message: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    user: Option<String>,
}

/// Non-string values read as absent.
fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(|value| value.as_str().map(str::to_string)))
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidChat {
    /// Trimmed, never empty.
    pub message: String,
    pub user: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: String,
    pub user: String,
    pub processing_time: f64,
}

/// Validate a raw `/chat` body.
///
/// Bodies that parse as JSON but are not an object with a string `message`
/// are treated as having no message. A non-string `user` is anonymous.
pub fn validate(body: &[u8]) -> Result<ValidChat, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::BadRequest(NOT_JSON))?;

    if is_empty_value(&value) {
        return Err(ApiError::BadRequest(EMPTY_BODY));
    }

    if !value.is_object() {
        return Err(ApiError::BadRequest(EMPTY_MESSAGE));
    }

    let request: ChatRequest =
        serde_json::from_value(value).map_err(|_| ApiError::BadRequest(EMPTY_MESSAGE))?;

    let message = request.message.as_deref().unwrap_or_default().trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest(EMPTY_MESSAGE));
    }

    Ok(ValidChat {
        message: message.to_string(),
        user: request.user.unwrap_or_else(|| ANONYMOUS_USER.to_string()),
    })
}

/// `application/json` or any `application/*+json`, parameters ignored.
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

    match mime.strip_prefix("application/") {
        Some(subtype) => subtype == "json" || subtype.ends_with("+json"),
        None => false,
    }
}

/// JSON values that carry no data at all.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

pub(crate) async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    if !is_json_content_type(&headers) {
        return Err(ApiError::BadRequest(NOT_JSON));
    }
    let chat = validate(&body)?;

    info!(user = %chat.user, message = %chat.message, "Chat message received");

    // A panic inside resolution surfaces as a JoinError instead of unwinding
    // through the connection task.
    let resolver = state.resolver.clone();
    let message = chat.message.clone();
    let resolution = tokio::spawn(async move { resolver.resolve(&message).await })
        .await
        .map_err(|e| {
            error!(user = %chat.user, error = %e, "Resolution failed");
            ApiError::Internal(e.to_string())
        })?;

    state
        .history
        .append(&chat.user, Exchange::new(chat.message, resolution.reply.clone()))
        .await?;

    let processing_time = started.elapsed().as_secs_f64();
    info!(
        user = %chat.user,
        source = %resolution.source,
        processing_time,
        reply = %resolution.reply,
        "Chat reply sent"
    );

    let body = ChatResponse {
        response: resolution.reply,
        timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        user: chat.user,
        processing_time,
    };

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        Json(body),
    )
        .into_response())
}

/// Bare `OPTIONS /chat` without preflight headers.
pub(crate) async fn chat_options() -> StatusCode {
    StatusCode::OK
}
