//! Browser chat front end
//!
//! Serves a single-page chat widget plus a small JSON API that forwards
//! every message to the shared [`ChatAgent`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::agent::{ChatAgent, HistoryEntry};
use crate::error::{Error, Result};
use crate::VERSION;

/// Embedded chat widget
const CHAT_HTML: &str = include_str!("../../static/chat.html");

// ---- App State ----

#[derive(Clone)]
struct WebState {
    agent: Arc<ChatAgent>,
}

// ---- Error Handling ----

/// An error with the HTTP status it is reported under
struct AppError {
    status: StatusCode,
    error: Error,
}

impl AppError {
    fn bad_request(error: Error) -> Self {
        AppError {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.error.to_string() }));
        (self.status, body).into_response()
    }
}

// Anything the agent returns is a server-side failure
impl From<Error> for AppError {
    fn from(error: Error) -> Self {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }
}

// ---- Request/Response Types ----

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    session_id: String,
    model: Option<String>,
    messages: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

// ---- Handlers ----

async fn serve_index() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], CHAT_HTML)
}

async fn chat(
    State(state): State<WebState>,
    Json(request): Json<ChatRequest>,
) -> std::result::Result<Json<ChatResponse>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::bad_request(Error::InvalidInput(
            "message must not be empty".to_string(),
        )));
    }

    let reply = state.agent.respond(message).await.map_err(|e| {
        error!("Chat turn failed: {}", e);
        e
    })?;

    Ok(Json(ChatResponse { reply }))
}

async fn history(State(state): State<WebState>) -> Json<HistoryResponse> {
    let session_id = state.agent.session_id().to_string();
    let (model, messages) = match state.agent.conversation(&session_id).await {
        Some(conv) => (Some(conv.model), conv.entries),
        None => (None, Vec::new()),
    };
    Json(HistoryResponse {
        session_id,
        model,
        messages,
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: VERSION,
    })
}

// ---- Router ----

/// Routes for the chat widget and its API
pub fn router(agent: Arc<ChatAgent>) -> Router {
    let api = Router::new()
        .route("/chat", post(chat))
        .route("/history", get(history));

    Router::new()
        .route("/", get(serve_index))
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(WebState { agent })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

/// Serve the chat widget on `addr` until Ctrl-C
pub async fn serve(agent: Arc<ChatAgent>, addr: SocketAddr) -> Result<()> {
    let app = router(agent);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Chat widget listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
