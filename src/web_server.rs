use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::intake::{ConversationTurn, IntakeForm};
use crate::openai::OpenAiClient;
use crate::prompt::{self, StyleRules};

/// Shared application state. Everything is read-only after startup, so
/// handlers on concurrent requests just clone the Arcs.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<OpenAiClient>,
    pub rules: Arc<StyleRules>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitialMessageRequest {
    /// A missing formData key means the customer skipped the hearing form;
    /// the prompt is built from an empty form rather than rejecting.
    #[serde(default)]
    form_data: IntakeForm,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    #[serde(default)]
    messages: Vec<ConversationTurn>,
    #[serde(default)]
    chat_count: u32,
}

#[derive(Debug, Serialize)]
struct AssistantResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct FailureResponse {
    error: String,
    response: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    credential_configured: bool,
    provider_reachable: bool,
}

/// The chat widget must never see a raw error, so every dispatch failure
/// becomes a 500 whose body still carries presentable fallback text.
fn failure_response(fallback: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FailureResponse {
            error: "エラーが発生しました".to_string(),
            response: fallback.to_string(),
        }),
    )
        .into_response()
}

async fn initial_message_handler(
    State(state): State<AppState>,
    Json(request): Json<InitialMessageRequest>,
) -> Response {
    info!("Received initial-message request");

    let payload = prompt::build_initial_prompt(&request.form_data, &state.rules);
    match state.client.dispatch(&payload).await {
        Ok(text) => {
            info!("Initial message generated");
            Json(AssistantResponse { response: text }).into_response()
        }
        Err(e) => {
            error!("Initial-message dispatch failed: {}", e);
            failure_response(prompt::INITIAL_FALLBACK)
        }
    }
}

async fn chat_handler(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    info!(
        "Received chat request: {} turns, chat_count={}",
        request.messages.len(),
        request.chat_count
    );

    let payload = prompt::build_chat_prompt(&request.messages, request.chat_count, &state.rules);
    match state.client.dispatch(&payload).await {
        Ok(text) => {
            info!("Chat reply generated");
            Json(AssistantResponse { response: text }).into_response()
        }
        Err(e) => {
            error!("Chat dispatch failed: {}", e);
            failure_response(prompt::CHAT_FALLBACK)
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_reachable = state.client.health_check().await.unwrap_or(false);
    Json(HealthResponse {
        status: "ok",
        credential_configured: state.client.credential_configured(),
        provider_reachable,
    })
}

/// Build the application router. Split out from the listener so tests can
/// drive the handlers directly.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/initial-message", post(initial_message_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/health", get(health_handler))
        // The front-end bundle; anything that is not an API route falls
        // through to it, with index.html served at /.
        .fallback_service(ServeDir::new("static"))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server(port: u16, state: AppState) -> Result<()> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
