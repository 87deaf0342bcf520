use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use parlance::models::content::Content;
use parlance::models::message::Message;
use serde::Deserialize;

use super::chat_error_response;
use crate::state::AppState;

// Types matching the incoming JSON structure
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct ChatWithHistoryRequest {
    message: Vec<Content>,
    #[serde(default)]
    history: Vec<Message>,
}

// Single-turn exchange without any prior context
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match state.chat.chat(&request.message).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => chat_error_response(err),
    }
}

// Multi-turn exchange; the client supplies the history it wants replayed
async fn chat_with_history_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatWithHistoryRequest>,
) -> Response {
    match state
        .chat
        .chat_with_history(&request.message, &request.history)
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => chat_error_response(err),
    }
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/chat/history", post(chat_with_history_handler))
        .with_state(state)
}
