use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parlance::errors::ChatError;
use parlance::models::content::Content;
use parlance::models::message::Message;
use parlance::models::role::Role;
use parlance::store::MessageStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{chat_error_response, error_response};
use crate::routes::ws::ThreadEvent;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateThreadRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    system_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    message: Vec<Content>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThreadTurnResponse {
    user_message: Message,
    ai_message: Message,
}

/// Why a thread-scoped turn failed; each variant maps to one status code
#[derive(Debug, Error)]
pub(crate) enum TurnError {
    #[error("thread not found")]
    ThreadNotFound,

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("storage failure: {0}")]
    Store(anyhow::Error),
}

impl TurnError {
    fn into_response(self) -> Response {
        match self {
            TurnError::ThreadNotFound => {
                error_response(StatusCode::NOT_FOUND, "thread not found")
            }
            TurnError::Chat(err) => chat_error_response(err),
            TurnError::Store(err) => {
                tracing::error!("storage failure: {:#}", err);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage failure")
            }
        }
    }
}

/// One full conversation turn on a stored thread: persist the user message,
/// replay the stored history into the model, persist the reply, broadcast
/// both. Validation happens before anything is persisted. Shared between the
/// POST route and the WebSocket gateway.
pub(crate) async fn run_thread_turn(
    state: &AppState,
    thread_id: &str,
    blocks: Vec<Content>,
) -> Result<(Message, Message), TurnError> {
    if state
        .store
        .get_thread(thread_id)
        .await
        .map_err(TurnError::Store)?
        .is_none()
    {
        return Err(TurnError::ThreadNotFound);
    }

    state
        .chat
        .validate(&blocks)
        .map_err(|err| TurnError::Chat(err.into()))?;

    let history = state
        .store
        .list_messages(thread_id)
        .await
        .map_err(TurnError::Store)?;

    let user_message = state
        .store
        .create_message(thread_id, Role::User, blocks.clone())
        .await
        .map_err(TurnError::Store)?;

    let reply = state.chat.chat_with_history(&blocks, &history).await?;

    let ai_message = state
        .store
        .create_message(thread_id, Role::Assistant, vec![Content::text(reply.content)])
        .await
        .map_err(TurnError::Store)?;

    // No subscribers is fine; send errors just mean nobody is listening
    let _ = state.events.send(ThreadEvent::NewMessage {
        thread_id: thread_id.to_string(),
        message: user_message.clone(),
    });
    let _ = state.events.send(ThreadEvent::NewMessage {
        thread_id: thread_id.to_string(),
        message: ai_message.clone(),
    });

    Ok((user_message, ai_message))
}

async fn create_thread(
    State(state): State<AppState>,
    body: Option<Json<CreateThreadRequest>>,
) -> Response {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    match state
        .store
        .create_thread(request.title, request.system_prompt)
        .await
    {
        Ok(thread) => (StatusCode::CREATED, Json(thread)).into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn list_threads(State(state): State<AppState>) -> Response {
    match state.store.list_threads().await {
        Ok(threads) => (StatusCode::OK, Json(threads)).into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn get_thread(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get_thread(&id).await {
        Ok(Some(thread)) => (StatusCode::OK, Json(thread)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "thread not found"),
        Err(err) => storage_failure(err),
    }
}

async fn delete_thread(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.delete_thread(&id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "thread not found"),
        Err(err) => storage_failure(err),
    }
}

async fn list_messages(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get_thread(&id).await {
        Ok(Some(_)) => match state.store.list_messages(&id).await {
            Ok(messages) => (StatusCode::OK, Json(messages)).into_response(),
            Err(err) => storage_failure(err),
        },
        Ok(None) => error_response(StatusCode::NOT_FOUND, "thread not found"),
        Err(err) => storage_failure(err),
    }
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Response {
    match run_thread_turn(&state, &id, request.message).await {
        Ok((user_message, ai_message)) => (
            StatusCode::CREATED,
            Json(ThreadTurnResponse {
                user_message,
                ai_message,
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn stats(State(state): State<AppState>) -> Response {
    match state.store.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => storage_failure(err),
    }
}

fn storage_failure(err: anyhow::Error) -> Response {
    tracing::error!("storage failure: {:#}", err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage failure")
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/threads", post(create_thread).get(list_threads))
        .route("/threads/:id", get(get_thread).delete(delete_thread))
        .route("/threads/:id/messages", post(send_message).get(list_messages))
        .route("/stats", get(stats))
        .with_state(state)
}
