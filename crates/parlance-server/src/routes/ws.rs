use axum::{
    extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use parlance::models::content::Content;
use parlance::models::message::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::broadcast;

use crate::routes::threads::run_thread_turn;
use crate::state::AppState;

/// Events pushed to WebSocket clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ThreadEvent {
    #[serde(rename_all = "camelCase")]
    NewMessage { thread_id: String, message: Message },
    #[serde(rename_all = "camelCase")]
    UserTyping {
        thread_id: String,
        user_id: String,
        is_typing: bool,
    },
}

impl ThreadEvent {
    pub fn thread_id(&self) -> &str {
        match self {
            ThreadEvent::NewMessage { thread_id, .. } => thread_id,
            ThreadEvent::UserTyping { thread_id, .. } => thread_id,
        }
    }
}

/// Events accepted from WebSocket clients
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    JoinThread { thread_id: String },
    #[serde(rename_all = "camelCase")]
    LeaveThread { thread_id: String },
    #[serde(rename_all = "camelCase")]
    SendMessage {
        thread_id: String,
        message: Vec<Content>,
    },
    #[serde(rename_all = "camelCase")]
    TypingStart { thread_id: String, user_id: String },
    #[serde(rename_all = "camelCase")]
    TypingStop { thread_id: String, user_id: String },
}

async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection loop: forward bus events for joined threads, handle
/// incoming client events. A connection only ever sees events for threads it
/// joined.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let mut events = state.events.subscribe();
    let mut joined: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if joined.contains(event.thread_id()) {
                        let Ok(payload) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if sink.send(WsMessage::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "websocket client fell behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    handle_client_event(&state, &mut joined, &text).await;
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {} // pings are answered by axum itself
                Some(Err(err)) => {
                    tracing::warn!("websocket receive error: {}", err);
                    break;
                }
            },
        }
    }
}

async fn handle_client_event(state: &AppState, joined: &mut HashSet<String>, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!("unrecognized websocket event: {}", err);
            return;
        }
    };

    match event {
        ClientEvent::JoinThread { thread_id } => {
            joined.insert(thread_id);
        }
        ClientEvent::LeaveThread { thread_id } => {
            joined.remove(&thread_id);
        }
        ClientEvent::SendMessage { thread_id, message } => {
            // The turn pipeline broadcasts both resulting messages itself
            if let Err(err) = run_thread_turn(state, &thread_id, message).await {
                tracing::warn!("websocket turn failed: {}", err);
            }
        }
        ClientEvent::TypingStart { thread_id, user_id } => {
            let _ = state.events.send(ThreadEvent::UserTyping {
                thread_id,
                user_id,
                is_typing: true,
            });
        }
        ClientEvent::TypingStop { thread_id, user_id } => {
            let _ = state.events.send(ThreadEvent::UserTyping {
                thread_id,
                user_id,
                is_typing: false,
            });
        }
    }
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}
