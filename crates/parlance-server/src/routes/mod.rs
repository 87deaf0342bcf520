// Export route modules
pub mod chat;
pub mod threads;
pub mod ws;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use parlance::errors::ChatError;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Validation failures are the user's fault; anything from the model backend
/// is ours and gets logged.
pub(crate) fn chat_error_response(err: ChatError) -> Response {
    match err {
        ChatError::Invalid(err) => error_response(StatusCode::BAD_REQUEST, err.to_string()),
        ChatError::ModelInvocation(err) => {
            tracing::error!("model invocation failed: {:#}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "model invocation failed")
        }
    }
}

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    let api = Router::new()
        .merge(chat::routes(state.clone()))
        .merge(threads::routes(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), require_token));

    // Browser WebSocket clients cannot attach an Authorization header, so the
    // gateway stays outside the guard
    Router::new().merge(api).merge(ws::routes(state))
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.api_token.as_deref() else {
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == expected);

    if authorized {
        next.run(request).await
    } else {
        error_response(StatusCode::UNAUTHORIZED, "invalid or missing bearer token")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::Body;
    use parlance::chat::ChatService;
    use parlance::config::ChatConfig;
    use parlance::models::payload::PromptMessage;
    use parlance::providers::base::{Provider, Usage};
    use parlance::store::memory::MemoryStore;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Queue-backed provider for exercising routes without a model backend
    struct TestProvider {
        replies: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Provider for TestProvider {
        async fn complete(&self, _messages: &[PromptMessage]) -> Result<(String, Usage)> {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Ok((String::new(), Usage::default()))
            } else {
                Ok((replies.remove(0), Usage::default()))
            }
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        async fn complete(&self, _messages: &[PromptMessage]) -> Result<(String, Usage)> {
            Err(anyhow::anyhow!("model backend unavailable"))
        }
    }

    pub(crate) fn test_state(replies: Vec<&str>) -> AppState {
        let provider = Box::new(TestProvider {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
        });
        AppState::new(
            ChatService::new(provider, ChatConfig::default()),
            Arc::new(MemoryStore::new()),
            None,
        )
    }

    pub(crate) fn failing_state() -> AppState {
        AppState::new(
            ChatService::new(Box::new(FailingProvider), ChatConfig::default()),
            Arc::new(MemoryStore::new()),
            None,
        )
    }

    pub(crate) fn request(uri: &str, body: serde_json::Value) -> Request {
        Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub(crate) fn get(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub(crate) fn delete(uri: &str) -> Request {
        Request::builder()
            .uri(uri)
            .method("DELETE")
            .body(Body::empty())
            .unwrap()
    }

    pub(crate) async fn response_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_guard_rejects_missing_and_wrong_tokens() {
        let mut state = test_state(vec!["hello"]);
        state.api_token = Some("secret".to_string());
        let app = configure(state);

        // No token
        let response = app
            .clone()
            .oneshot(request(
                "/chat",
                json!({"message": [{"type": "text", "text": "hi"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Wrong token
        let mut bad = request(
            "/chat",
            json!({"message": [{"type": "text", "text": "hi"}]}),
        );
        bad.headers_mut()
            .insert(header::AUTHORIZATION, "Bearer wrong".parse().unwrap());
        let response = app.clone().oneshot(bad).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Right token
        let mut good = request(
            "/chat",
            json!({"message": [{"type": "text", "text": "hi"}]}),
        );
        good.headers_mut()
            .insert(header::AUTHORIZATION, "Bearer secret".parse().unwrap());
        let response = app.oneshot(good).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_guard_is_disabled_without_a_token() {
        let app = configure(test_state(vec!["hello"]));
        let response = app
            .oneshot(request(
                "/chat",
                json!({"message": [{"type": "text", "text": "hi"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
