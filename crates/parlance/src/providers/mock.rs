use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::payload::PromptMessage;
use crate::providers::base::{Provider, Usage};

/// A mock provider that returns pre-configured replies for testing
pub struct MockProvider {
    replies: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of replies
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies)),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, _messages: &[PromptMessage]) -> Result<(String, Usage)> {
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            // Return empty reply if no more pre-configured replies
            Ok((String::new(), Usage::default()))
        } else {
            Ok((replies.remove(0), Usage::default()))
        }
    }
}

/// A provider that always fails, for exercising error paths
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    async fn complete(&self, _messages: &[PromptMessage]) -> Result<(String, Usage)> {
        Err(anyhow::anyhow!("model backend unavailable"))
    }
}
