use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assemble::HistoryAssembler;
use crate::config::ChatConfig;
use crate::errors::{ChatError, NormalizeError};
use crate::models::content::Content;
use crate::models::message::Message;
use crate::normalize::Normalizer;
use crate::providers::base::Provider;

/// The assistant's reply to one conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub id: String,
    pub content: String,
    pub created: i64,
}

/// Runs conversation turns: validate the submitted blocks, assemble the
/// prompt sequence, invoke the model, map the reply. Stateless per call; the
/// provider invocation is the only suspension point.
pub struct ChatService {
    provider: Box<dyn Provider + Send + Sync>,
    normalizer: Normalizer,
    assembler: HistoryAssembler,
}

impl ChatService {
    pub fn new(provider: Box<dyn Provider + Send + Sync>, config: ChatConfig) -> Self {
        let normalizer = Normalizer::new(config.limits);
        let assembler = HistoryAssembler::new(normalizer.clone(), config.profile, config.persona);
        Self {
            provider,
            normalizer,
            assembler,
        }
    }

    /// Validate content without running a turn. Lets callers reject bad
    /// input before persisting anything.
    pub fn validate(&self, content: &[Content]) -> Result<(), NormalizeError> {
        self.normalizer.validate(content)
    }

    /// Single-turn exchange with no prior history
    pub async fn chat(&self, new_content: &[Content]) -> Result<ChatReply, ChatError> {
        self.chat_with_history(new_content, &[]).await
    }

    /// Multi-turn exchange. Validation precedes assembly; either the whole
    /// turn is assembled and submitted or it fails before any model call.
    pub async fn chat_with_history(
        &self,
        new_content: &[Content],
        history: &[Message],
    ) -> Result<ChatReply, ChatError> {
        tracing::debug!(
            summary = %self.normalizer.describe(new_content),
            history_len = history.len(),
            "starting chat turn"
        );

        let sequence = self.assembler.assemble(new_content, history)?;
        let (text, usage) = self
            .provider
            .complete(&sequence)
            .await
            .map_err(ChatError::ModelInvocation)?;

        tracing::debug!(
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            "chat turn complete"
        );

        Ok(ChatReply {
            id: Uuid::new_v4().to_string(),
            content: text,
            created: Utc::now().timestamp(),
        })
    }
}
