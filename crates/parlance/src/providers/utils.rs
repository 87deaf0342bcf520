use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::models::payload::{ModelContent, PromptMessage};

/// Convert the prompt sequence to OpenAI's chat message specification.
/// Plain text stays a string; multimodal content becomes a content-part
/// array with the text first and one `image_url` part per image.
pub fn messages_to_openai_spec(messages: &[PromptMessage]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let content = match &message.content {
            ModelContent::Text(text) => json!(text),
            ModelContent::Multimodal(payload) => {
                let mut parts = vec![json!({
                    "type": "text",
                    "text": payload.text,
                })];
                for image in &payload.images {
                    parts.push(json!({
                        "type": "image_url",
                        "image_url": { "url": image.url },
                    }));
                }
                Value::Array(parts)
            }
        };

        messages_spec.push(json!({
            "role": message.role,
            "content": content,
        }));
    }

    messages_spec
}

/// Extract the assistant text from an OpenAI chat completion response
pub fn openai_response_to_text(response: &Value) -> Result<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| anyhow!("no assistant content in model response"))
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}
