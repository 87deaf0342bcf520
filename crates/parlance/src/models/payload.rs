use serde::{Deserialize, Serialize};

use super::role::Role;

/// One inline image reference inside a multimodal payload, carried as a
/// `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePart {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultimodalContent {
    pub text: String,
    pub images: Vec<ImagePart>,
}

/// The model-ready representation of a message's content: plain text, or text
/// plus inline images. Built fresh per call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelContent {
    Text(String),
    Multimodal(MultimodalContent),
}

impl ModelContent {
    /// The textual part of the payload regardless of shape
    pub fn text(&self) -> &str {
        match self {
            ModelContent::Text(text) => text,
            ModelContent::Multimodal(payload) => &payload.text,
        }
    }

    pub fn images(&self) -> &[ImagePart] {
        match self {
            ModelContent::Text(_) => &[],
            ModelContent::Multimodal(payload) => &payload.images,
        }
    }
}

/// One element of the ordered sequence submitted to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: ModelContent,
}

impl PromptMessage {
    pub fn system<S: Into<String>>(text: S) -> Self {
        PromptMessage {
            role: Role::System,
            content: ModelContent::Text(text.into()),
        }
    }

    pub fn user(content: ModelContent) -> Self {
        PromptMessage {
            role: Role::User,
            content,
        }
    }

    pub fn assistant(content: ModelContent) -> Self {
        PromptMessage {
            role: Role::Assistant,
            content,
        }
    }
}
