use chrono::Utc;
use uuid::Uuid;

use super::content::Content;
use super::role::Role;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// A message stored on a thread or submitted as part of the history
pub struct Message {
    pub id: String,
    pub role: Role,
    pub created: i64,
    pub content: Vec<Content>,
}

impl Message {
    pub fn new(role: Role, content: Vec<Content>) -> Self {
        Message {
            id: Uuid::new_v4().to_string(),
            role,
            created: Utc::now().timestamp(),
            content,
        }
    }

    /// Create a new user message with the current timestamp
    pub fn user() -> Self {
        Self::new(Role::User, Vec::new())
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant() -> Self {
        Self::new(Role::Assistant, Vec::new())
    }

    /// Add any content block to the message
    pub fn with_content(mut self, content: Content) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(Content::text(text))
    }

    /// Add image content to the message
    pub fn with_image<S: Into<String>, T: Into<String>>(self, data: S, mime_type: T) -> Self {
        self.with_content(Content::image(data, mime_type))
    }
}
