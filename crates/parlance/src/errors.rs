use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum NormalizeError {
    #[error("message content is empty")]
    EmptyContent,

    #[error("text block is empty")]
    EmptyText,

    #[error("incomplete {kind} block: data and mime type are required")]
    IncompleteMedia { kind: String },

    #[error("invalid image mime type: {mime_type}")]
    InvalidImageFormat { mime_type: String },

    #[error("invalid video mime type: {mime_type}")]
    InvalidVideoFormat { mime_type: String },

    #[error("text content is {length} characters, the limit is {limit}")]
    TextTooLong { length: usize, limit: usize },

    #[error("too many images: {count} exceeds the limit of {limit}")]
    TooManyImages { count: usize, limit: usize },

    #[error("too many videos: {count} exceeds the limit of {limit}")]
    TooManyVideos { count: usize, limit: usize },

    #[error("too many files: {count} exceeds the limit of {limit}")]
    TooManyFiles { count: usize, limit: usize },
}

#[derive(Error, Debug)]
pub enum ChatError {
    /// The submitted content failed validation; rejected before any model call
    #[error(transparent)]
    Invalid(#[from] NormalizeError),

    /// The model backend failed; propagated unchanged, never retried here
    #[error("model invocation failed: {0}")]
    ModelInvocation(anyhow::Error),
}
