//! These models represent the objects passed around by the chat core
//!
//! There are a few related formats we need to interact with:
//! - content blocks submitted by the clients inside request bodies
//! - stored messages, retrieved from the message store in insertion order
//! - model payloads, the linear prompt sequence sent to the LLM backend
//!
//! Client and stored shapes share the block types below; the model payload is
//! produced fresh per call by the normalizer and is never persisted.
pub mod content;
pub mod message;
pub mod payload;
pub mod role;
