//! Persistence seam for threads and their messages.
//!
//! The core only needs insertion order to be retrievable per thread;
//! implementations are expected to serialize writes within a thread. The
//! bundled in-memory implementation backs the server and the tests.
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::content::Content;
use crate::models::message::Message;
use crate::models::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    Active,
    Archived,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    pub created: i64,
    pub updated: i64,
    pub status: ThreadStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_threads: usize,
    pub active_threads: usize,
    pub total_messages: usize,
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create_thread(
        &self,
        title: Option<String>,
        system_prompt: Option<String>,
    ) -> Result<Thread>;

    /// Threads that are not deleted, most recently updated first
    async fn list_threads(&self) -> Result<Vec<Thread>>;

    async fn get_thread(&self, id: &str) -> Result<Option<Thread>>;

    /// Soft delete; returns false when the thread does not exist
    async fn delete_thread(&self, id: &str) -> Result<bool>;

    async fn create_message(
        &self,
        thread_id: &str,
        role: Role,
        content: Vec<Content>,
    ) -> Result<Message>;

    /// Messages of a thread in insertion order
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>>;

    async fn stats(&self) -> Result<StoreStats>;
}
