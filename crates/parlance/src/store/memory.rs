use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{MessageStore, StoreStats, Thread, ThreadStatus};
use crate::models::content::Content;
use crate::models::message::Message;
use crate::models::role::Role;

const DEFAULT_THREAD_TITLE: &str = "New conversation";

#[derive(Default)]
struct Inner {
    threads: Vec<Thread>,
    // thread id -> messages in insertion order
    messages: HashMap<String, Vec<Message>>,
}

/// In-memory `MessageStore`. The single mutex serializes writes, which also
/// gives per-thread insert ordering.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_thread(
        &self,
        title: Option<String>,
        system_prompt: Option<String>,
    ) -> Result<Thread> {
        let now = Utc::now().timestamp();
        let thread = Thread {
            id: Uuid::new_v4().to_string(),
            title: title.unwrap_or_else(|| DEFAULT_THREAD_TITLE.to_string()),
            system_prompt,
            created: now,
            updated: now,
            status: ThreadStatus::Active,
        };

        let mut inner = self.inner.lock().unwrap();
        inner.messages.insert(thread.id.clone(), Vec::new());
        inner.threads.push(thread.clone());
        Ok(thread)
    }

    async fn list_threads(&self) -> Result<Vec<Thread>> {
        let inner = self.inner.lock().unwrap();
        let mut threads: Vec<Thread> = inner
            .threads
            .iter()
            .filter(|t| t.status != ThreadStatus::Deleted)
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(threads)
    }

    async fn get_thread(&self, id: &str) -> Result<Option<Thread>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .threads
            .iter()
            .find(|t| t.id == id && t.status != ThreadStatus::Deleted)
            .cloned())
    }

    async fn delete_thread(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .threads
            .iter_mut()
            .find(|t| t.id == id && t.status != ThreadStatus::Deleted)
        {
            Some(thread) => {
                thread.status = ThreadStatus::Deleted;
                thread.updated = Utc::now().timestamp();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: Role,
        content: Vec<Content>,
    ) -> Result<Message> {
        let message = Message::new(role, content);

        let mut inner = self.inner.lock().unwrap();
        let thread = inner
            .threads
            .iter_mut()
            .find(|t| t.id == thread_id && t.status != ThreadStatus::Deleted)
            .ok_or_else(|| anyhow!("thread not found: {}", thread_id))?;
        thread.updated = Utc::now().timestamp();

        inner
            .messages
            .get_mut(thread_id)
            .expect("thread without message log")
            .push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.messages.get(thread_id).cloned().unwrap_or_default())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let inner = self.inner.lock().unwrap();
        let live: Vec<&Thread> = inner
            .threads
            .iter()
            .filter(|t| t.status != ThreadStatus::Deleted)
            .collect();

        Ok(StoreStats {
            total_threads: live.len(),
            active_threads: live
                .iter()
                .filter(|t| t.status == ThreadStatus::Active)
                .count(),
            total_messages: live
                .iter()
                .map(|t| inner.messages.get(&t.id).map_or(0, Vec::len))
                .sum(),
        })
    }
}
