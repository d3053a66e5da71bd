//! Per-session conversation state and the persistence contract.
//!
//! A [`ConversationContext`] owns one session's history and its
//! free-form memory side channel. The [`ContextStore`] trait is the
//! collaborator interface to whatever durable store the deployment
//! uses; [`InMemoryContextStore`] is the in-process reference
//! implementation used in tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::message::Message;

/// Shared handle to a session's key/value memory.
///
/// Memory is the side channel tools use to pass state to later tools in
/// the same turn or across turns (e.g. caching a search result for a
/// numeric back-reference). Key ownership is by convention of the tool
/// that writes a key; the engine does not enforce it. Writes persist
/// even when the writing tool ultimately reports failure.
#[derive(Debug, Clone, Default)]
pub struct SessionMemory {
    entries: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl SessionMemory {
    /// Create an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory pre-populated from a snapshot.
    pub fn from_snapshot(entries: BTreeMap<String, Value>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Read a value.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    /// Write a value, returning the previous one if any.
    pub async fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.write().await.insert(key.into(), value)
    }

    /// Remove a value.
    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.entries.write().await.remove(key)
    }

    /// Whether the memory holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Copy the current entries, sorted by key.
    pub async fn snapshot(&self) -> BTreeMap<String, Value> {
        self.entries.read().await.clone()
    }
}

/// One session's conversation state.
///
/// The history is exclusively owned by the orchestrator during a turn;
/// memory is shared with tools through [`SessionMemory`] handles.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    /// Ordered message history.
    pub history: Vec<Message>,
    /// Free-form memory side channel.
    pub memory: SessionMemory,
    /// Last mutation time.
    pub last_updated: DateTime<Utc>,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            memory: SessionMemory::new(),
            last_updated: Utc::now(),
        }
    }

    /// Record a mutation.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Empty the history. Memory is preserved.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.touch();
    }

    /// Snapshot the context into its persisted shape.
    pub async fn to_persisted(&self) -> PersistedContext {
        PersistedContext {
            history: self.history.clone(),
            memory: self.memory.snapshot().await,
            last_updated: self.last_updated,
        }
    }

    /// Rebuild a context from its persisted shape.
    pub fn from_persisted(persisted: PersistedContext) -> Self {
        Self {
            history: persisted.history,
            memory: SessionMemory::from_snapshot(persisted.memory),
            last_updated: persisted.last_updated,
        }
    }
}

/// The persisted shape of a conversation context: plain structured
/// data, no binary framing. `lastUpdated` serializes as ISO-8601.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedContext {
    /// Ordered message history.
    pub history: Vec<Message>,
    /// Memory entries at snapshot time.
    #[serde(default)]
    pub memory: BTreeMap<String, Value>,
    /// Last mutation time.
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

/// Errors returned by context stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage or retrieval failure.
    #[error("context store error: {0}")]
    Store(String),
}

/// A durable store for conversation contexts, keyed by a session or
/// customer identifier resolved externally.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Load the persisted context for a key, if any.
    async fn get(&self, key: &str) -> Result<Option<PersistedContext>, StoreError>;

    /// Persist a context. Returns whether the write was accepted.
    async fn put(&self, key: &str, context: &PersistedContext) -> Result<bool, StoreError>;
}

/// In-process context store used in tests and examples.
#[derive(Debug, Default)]
pub struct InMemoryContextStore {
    entries: RwLock<BTreeMap<String, PersistedContext>>,
}

impl InMemoryContextStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn get(&self, key: &str) -> Result<Option<PersistedContext>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, context: &PersistedContext) -> Result<bool, StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), context.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_insert_and_get() {
        let memory = SessionMemory::new();
        memory.insert("customer_id", json!(42)).await;

        assert_eq!(memory.get("customer_id").await, Some(json!(42)));
        assert_eq!(memory.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_memory_handles_share_state() {
        let memory = SessionMemory::new();
        let handle = memory.clone();
        handle.insert("x", json!(1)).await;

        assert_eq!(memory.get("x").await, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_clear_history_preserves_memory() {
        let mut context = ConversationContext::new();
        context.history.push(Message::user("hello"));
        context.memory.insert("k", json!("v")).await;

        context.clear_history();

        assert!(context.history.is_empty());
        assert_eq!(context.memory.get("k").await, Some(json!("v")));
    }

    #[tokio::test]
    async fn test_persisted_round_trip() {
        let mut context = ConversationContext::new();
        context.history.push(Message::user("hello"));
        context.memory.insert("k", json!(5)).await;

        let persisted = context.to_persisted().await;
        let rebuilt = ConversationContext::from_persisted(persisted.clone());

        assert_eq!(rebuilt.history, context.history);
        assert_eq!(rebuilt.memory.get("k").await, Some(json!(5)));
        assert_eq!(rebuilt.last_updated, context.last_updated);
    }

    #[tokio::test]
    async fn test_persisted_serializes_last_updated_key() {
        let context = ConversationContext::new();
        let persisted = context.to_persisted().await;
        let value = serde_json::to_value(&persisted).unwrap();
        assert!(value.get("lastUpdated").is_some());
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryContextStore::new();
        let context = ConversationContext::new().to_persisted().await;

        assert!(store.get("s1").await.unwrap().is_none());
        assert!(store.put("s1", &context).await.unwrap());
        assert_eq!(store.get("s1").await.unwrap(), Some(context));
    }
}
