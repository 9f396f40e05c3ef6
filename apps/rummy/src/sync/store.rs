//! Contract of the realtime push/subscribe collaborator.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::errors::domain::{DomainError, InfraErrorKind};

/// Partial write: slash-separated path (relative to the write root) to value.
///
/// A `Value::Null` removes the field.
pub type Patch = BTreeMap<String, Value>;

/// Placeholder the store replaces with its own clock at write time.
pub fn server_timestamp() -> Value {
    json!({ ".sv": "timestamp" })
}

pub fn is_server_timestamp(value: &Value) -> bool {
    value.get(".sv").and_then(Value::as_str) == Some("timestamp")
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("connection closed")]
    Disconnected,
    #[error("write rejected at {path}: {detail}")]
    Rejected { path: String, detail: String },
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::infra(InfraErrorKind::Connectivity, err.to_string())
    }
}

/// Full-value snapshots pushed after every change under a subscribed path.
///
/// The first snapshot is the value at subscription time. `None` means the
/// path holds nothing.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Option<Value>>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<Option<Value>>) -> Self {
        Self { rx }
    }

    /// Next snapshot, or `Err(Disconnected)` once the store drops the feed.
    pub async fn next(&mut self) -> Result<Option<Value>, StoreError> {
        self.rx.recv().await.ok_or(StoreError::Disconnected)
    }

    /// Oldest queued snapshot without waiting, or `None` when nothing is queued.
    pub fn try_next(&mut self) -> Option<Option<Value>> {
        self.rx.try_recv().ok()
    }
}

/// One client's connection to the replicated document tree.
///
/// Writes are acknowledged once the store has applied them; there is no
/// version check, so concurrent writers to one field race and the last wins.
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replace everything at `path`.
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Multi-path partial write; every entry lands in one notification.
    async fn update(&self, path: &str, patch: &Patch) -> Result<(), StoreError>;

    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError>;

    /// Register a compensating write the store performs when this connection drops.
    async fn on_disconnect(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Drop this connection's compensating writes at or below `path`.
    async fn cancel_on_disconnect(&self, path: &str) -> Result<(), StoreError>;
}
