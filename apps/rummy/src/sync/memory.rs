//! In-memory replicated document tree.
//!
//! Reference implementation of `RealtimeStore`. One `MemoryStore` holds the
//! tree; each client gets its own `MemoryConnection`. Storage follows the
//! shape rules of a hosted realtime database:
//! - null, empty arrays and empty objects are never stored; writing one removes the node
//! - writing an array index past the end turns the array into a keyed map
//! - `server_timestamp()` placeholders are replaced with the store clock
//! - on-disconnect writes run when the owning connection drops
//!
//! Every subscriber whose path overlaps a write receives the full value at its
//! path, but only when that value actually changed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::infra::clock::Clock;
use crate::sync::store::{is_server_timestamp, Patch, RealtimeStore, StoreError, Subscription};

struct Subscriber {
    connection: Uuid,
    path: Vec<String>,
    tx: mpsc::UnboundedSender<Option<Value>>,
    last_sent: Mutex<Option<Value>>,
}

struct Shared {
    root: Mutex<Value>,
    subscribers: DashMap<Uuid, Subscriber>,
    disconnect_writes: DashMap<Uuid, Vec<(Vec<String>, Value)>>,
    clock: Arc<dyn Clock>,
}

/// The replicated tree shared by every connection.
#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                root: Mutex::new(Value::Object(Map::new())),
                subscribers: DashMap::new(),
                disconnect_writes: DashMap::new(),
                clock,
            }),
        }
    }

    /// Open a new client connection.
    pub fn connect(&self) -> MemoryConnection {
        MemoryConnection {
            id: Uuid::new_v4(),
            shared: self.shared.clone(),
            closed: AtomicBool::new(false),
            rejection: Mutex::new(None),
        }
    }

    /// Raw stored value, shape rules included. Used by tests and tooling.
    pub fn snapshot(&self, path: &str) -> Option<Value> {
        let segments = split_path(path);
        let root = self.shared.root.lock();
        value_at(&root, &segments).cloned()
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }
}

/// One client's handle on a `MemoryStore`.
pub struct MemoryConnection {
    id: Uuid,
    shared: Arc<Shared>,
    closed: AtomicBool,
    rejection: Mutex<Option<String>>,
}

impl MemoryConnection {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    /// Make every following write fail with `detail` until cleared with `None`.
    pub fn reject_writes(&self, detail: Option<String>) {
        *self.rejection.lock() = detail;
    }

    /// Drop the connection: run its on-disconnect writes and end its feeds.
    pub fn disconnect(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some((_, writes)) = self.shared.disconnect_writes.remove(&self.id) {
            debug!(connection = %self.id, count = writes.len(), "running on-disconnect writes");
            self.shared.apply(&writes);
        }
        let owned: Vec<Uuid> = self
            .shared
            .subscribers
            .iter()
            .filter(|s| s.connection == self.id)
            .map(|s| *s.key())
            .collect();
        for key in owned {
            self.shared.subscribers.remove(&key);
        }
    }

    fn check_writable(&self, path: &str) -> Result<(), StoreError> {
        if !self.is_connected() {
            return Err(StoreError::Disconnected);
        }
        if let Some(detail) = self.rejection.lock().clone() {
            warn!(connection = %self.id, path, %detail, "write rejected");
            return Err(StoreError::Rejected {
                path: path.to_string(),
                detail,
            });
        }
        Ok(())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[async_trait]
impl RealtimeStore for MemoryConnection {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        if !self.is_connected() {
            return Err(StoreError::Disconnected);
        }
        let segments = split_path(path);
        let root = self.shared.root.lock();
        Ok(value_at(&root, &segments).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.check_writable(path)?;
        let segments = split_path(path);
        if segments.is_empty() {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        self.shared.apply(&[(segments, value)]);
        Ok(())
    }

    async fn update(&self, path: &str, patch: &Patch) -> Result<(), StoreError> {
        self.check_writable(path)?;
        let base = split_path(path);
        let mut writes = Vec::with_capacity(patch.len());
        for (relative, value) in patch {
            let mut segments = base.clone();
            segments.extend(split_path(relative));
            if segments.is_empty() {
                return Err(StoreError::InvalidPath(relative.clone()));
            }
            writes.push((segments, value.clone()));
        }
        self.shared.apply(&writes);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.set(path, Value::Null).await
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        if !self.is_connected() {
            return Err(StoreError::Disconnected);
        }
        let segments = split_path(path);
        let (tx, rx) = mpsc::unbounded_channel();
        // Registered under the tree lock so no write slips in between.
        let root = self.shared.root.lock();
        let current = value_at(&root, &segments).cloned();
        if tx.send(current.clone()).is_err() {
            trace!(connection = %self.id, path, "subscriber gone before first snapshot");
        }
        self.shared.subscribers.insert(
            Uuid::new_v4(),
            Subscriber {
                connection: self.id,
                path: segments,
                tx,
                last_sent: Mutex::new(current),
            },
        );
        drop(root);
        Ok(Subscription::new(rx))
    }

    async fn on_disconnect(&self, path: &str, value: Value) -> Result<(), StoreError> {
        if !self.is_connected() {
            return Err(StoreError::Disconnected);
        }
        let segments = split_path(path);
        if segments.is_empty() {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        self.shared
            .disconnect_writes
            .entry(self.id)
            .or_default()
            .push((segments, value));
        Ok(())
    }

    async fn cancel_on_disconnect(&self, path: &str) -> Result<(), StoreError> {
        if !self.is_connected() {
            return Err(StoreError::Disconnected);
        }
        let prefix = split_path(path);
        if let Some(mut writes) = self.shared.disconnect_writes.get_mut(&self.id) {
            let before = writes.len();
            writes.retain(|(segments, _)| !segments.starts_with(&prefix));
            debug!(
                connection = %self.id,
                path,
                cancelled = before - writes.len(),
                "on-disconnect writes cancelled"
            );
        }
        Ok(())
    }
}

impl Shared {
    /// Apply every write under one lock, then notify overlapping subscribers once.
    fn apply(&self, writes: &[(Vec<String>, Value)]) {
        let now = self.clock.now_millis();
        let mut root = self.root.lock();
        for (segments, value) in writes {
            let normalized = normalize(value.clone(), now);
            write_at(&mut root, segments, normalized);
        }

        let mut closed = Vec::new();
        for sub in self.subscribers.iter() {
            if !writes.iter().any(|(segments, _)| overlaps(&sub.path, segments)) {
                continue;
            }
            let current = value_at(&root, &sub.path).cloned();
            let mut last = sub.last_sent.lock();
            if *last == current {
                continue;
            }
            if sub.tx.send(current.clone()).is_err() {
                trace!(subscriber = %sub.key(), "feed closed, dropping subscriber");
                closed.push(*sub.key());
                continue;
            }
            *last = current;
        }
        drop(root);
        for key in closed {
            self.subscribers.remove(&key);
        }
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// One path is a prefix of the other.
fn overlaps(a: &[String], b: &[String]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

fn value_at<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for seg in segments {
        node = match node {
            Value::Object(map) => map.get(seg)?,
            Value::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Drop empties, resolve timestamp placeholders, and turn holed arrays into keyed maps.
fn normalize(value: Value, now: i64) -> Option<Value> {
    if is_server_timestamp(&value) {
        return Some(Value::from(now));
    }
    match value {
        Value::Null => None,
        Value::Array(items) => {
            let normalized: Vec<Option<Value>> =
                items.into_iter().map(|v| normalize(v, now)).collect();
            if normalized.iter().all(Option::is_some) {
                let dense: Vec<Value> = normalized.into_iter().flatten().collect();
                (!dense.is_empty()).then_some(Value::Array(dense))
            } else {
                let keyed: Map<String, Value> = normalized
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, v)| v.map(|v| (i.to_string(), v)))
                    .collect();
                (!keyed.is_empty()).then_some(Value::Object(keyed))
            }
        }
        Value::Object(fields) => {
            let kept: Map<String, Value> = fields
                .into_iter()
                .filter_map(|(k, v)| normalize(v, now).map(|v| (k, v)))
                .collect();
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        scalar => Some(scalar),
    }
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Array to keyed map, preserving indices.
fn degrade_to_map(node: &mut Value) {
    if let Value::Array(items) = node {
        let keyed: Map<String, Value> = std::mem::take(items)
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect();
        *node = Value::Object(keyed);
    }
}

/// Write (or with `None`, remove) the node at `segments`, pruning emptied parents.
fn write_at(node: &mut Value, segments: &[String], value: Option<Value>) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value.unwrap_or_else(|| Value::Object(Map::new()));
        return;
    };

    if let Value::Array(items) = node {
        match head.parse::<usize>() {
            Ok(index) if index < items.len() => {
                if rest.is_empty() {
                    match value {
                        Some(v) => items[index] = v,
                        None if index + 1 == items.len() => {
                            items.pop();
                        }
                        None => {
                            degrade_to_map(node);
                            write_at(node, segments, None);
                        }
                    }
                } else {
                    write_at(&mut items[index], rest, value);
                    if is_empty_container(&items[index]) {
                        if index + 1 == items.len() {
                            items.pop();
                        } else {
                            degrade_to_map(node);
                            write_at(node, &segments[..1], None);
                        }
                    }
                }
                return;
            }
            Ok(index) if index == items.len() && rest.is_empty() => {
                if let Some(v) = value {
                    items.push(v);
                }
                return;
            }
            _ => degrade_to_map(node),
        }
    }

    if !node.is_object() {
        if value.is_none() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };

    if rest.is_empty() {
        match value {
            Some(v) => {
                map.insert(head.clone(), v);
            }
            None => {
                map.remove(head);
            }
        }
        return;
    }

    if value.is_none() && !map.contains_key(head) {
        return;
    }
    let child = map
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    write_at(child, rest, value);
    if is_empty_container(child) {
        map.remove(head);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::infra::ManualClock;
    use crate::sync::store::server_timestamp;

    fn store() -> MemoryStore {
        MemoryStore::new(Arc::new(ManualClock::new(5_000)))
    }

    #[tokio::test]
    async fn empty_sequences_are_not_stored() {
        let store = store();
        let conn = store.connect();
        let doc = json!({
            "status": "waiting",
            "deck": [],
            "players": { "player1": { "name": "Ann", "hand": [] } }
        });
        conn.set("games/G1", doc).await.unwrap();
        assert_eq!(
            store.snapshot("games/G1"),
            Some(json!({ "status": "waiting", "players": { "player1": { "name": "Ann" } } }))
        );
    }

    #[tokio::test]
    async fn sparse_index_write_degrades_array_to_map() {
        let store = store();
        let conn = store.connect();
        conn.set("g/melds", json!([["AC", "2C", "3C"]])).await.unwrap();

        let mut patch = Patch::new();
        patch.insert("melds/0".into(), json!(["AC", "2C", "3C", "4C"]));
        conn.update("g", &patch).await.unwrap();
        assert_eq!(store.snapshot("g/melds"), Some(json!([["AC", "2C", "3C", "4C"]])));

        let mut patch = Patch::new();
        patch.insert("melds/3".into(), json!(["7S", "7H", "7D"]));
        conn.update("g", &patch).await.unwrap();
        assert_eq!(
            store.snapshot("g/melds"),
            Some(json!({ "0": ["AC", "2C", "3C", "4C"], "3": ["7S", "7H", "7D"] }))
        );
    }

    #[tokio::test]
    async fn appending_at_len_keeps_array() {
        let store = store();
        let conn = store.connect();
        conn.set("g/list", json!(["a"])).await.unwrap();
        conn.set("g/list/1", json!("b")).await.unwrap();
        assert_eq!(store.snapshot("g/list"), Some(json!(["a", "b"])));
    }

    #[tokio::test]
    async fn removing_last_child_prunes_parents() {
        let store = store();
        let conn = store.connect();
        conn.set("games/G1/players/player1/online", json!(true)).await.unwrap();
        conn.remove("games/G1/players/player1/online").await.unwrap();
        assert_eq!(store.snapshot("games/G1"), None);
        assert_eq!(store.snapshot("games"), None);
    }

    #[tokio::test]
    async fn subscribers_get_initial_and_changed_snapshots_only() {
        let store = store();
        let writer = store.connect();
        let reader = store.connect();
        writer.set("games/G1/status", json!("waiting")).await.unwrap();

        let mut sub = reader.subscribe("games/G1").await.unwrap();
        assert_eq!(sub.next().await.unwrap(), Some(json!({ "status": "waiting" })));

        writer.set("games/G1/status", json!("waiting")).await.unwrap();
        writer.set("games/OTHER/status", json!("playing")).await.unwrap();
        assert_eq!(sub.try_next(), None);

        let mut patch = Patch::new();
        patch.insert("status".into(), json!("playing"));
        patch.insert("phase".into(), json!("draw"));
        writer.update("games/G1", &patch).await.unwrap();
        assert_eq!(
            sub.next().await.unwrap(),
            Some(json!({ "status": "playing", "phase": "draw" }))
        );
        assert_eq!(sub.try_next(), None);
    }

    #[tokio::test]
    async fn disconnect_runs_compensating_writes() {
        let store = store();
        let watcher = store.connect();
        let player = store.connect();
        player.set("g/players/player2/online", json!(true)).await.unwrap();
        player.on_disconnect("g/players/player2/online", json!(false)).await.unwrap();
        player.on_disconnect("g/players/player2/lastSeen", server_timestamp()).await.unwrap();

        let mut sub = watcher.subscribe("g/players/player2").await.unwrap();
        let _initial = sub.next().await.unwrap();

        player.disconnect();
        let after = sub.try_next().flatten().unwrap();
        assert_eq!(after["online"], json!(false));
        assert!(after["lastSeen"].as_i64().unwrap() >= 5_000);

        assert_eq!(player.get("g").await, Err(StoreError::Disconnected));
    }

    #[tokio::test]
    async fn queued_snapshots_arrive_one_by_one() {
        let store = store();
        let writer = store.connect();
        let reader = store.connect();
        let mut sub = reader.subscribe("g/status").await.unwrap();
        assert_eq!(sub.next().await.unwrap(), None);

        writer.set("g/status", json!("playing")).await.unwrap();
        writer.set("g/status", json!("roundOver")).await.unwrap();
        assert_eq!(sub.try_next(), Some(Some(json!("playing"))));
        assert_eq!(sub.try_next(), Some(Some(json!("roundOver"))));
        assert_eq!(sub.try_next(), None);
    }

    #[tokio::test]
    async fn cancelled_compensating_writes_do_not_run() {
        let store = store();
        let player = store.connect();
        player.on_disconnect("games/G1/players/player1/online", json!(false)).await.unwrap();
        player.on_disconnect("games/G2/players/player1/online", json!(false)).await.unwrap();

        player.cancel_on_disconnect("games/G1").await.unwrap();
        player.disconnect();

        assert_eq!(store.snapshot("games/G1"), None);
        assert_eq!(
            store.snapshot("games/G2/players/player1/online"),
            Some(json!(false))
        );
    }

    #[tokio::test]
    async fn dropped_connection_ends_its_feeds() {
        let store = store();
        let conn = store.connect();
        let mut sub = conn.subscribe("g").await.unwrap();
        assert_eq!(sub.next().await.unwrap(), None);
        assert_eq!(store.subscriber_count(), 1);
        drop(conn);
        assert_eq!(store.subscriber_count(), 0);
        assert_eq!(sub.next().await, Err(StoreError::Disconnected));
    }

    #[tokio::test]
    async fn rejected_writes_leave_tree_untouched() {
        let store = store();
        let conn = store.connect();
        conn.set("g/status", json!("waiting")).await.unwrap();
        conn.reject_writes(Some("network down".into()));
        let err = conn.set("g/status", json!("playing")).await.unwrap_err();
        assert!(err.to_string().contains("network down"));
        assert_eq!(store.snapshot("g/status"), Some(json!("waiting")));
        conn.reject_writes(None);
        conn.set("g/status", json!("playing")).await.unwrap();
    }

    #[test]
    fn normalize_turns_holes_into_keys() {
        let value = normalize(json!(["a", null, "c"]), 0);
        assert_eq!(value, Some(json!({ "0": "a", "2": "c" })));
        assert_eq!(normalize(json!({ "x": [] , "y": {} }), 0), None);
    }
}
