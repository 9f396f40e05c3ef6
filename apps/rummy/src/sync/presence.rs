//! Dead-man's-switch presence for one seat.
//!
//! The client asserts `online = true` and leaves the store two compensating
//! writes for an abrupt drop: `online = false` and `lastSeen = server time`.
//! There is no heartbeat.

use serde_json::Value;
use tracing::debug;

use crate::domain::state::PlayerSlot;
use crate::sync::store::{server_timestamp, RealtimeStore, StoreError};

fn seat_path(game_path: &str, slot: PlayerSlot, field: &str) -> String {
    format!("{game_path}/players/{}/{field}", slot.key())
}

pub async fn attach_presence(
    store: &dyn RealtimeStore,
    game_path: &str,
    slot: PlayerSlot,
) -> Result<(), StoreError> {
    let online = seat_path(game_path, slot, "online");
    store.set(&online, Value::Bool(true)).await?;
    store.on_disconnect(&online, Value::Bool(false)).await?;
    store
        .on_disconnect(&seat_path(game_path, slot, "lastSeen"), server_timestamp())
        .await?;
    debug!(path = game_path, slot = %slot, "presence attached");
    Ok(())
}

/// Withdraw every compensating write this connection left under `game_path`.
pub async fn detach_presence(store: &dyn RealtimeStore, game_path: &str) -> Result<(), StoreError> {
    store.cancel_on_disconnect(game_path).await?;
    debug!(path = game_path, "presence detached");
    Ok(())
}
