//! Synchronization protocol: the shared document, its partial writes, and
//! the realtime store the two clients coordinate through.

pub mod document;
pub mod memory;
pub mod patch;
pub mod presence;
pub mod store;

pub use document::{decode_game, GameDoc};
pub use memory::{MemoryConnection, MemoryStore};
pub use patch::encode_update;
pub use store::{Patch, RealtimeStore, StoreError, Subscription};
