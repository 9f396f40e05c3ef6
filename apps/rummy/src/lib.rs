#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod ai;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod infra;
pub mod repos;
pub mod services;
pub mod sync;
pub mod telemetry;
pub mod utils;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use ai::{AiPlayer, DrawChoice, PlayChoice};
pub use config::client::ClientConfig;
pub use domain::{Card, GameState, GameStatus, GameTransition, MeldRef, PlayerSlot, TurnPhase};
pub use error::AppError;
pub use errors::domain::DomainError;
pub use infra::{Clock, ManualClock, MemoryKv, SystemClock};
pub use repos::{KeyValueStore, ResumeEntry, ResumeRepo};
pub use services::{ActionOutcome, AiTurn, GameFlowService, GameSession, JoinOutcome};
pub use sync::{MemoryConnection, MemoryStore, RealtimeStore, StoreError};
pub use telemetry::init_tracing;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
