//! AI player module - automated decisions for simulated seats.
//!
//! This module provides:
//! - AI trait for different AI implementations
//! - RandomPlayer: random legal moves (seedable for tests)
//! - Greedy: deterministic baseline
//! - A static registry of factories by name

mod greedy;
mod random;
pub mod registry;
mod trait_def;

pub use greedy::Greedy;
pub use random::RandomPlayer;
pub use registry::{by_name, registered_ais, AiFactory};
pub use trait_def::{AiError, AiPlayer, DrawChoice, PlayChoice};
