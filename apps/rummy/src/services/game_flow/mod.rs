//! Client orchestration - bridges the pure engine with the shared document.
//!
//! Every action reads the session's mirror, asks the engine for a move, and
//! issues the move's partial write. The mirror is only ever replaced by
//! snapshots pushed from the store, so a failed write leaves it untouched.

mod ai_coordinator;
mod lobby;
mod mutation;
mod player_actions;
mod round_lifecycle;
mod session;

use std::sync::Arc;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::config::client::ClientConfig;
use crate::infra::clock::Clock;
use crate::repos::resume::ResumeRepo;
use crate::sync::store::RealtimeStore;

pub use ai_coordinator::AiTurn;
pub use lobby::JoinOutcome;
pub use mutation::ActionOutcome;
pub use session::GameSession;

/// One client's game service. Holds no per-game state; that lives in `GameSession`.
pub struct GameFlowService {
    store: Arc<dyn RealtimeStore>,
    resume: ResumeRepo,
    clock: Arc<dyn Clock>,
    config: ClientConfig,
    rng: Mutex<ChaCha20Rng>,
}

impl GameFlowService {
    pub fn new(
        store: Arc<dyn RealtimeStore>,
        resume: ResumeRepo,
        clock: Arc<dyn Clock>,
        config: ClientConfig,
    ) -> Self {
        Self {
            store,
            resume,
            clock,
            config,
            rng: Mutex::new(ChaCha20Rng::from_rng(&mut rand::rng())),
        }
    }

    /// Deterministic shuffles and codes for tests and simulations.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn resume_book(&self) -> &ResumeRepo {
        &self.resume
    }
}
