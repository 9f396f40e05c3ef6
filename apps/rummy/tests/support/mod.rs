#![allow(dead_code)]

use std::sync::Arc;

use rummy::domain::cards_parsing::try_parse_cards;
use rummy::domain::state::GameState;
use rummy::domain::Card;
use rummy::repos::ResumeRepo;
use rummy::services::game_flow::{GameFlowService, GameSession};
use rummy::{ClientConfig, Clock, ManualClock, MemoryConnection, MemoryKv, MemoryStore};
use serde_json::Value;

/// One simulated device: its own connection, resume storage and RNG.
pub struct Client {
    pub service: GameFlowService,
    pub connection: Arc<MemoryConnection>,
    pub kv: Arc<MemoryKv>,
}

/// A store plus the clock every participant reads.
pub struct World {
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
    pub config: ClientConfig,
}

impl World {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::with_step(1_700_000_000_000, 1));
        Self {
            store: MemoryStore::new(clock.clone()),
            clock,
            config: ClientConfig::default(),
        }
    }

    pub fn client(&self, seed: u64) -> Client {
        let connection = Arc::new(self.store.connect());
        let kv = Arc::new(MemoryKv::new());
        let clock: Arc<dyn Clock> = self.clock.clone();
        let resume = ResumeRepo::new(kv.clone(), clock.clone(), self.config.resume_key.clone());
        let service =
            GameFlowService::new(connection.clone(), resume, clock, self.config.clone())
                .with_seed(seed);
        Client {
            service,
            connection,
            kv,
        }
    }

    /// Raw document as stored.
    pub fn raw_game(&self, game_id: &str) -> Option<Value> {
        self.store.snapshot(&self.config.game_path(game_id))
    }

    /// Write a crafted document directly, bypassing any client.
    pub async fn seed_game(&self, game_id: &str, doc: Value) {
        use rummy::RealtimeStore;
        let admin = self.store.connect();
        admin
            .set(&self.config.game_path(game_id), doc)
            .await
            .expect("seed game document");
    }
}

/// Two clients seated in a freshly dealt game.
pub async fn started_game(world: &World) -> (Client, GameSession, Client, GameSession) {
    let alice = world.client(11);
    let bob = world.client(22);
    let mut alice_session = alice.service.create_game("Alice").await.expect("create");
    let code = alice_session.game_id().to_string();
    let joined = bob.service.join_game(&code, "Bob").await.expect("join");
    alice_session.refresh().expect("refresh");
    (alice, alice_session, bob, joined.session)
}

pub fn state(session: &mut GameSession) -> GameState {
    session.refresh().expect("refresh");
    session.state().cloned().expect("mirror loaded")
}

pub fn cards(tokens: &[&str]) -> Vec<Card> {
    try_parse_cards(tokens).expect("hardcoded card tokens")
}

pub fn card(token: &str) -> Card {
    token.parse().expect("hardcoded card token")
}
