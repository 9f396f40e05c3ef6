//! Plays complete games between two automated clients.
//!
//! Unlike a pure engine loop, every action goes through `GameFlowService`:
//! partial writes to a shared `MemoryStore`, snapshots pushed back to each
//! seat's session. Card conservation is checked after every turn.

use std::sync::Arc;

use rummy::ai::AiPlayer;
use rummy::domain::state::{GameStatus, PlayerSlot};
use rummy::repos::ResumeRepo;
use rummy::{
    AppError, ClientConfig, Clock, GameFlowService, GameSession, ManualClock, MemoryKv,
    MemoryStore,
};
use serde::Serialize;
use tracing::{debug, info};

/// Seat turns in one round before it is scored as it stands.
const MAX_TURNS_PER_ROUND: u32 = 500;

/// Clock start for simulated games: 2024-01-01T00:00:00Z.
const EPOCH_MILLIS: i64 = 1_704_067_200_000;

#[derive(Debug, Clone, Serialize)]
pub struct RoundRecord {
    pub round: u32,
    pub player1_delta: i32,
    pub player2_delta: i32,
    pub turns: u32,
    /// Scored by the turn cap instead of someone going out.
    pub stalled: bool,
}

/// Result of simulating a complete game.
#[derive(Debug, Clone)]
pub struct GameResult {
    pub game_id: String,
    pub rounds: Vec<RoundRecord>,
    /// Final totals, indexed player1, player2.
    pub final_scores: [i32; 2],
    pub actions: usize,
}

impl GameResult {
    /// Seat with the higher total; `None` on a tie.
    pub fn winner(&self) -> Option<PlayerSlot> {
        match self.final_scores[0].cmp(&self.final_scores[1]) {
            std::cmp::Ordering::Greater => Some(PlayerSlot::Player1),
            std::cmp::Ordering::Less => Some(PlayerSlot::Player2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

struct Seat {
    service: GameFlowService,
    session: GameSession,
}

pub struct Simulator {
    seed: u64,
    rounds: u32,
}

impl Simulator {
    pub fn new(seed: u64, rounds: u32) -> Self {
        Self { seed, rounds }
    }

    fn client(&self, store: &MemoryStore, clock: &Arc<ManualClock>, salt: u64) -> GameFlowService {
        let config = ClientConfig::default();
        let clock: Arc<dyn Clock> = clock.clone();
        let resume = ResumeRepo::new(
            Arc::new(MemoryKv::new()),
            clock.clone(),
            config.resume_key.clone(),
        );
        GameFlowService::new(Arc::new(store.connect()), resume, clock, config)
            .with_seed(self.seed.wrapping_add(salt))
    }

    pub async fn simulate_game(&self, ais: &[Box<dyn AiPlayer + Send + Sync>; 2]) -> Result<GameResult, AppError> {
        let clock = Arc::new(ManualClock::with_step(EPOCH_MILLIS, 250));
        let store = MemoryStore::new(clock.clone());

        let host = self.client(&store, &clock, 0);
        let guest = self.client(&store, &clock, 1);
        let host_session = host.create_game("Host").await?;
        let game_id = host_session.game_id().to_string();
        let joined = guest.join_game(&game_id, "Guest").await?;
        let mut seats = [
            Seat {
                service: host,
                session: host_session,
            },
            Seat {
                service: guest,
                session: joined.session,
            },
        ];
        info!(game_id = %game_id, seed = self.seed, "simulation started");

        let mut records = Vec::new();
        let mut actions = 0;
        let mut turns = 0;

        while records.len() < self.rounds as usize {
            let mut ended = None;
            for (index, seat) in seats.iter_mut().enumerate() {
                seat.session.refresh()?;
                let Some(game) = seat.session.state() else {
                    return Err(AppError::not_found(
                        "GAME_NOT_FOUND",
                        "Game no longer exists".to_string(),
                    ));
                };
                game.check_conservation()?;

                if game.status == GameStatus::RoundOver {
                    seat.service.start_new_round(&mut seat.session).await?;
                    turns = 0;
                    continue;
                }
                let turn = seat
                    .service
                    .play_ai_turn(&mut seat.session, ais[index].as_ref())
                    .await?;
                actions += turn.actions;
                if turn.actions > 0 {
                    turns += 1;
                }
                if let Some(entry) = turn.round_ended {
                    ended = Some((entry, false));
                    break;
                }
            }

            if ended.is_none() && turns > MAX_TURNS_PER_ROUND {
                let seat = &mut seats[0];
                let entry = seat.service.end_round(&mut seat.session).await?;
                debug!(game_id = %game_id, round = entry.round, "round stalled");
                ended = Some((entry, true));
            }
            if let Some((entry, stalled)) = ended {
                records.push(RoundRecord {
                    round: entry.round,
                    player1_delta: entry.player1_delta,
                    player2_delta: entry.player2_delta,
                    turns,
                    stalled,
                });
                turns = 0;
            }
        }

        let seat = &mut seats[0];
        seat.session.refresh()?;
        let final_scores = seat
            .session
            .state()
            .map(|game| {
                [
                    game.player1.score,
                    game.player2.as_ref().map_or(0, |p| p.score),
                ]
            })
            .unwrap_or_default();
        Ok(GameResult {
            game_id,
            rounds: records,
            final_scores,
            actions,
        })
    }
}
