use tracing::{info, warn};

use super::{GameFlowService, GameSession};
use crate::domain::game_update::GameUpdate;
use crate::domain::scoring::ScoreEntry;
use crate::domain::turns::Move;
use crate::domain::Card;
use crate::error::AppError;
use crate::sync::patch::encode_update;

/// What a committed action left behind for the acting seat.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionOutcome {
    /// Outstanding card that must be melded or laid off before discarding.
    pub must_play: Option<Card>,
    /// Set when the action emptied the hand and the round was scored.
    pub round_ended: Option<ScoreEntry>,
}

impl GameFlowService {
    /// Send one partial write to the game at `game_id`.
    pub(super) async fn write_update(
        &self,
        game_id: &str,
        update: &GameUpdate,
    ) -> Result<(), AppError> {
        let patch = encode_update(update, self.clock.now_millis());
        self.store
            .update(&self.config.game_path(game_id), &patch)
            .await
            .map_err(|err| {
                warn!(game_id, error = %err, "write rejected");
                AppError::from(err)
            })
    }

    /// Write on behalf of a session. The mirror is left alone; it catches up
    /// from the pushed snapshot.
    pub(super) async fn commit(
        &self,
        session: &GameSession,
        update: &GameUpdate,
    ) -> Result<(), AppError> {
        self.write_update(&session.game_id, update).await
    }

    /// Commit a turn move and carry its consequences: the must-play marker,
    /// and scoring when the hand went empty.
    pub(super) async fn run_move(
        &self,
        session: &mut GameSession,
        mv: Move,
    ) -> Result<ActionOutcome, AppError> {
        self.commit(session, &mv.update).await?;
        session.must_play = mv.must_play;

        if !mv.goes_out {
            return Ok(ActionOutcome {
                must_play: mv.must_play,
                round_ended: None,
            });
        }
        info!(game_id = %session.game_id, slot = %session.slot, "hand emptied, scoring round");
        let entry = self.end_round(session).await?;
        Ok(ActionOutcome {
            must_play: None,
            round_ended: Some(entry),
        })
    }
}
