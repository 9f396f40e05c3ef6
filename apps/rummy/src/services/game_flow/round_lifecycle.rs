use tracing::info;

use super::{GameFlowService, GameSession};
use crate::domain::round::{score_round, start_new_round};
use crate::domain::scoring::ScoreEntry;
use crate::domain::state::GameState;
use crate::error::AppError;
use crate::sync::document::decode_game;
use crate::utils::join_code::is_game_code;

impl GameFlowService {
    /// Read the game straight from the store, bypassing any mirror.
    ///
    /// An id outside the code alphabet names no game and is never turned into a path.
    pub(super) async fn read_game(&self, game_id: &str) -> Result<Option<GameState>, AppError> {
        if !is_game_code(game_id) {
            return Ok(None);
        }
        let raw = self.store.get(&self.config.game_path(game_id)).await?;
        Ok(decode_game(game_id, raw)?)
    }

    pub(super) async fn require_game(
        &self,
        game_id: &str,
        missing: &str,
    ) -> Result<GameState, AppError> {
        self.read_game(game_id)
            .await?
            .ok_or_else(|| AppError::not_found("GAME_NOT_FOUND", missing.to_string()))
    }

    /// Score the round from freshly read hands and melds, then freeze it.
    pub async fn end_round(&self, session: &mut GameSession) -> Result<ScoreEntry, AppError> {
        let fresh = self
            .require_game(&session.game_id, "Game no longer exists")
            .await?;
        let result = score_round(&fresh)?;
        self.commit(session, &result.update).await?;
        session.must_play = None;
        info!(
            game_id = %session.game_id,
            round = result.entry.round,
            "round over"
        );
        Ok(result.entry)
    }

    /// Deal the next round. Either seat may call this once the round is over.
    pub async fn start_new_round(&self, session: &mut GameSession) -> Result<u32, AppError> {
        let fresh = self
            .require_game(&session.game_id, "Game no longer exists")
            .await?;
        let update = {
            let mut rng = self.rng.lock();
            start_new_round(&fresh, &mut *rng)?
        };
        self.commit(session, &update).await?;
        session.must_play = None;
        Ok(fresh.round_number + 1)
    }
}
