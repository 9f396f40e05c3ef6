use tracing::debug;

use super::{ActionOutcome, GameFlowService, GameSession};
use crate::domain::cards_logic::{sort_hand, SortMode};
use crate::domain::game_update::GameUpdate;
use crate::domain::state::require_player;
use crate::domain::turns::{self, MeldRef};
use crate::domain::Card;
use crate::error::AppError;

impl GameFlowService {
    pub async fn draw_from_deck(&self, session: &mut GameSession) -> Result<ActionOutcome, AppError> {
        let state = session.require_state()?;
        debug!(game_id = %session.game_id, slot = %session.slot, "draw from deck");
        let mv = {
            let mut rng = self.rng.lock();
            turns::draw_from_deck(&state, session.slot, &mut *rng)?
        };
        self.run_move(session, mv).await
    }

    /// Take discard[index..]; `index` counts from the bottom of the pile.
    pub async fn pick_up_discard(
        &self,
        session: &mut GameSession,
        index: usize,
    ) -> Result<ActionOutcome, AppError> {
        let state = session.require_state()?;
        debug!(game_id = %session.game_id, slot = %session.slot, index, "pick up discard");
        let mv = turns::pick_up_discard(&state, session.slot, index)?;
        self.run_move(session, mv).await
    }

    pub async fn lay_down_meld(
        &self,
        session: &mut GameSession,
        cards: &[Card],
    ) -> Result<ActionOutcome, AppError> {
        let state = session.require_state()?;
        debug!(game_id = %session.game_id, slot = %session.slot, ?cards, "lay down meld");
        let mv = turns::lay_down_meld(&state, session.slot, cards, session.must_play)?;
        self.run_move(session, mv).await
    }

    pub async fn lay_off(
        &self,
        session: &mut GameSession,
        card: Card,
        target: MeldRef,
    ) -> Result<ActionOutcome, AppError> {
        let state = session.require_state()?;
        debug!(
            game_id = %session.game_id,
            slot = %session.slot,
            card = %card,
            owner = %target.owner,
            meld = target.index,
            "lay off"
        );
        let mv = turns::lay_off(&state, session.slot, card, target, session.must_play)?;
        self.run_move(session, mv).await
    }

    pub async fn discard(
        &self,
        session: &mut GameSession,
        card: Card,
    ) -> Result<ActionOutcome, AppError> {
        let state = session.require_state()?;
        debug!(game_id = %session.game_id, slot = %session.slot, card = %card, "discard");
        let mv = turns::discard(&state, session.slot, card, session.must_play)?;
        self.run_move(session, mv).await
    }

    /// Explicit go-out; only valid once the hand is already empty.
    pub async fn go_out(&self, session: &mut GameSession) -> Result<ActionOutcome, AppError> {
        let state = session.require_state()?;
        debug!(game_id = %session.game_id, slot = %session.slot, "go out");
        let mv = turns::go_out(&state, session.slot)?;
        self.run_move(session, mv).await
    }

    /// Persist our hand in `mode` order. Allowed at any time while seated.
    pub async fn sort_hand(&self, session: &mut GameSession, mode: SortMode) -> Result<(), AppError> {
        let state = session.require_state()?;
        let player = require_player(&state, session.slot)?;
        let sorted = sort_hand(&player.hand, mode);
        if sorted != player.hand {
            self.commit(session, &GameUpdate::new().with_hand(session.slot, sorted))
                .await?;
        }
        session.sort_mode = mode;
        Ok(())
    }

    /// Advance to the next sort mode and persist it.
    pub async fn cycle_sort(&self, session: &mut GameSession) -> Result<SortMode, AppError> {
        let mode = session.sort_mode.next();
        self.sort_hand(session, mode).await?;
        Ok(mode)
    }
}
