use tracing::{debug, info};

use super::{ActionOutcome, GameFlowService, GameSession};
use crate::ai::{AiPlayer, DrawChoice, PlayChoice};
use crate::domain::scoring::ScoreEntry;
use crate::domain::state::TurnPhase;
use crate::error::AppError;

/// Upper bound on actions in one AI turn: a full hand of lay-offs plus draw and discard.
const MAX_TURN_ACTIONS: usize = 64;

/// Summary of one automated turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AiTurn {
    pub actions: usize,
    pub round_ended: Option<ScoreEntry>,
}

impl GameFlowService {
    /// Play the session's whole turn with `ai`: one draw, then plays until a
    /// discard or the round ends. No-op when it is not our turn.
    pub async fn play_ai_turn(
        &self,
        session: &mut GameSession,
        ai: &dyn AiPlayer,
    ) -> Result<AiTurn, AppError> {
        let mut turn = AiTurn::default();
        session.refresh()?;

        while turn.actions < MAX_TURN_ACTIONS {
            let Some(view) = session.turn_view() else {
                return Ok(turn);
            };
            let outcome: ActionOutcome = match view.phase {
                TurnPhase::Draw => match ai.choose_draw(&view)? {
                    DrawChoice::Deck => self.draw_from_deck(session).await?,
                    DrawChoice::Discard(index) => self.pick_up_discard(session, index).await?,
                },
                TurnPhase::Play => {
                    let choice = ai.choose_play(&view)?;
                    debug!(game_id = %session.game_id, slot = %session.slot, ?choice, "ai play");
                    let ends_turn = matches!(choice, PlayChoice::Discard(_));
                    let outcome = match choice {
                        PlayChoice::LayDown(cards) => self.lay_down_meld(session, &cards).await?,
                        PlayChoice::LayOff(card, target) => {
                            self.lay_off(session, card, target).await?
                        }
                        PlayChoice::Discard(card) => self.discard(session, card).await?,
                    };
                    if ends_turn && outcome.round_ended.is_none() {
                        turn.actions += 1;
                        return Ok(turn);
                    }
                    outcome
                }
            };
            turn.actions += 1;
            if outcome.round_ended.is_some() {
                info!(game_id = %session.game_id, slot = %session.slot, "ai went out");
                turn.round_ended = outcome.round_ended;
                return Ok(turn);
            }
            session.refresh()?;
        }
        Err(AppError::internal(format!(
            "AI turn exceeded {MAX_TURN_ACTIONS} actions"
        )))
    }
}
