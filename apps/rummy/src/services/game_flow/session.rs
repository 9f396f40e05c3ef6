use tracing::{debug, warn};

use crate::domain::cards_logic::SortMode;
use crate::domain::game_transition::{derive_game_transitions, GameTransition};
use crate::domain::player_view::TurnView;
use crate::domain::scoring::Standings;
use crate::domain::state::{GameState, GameStatus, PlayerSlot};
use crate::domain::Card;
use crate::error::AppError;
use crate::sync::document::decode_game;
use crate::sync::store::Subscription;

/// One seat's live view of a game.
///
/// `mirror` is replaced wholesale by every pushed snapshot and never written
/// by actions directly. Transitions derived while an action folds snapshots
/// wait in `pending` until the next `refresh` or `next_change` hands them out.
pub struct GameSession {
    pub(super) game_id: String,
    pub(super) slot: PlayerSlot,
    pub(super) token: String,
    pub(super) game_path: String,
    pub(super) mirror: Option<GameState>,
    pub(super) must_play: Option<Card>,
    pub(super) sort_mode: SortMode,
    pending: Vec<GameTransition>,
    subscription: Subscription,
}

impl GameSession {
    pub(super) fn new(
        game_id: String,
        slot: PlayerSlot,
        token: String,
        game_path: String,
        subscription: Subscription,
    ) -> Self {
        Self {
            game_id,
            slot,
            token,
            game_path,
            mirror: None,
            must_play: None,
            sort_mode: SortMode::default(),
            pending: Vec::new(),
            subscription,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Last confirmed state, if a snapshot has arrived.
    pub fn state(&self) -> Option<&GameState> {
        self.mirror.as_ref()
    }

    /// Card picked up from deep in the discard that must be played this turn.
    pub fn must_play(&self) -> Option<Card> {
        self.must_play
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn is_my_turn(&self) -> bool {
        self.mirror
            .as_ref()
            .is_some_and(|state| state.is_turn_of(self.slot))
    }

    pub fn standings(&self) -> Option<Standings> {
        self.mirror
            .as_ref()
            .map(|state| Standings::from_history(&state.score_history))
    }

    /// Options for the acting seat, or `None` when it is not our turn.
    pub fn turn_view(&self) -> Option<TurnView> {
        let state = self.mirror.as_ref()?;
        if !state.is_turn_of(self.slot) {
            return None;
        }
        TurnView::for_turn(state, self.slot, self.must_play).ok()
    }

    /// Wait for the next pushed snapshot and fold it into the mirror.
    ///
    /// Returns every transition not yet handed out, oldest first.
    pub async fn next_change(&mut self) -> Result<Vec<GameTransition>, AppError> {
        let raw = self.subscription.next().await?;
        self.absorb(raw)?;
        self.fold_queued()?;
        Ok(std::mem::take(&mut self.pending))
    }

    /// Fold any snapshots already queued, without waiting.
    pub fn refresh(&mut self) -> Result<Vec<GameTransition>, AppError> {
        self.fold_queued()?;
        Ok(std::mem::take(&mut self.pending))
    }

    pub(super) fn require_state(&mut self) -> Result<GameState, AppError> {
        self.fold_queued()?;
        self.mirror.clone().ok_or_else(|| {
            AppError::not_found("GAME_NOT_FOUND", "Game not loaded yet".to_string())
        })
    }

    /// Each queued snapshot is diffed against its predecessor so no edge is lost.
    fn fold_queued(&mut self) -> Result<(), AppError> {
        while let Some(raw) = self.subscription.try_next() {
            self.absorb(raw)?;
        }
        Ok(())
    }

    fn absorb(&mut self, raw: Option<serde_json::Value>) -> Result<(), AppError> {
        let decoded = decode_game(&self.game_id, raw)?;
        let Some(after) = decoded else {
            warn!(game_id = %self.game_id, slot = %self.slot, "game document removed");
            self.mirror = None;
            self.must_play = None;
            return Err(AppError::not_found(
                "GAME_NOT_FOUND",
                "Game no longer exists".to_string(),
            ));
        };

        let transitions = derive_game_transitions(self.mirror.as_ref(), &after);
        if !transitions.is_empty() {
            debug!(game_id = %self.game_id, slot = %self.slot, ?transitions, "mirror advanced");
            self.pending.extend(transitions);
        }
        let still_ours = matches!(after.status, GameStatus::Playing(_)) && after.is_turn_of(self.slot);
        if !still_ours {
            self.must_play = None;
        }
        self.mirror = Some(after);
        Ok(())
    }
}
