//! Typed partial write against the shared game document.
//!
//! Every state-machine transition produces one `GameUpdate`. Fields left as
//! `None` are not touched by the write, which is how the turn hand-off is
//! omitted when a discard empties the hand.

use std::collections::BTreeMap;

use crate::domain::melds::Meld;
use crate::domain::scoring::ScoreEntry;
use crate::domain::state::{GameState, GameStatus, Player, PlayerSlot};
use crate::domain::Card;

/// Replace a single meld at `players/<owner>/melds/<index>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeldWrite {
    pub owner: PlayerSlot,
    pub index: usize,
    pub cards: Meld,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameUpdate {
    pub status: Option<GameStatus>,
    pub current_turn: Option<PlayerSlot>,
    pub dealer: Option<PlayerSlot>,
    pub round_number: Option<u32>,
    pub deck: Option<Vec<Card>>,
    pub discard: Option<Vec<Card>>,
    /// Seats a newly joined player wholesale.
    pub seat: Option<(PlayerSlot, Player)>,
    pub hands: BTreeMap<PlayerSlot, Vec<Card>>,
    /// Whole meld list per owner.
    pub melds: BTreeMap<PlayerSlot, Vec<Meld>>,
    pub meld_writes: Vec<MeldWrite>,
    pub scores: BTreeMap<PlayerSlot, i32>,
    pub score_history: Option<Vec<ScoreEntry>>,
    pub last_action: Option<String>,
}

impl GameUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: GameStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_current_turn(mut self, slot: PlayerSlot) -> Self {
        self.current_turn = Some(slot);
        self
    }

    pub fn with_dealer(mut self, slot: PlayerSlot) -> Self {
        self.dealer = Some(slot);
        self
    }

    pub fn with_round_number(mut self, round: u32) -> Self {
        self.round_number = Some(round);
        self
    }

    pub fn with_deck(mut self, deck: Vec<Card>) -> Self {
        self.deck = Some(deck);
        self
    }

    pub fn with_discard(mut self, discard: Vec<Card>) -> Self {
        self.discard = Some(discard);
        self
    }

    pub fn with_seat(mut self, slot: PlayerSlot, player: Player) -> Self {
        self.seat = Some((slot, player));
        self
    }

    pub fn with_hand(mut self, slot: PlayerSlot, hand: Vec<Card>) -> Self {
        self.hands.insert(slot, hand);
        self
    }

    pub fn with_melds(mut self, slot: PlayerSlot, melds: Vec<Meld>) -> Self {
        self.melds.insert(slot, melds);
        self
    }

    pub fn with_meld_write(mut self, owner: PlayerSlot, index: usize, cards: Meld) -> Self {
        self.meld_writes.push(MeldWrite {
            owner,
            index,
            cards,
        });
        self
    }

    pub fn with_score(mut self, slot: PlayerSlot, score: i32) -> Self {
        self.scores.insert(slot, score);
        self
    }

    pub fn with_score_history(mut self, history: Vec<ScoreEntry>) -> Self {
        self.score_history = Some(history);
        self
    }

    pub fn with_last_action(mut self, text: impl Into<String>) -> Self {
        self.last_action = Some(text.into());
        self
    }

    /// Drop the turn hand-off fields so the write leaves phase and turn alone.
    pub fn without_turn_handoff(mut self) -> Self {
        self.status = None;
        self.current_turn = None;
        self
    }

    /// Apply the same field writes the store would, to a local copy.
    ///
    /// The mirror is never updated this way in the live protocol; this exists for
    /// engine-only drivers and for checking that a move is self-consistent.
    pub fn apply_to(&self, state: &mut GameState, timestamp: Option<i64>) {
        if let Some((slot, player)) = &self.seat {
            match slot {
                PlayerSlot::Player1 => state.player1 = player.clone(),
                PlayerSlot::Player2 => state.player2 = Some(player.clone()),
            }
        }
        if let Some(status) = self.status {
            state.status = status;
        }
        if let Some(turn) = self.current_turn {
            state.current_turn = Some(turn);
        }
        if let Some(dealer) = self.dealer {
            state.dealer = Some(dealer);
        }
        if let Some(round) = self.round_number {
            state.round_number = round;
        }
        if let Some(deck) = &self.deck {
            state.deck = deck.clone();
        }
        if let Some(discard) = &self.discard {
            state.discard = discard.clone();
        }
        for (slot, hand) in &self.hands {
            if let Some(player) = state.player_mut(*slot) {
                player.hand = hand.clone();
            }
        }
        for (slot, melds) in &self.melds {
            if let Some(player) = state.player_mut(*slot) {
                player.melds = melds.clone();
            }
        }
        for write in &self.meld_writes {
            if let Some(player) = state.player_mut(write.owner) {
                if write.index < player.melds.len() {
                    player.melds[write.index] = write.cards.clone();
                } else {
                    player.melds.push(write.cards.clone());
                }
            }
        }
        for (slot, score) in &self.scores {
            if let Some(player) = state.player_mut(*slot) {
                player.score = *score;
            }
        }
        if let Some(history) = &self.score_history {
            state.score_history = history.clone();
        }
        if let Some(text) = &self.last_action {
            state.last_action = Some(text.clone());
            state.last_action_time = timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::TurnPhase;

    #[test]
    fn without_turn_handoff_clears_only_turn_fields() {
        let update = GameUpdate::new()
            .with_status(GameStatus::Playing(TurnPhase::Draw))
            .with_current_turn(PlayerSlot::Player2)
            .with_discard(vec![])
            .with_last_action("x")
            .without_turn_handoff();
        assert_eq!(update.status, None);
        assert_eq!(update.current_turn, None);
        assert_eq!(update.discard, Some(vec![]));
        assert_eq!(update.last_action.as_deref(), Some("x"));
    }

    #[test]
    fn apply_seats_player_and_stamps_action() {
        let mut state = GameState::new_waiting("ABC234", Player::new("Ann", "t1"));
        GameUpdate::new()
            .with_seat(PlayerSlot::Player2, Player::new("Bob", "t2"))
            .with_last_action("Bob joined")
            .apply_to(&mut state, Some(42));
        assert_eq!(state.player2.as_ref().map(|p| p.name.as_str()), Some("Bob"));
        assert_eq!(state.last_action_time, Some(42));
    }
}
