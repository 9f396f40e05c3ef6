//! What the seat holding the turn can see, plus legal-move helpers.
//!
//! `TurnView` is the interface between the engine and automated players.
//! The helpers only ever offer moves the turn functions would accept, and
//! while a must-play card is outstanding every meld/lay-off option includes it.

use crate::domain::melds::{is_valid_meld, validate_lay_off, Meld};
use crate::domain::rules::MIN_MELD_SIZE;
use crate::domain::state::{require_player, GameState, PlayerSlot, TurnPhase};
use crate::domain::turns::MeldRef;
use crate::domain::Card;
use crate::errors::domain::{DomainError, TransitionKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnView {
    pub slot: PlayerSlot,
    pub phase: TurnPhase,
    pub hand: Vec<Card>,
    /// Last element is the top of the pile.
    pub discard: Vec<Card>,
    pub deck_len: usize,
    /// Every meld on the table with its address.
    pub table: Vec<(MeldRef, Meld)>,
    pub must_play: Option<Card>,
    pub opponent_hand_len: usize,
    pub round_number: u32,
}

impl TurnView {
    /// Build the view for `slot`, which must hold the turn.
    pub fn for_turn(
        state: &GameState,
        slot: PlayerSlot,
        must_play: Option<Card>,
    ) -> Result<Self, DomainError> {
        let phase = state.phase().ok_or_else(|| {
            DomainError::illegal(TransitionKind::NotPlaying, "Round is not in play")
        })?;
        if !state.is_turn_of(slot) {
            return Err(DomainError::illegal(
                TransitionKind::NotYourTurn,
                "Not your turn",
            ));
        }
        let player = require_player(state, slot)?;
        let opponent = require_player(state, slot.other())?;

        let mut table = Vec::new();
        for owner in PlayerSlot::ALL {
            if let Some(p) = state.player(owner) {
                for (index, meld) in p.melds.iter().enumerate() {
                    table.push((MeldRef { owner, index }, meld.clone()));
                }
            }
        }

        Ok(Self {
            slot,
            phase,
            hand: player.hand.clone(),
            discard: state.discard.clone(),
            deck_len: state.deck.len(),
            table,
            must_play,
            opponent_hand_len: opponent.hand.len(),
            round_number: state.round_number,
        })
    }

    /// Drawing from the stock needs either stock or enough discard to rebuild it.
    pub fn can_draw_from_deck(&self) -> bool {
        self.deck_len > 0 || self.discard.len() > 1
    }

    /// Discard indices worth picking up.
    ///
    /// The top card is always offered. A deeper pickup is offered only when
    /// the deepest card could be played immediately afterwards.
    pub fn legal_pickups(&self) -> Vec<usize> {
        let len = self.discard.len();
        let mut out = Vec::new();
        for index in 0..len {
            if index + 1 == len {
                out.push(index);
                continue;
            }
            let required = self.discard[index];
            let mut hand = self.hand.clone();
            hand.extend_from_slice(&self.discard[index..]);
            let playable = find_meld_containing(&hand, required).is_some()
                || self
                    .table
                    .iter()
                    .any(|(_, meld)| validate_lay_off(required, meld).is_ok());
            if playable {
                out.push(index);
            }
        }
        out
    }

    /// Three-card melds available from the hand.
    pub fn meld_options(&self) -> Vec<Vec<Card>> {
        let all = three_card_melds(&self.hand);
        match self.must_play {
            Some(required) => all.into_iter().filter(|m| m.contains(&required)).collect(),
            None => all,
        }
    }

    pub fn lay_off_options(&self) -> Vec<(Card, MeldRef)> {
        let mut out = Vec::new();
        for card in &self.hand {
            if self.must_play.is_some_and(|required| required != *card) {
                continue;
            }
            for (target, meld) in &self.table {
                if validate_lay_off(*card, meld).is_ok() {
                    out.push((*card, *target));
                }
            }
        }
        out
    }

    /// Empty while a must-play card is outstanding.
    pub fn discard_options(&self) -> Vec<Card> {
        if self.must_play.is_some() {
            Vec::new()
        } else {
            self.hand.clone()
        }
    }
}

/// Every valid three-card meld in `hand`, in hand order.
pub fn three_card_melds(hand: &[Card]) -> Vec<Vec<Card>> {
    let mut out = Vec::new();
    let n = hand.len();
    if n < MIN_MELD_SIZE {
        return out;
    }
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let candidate = [hand[i], hand[j], hand[k]];
                if is_valid_meld(&candidate) {
                    out.push(candidate.to_vec());
                }
            }
        }
    }
    out
}

/// Any valid three-card meld in `hand` that includes `required`.
///
/// A card that belongs to a longer set or run is always part of some
/// three-card meld, so checking triples is enough.
pub fn find_meld_containing(hand: &[Card], required: Card) -> Option<Vec<Card>> {
    let others: Vec<Card> = hand.iter().copied().filter(|c| *c != required).collect();
    for i in 0..others.len() {
        for j in (i + 1)..others.len() {
            let candidate = [required, others[i], others[j]];
            if is_valid_meld(&candidate) {
                return Some(candidate.to_vec());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::GameStatus;
    use crate::domain::test_state_helpers::{card, cards, playing_state};

    #[test]
    fn deep_pickup_offered_only_when_playable() {
        // 10C can join JC QC from the hand; 4H cannot go anywhere.
        let state = playing_state(&["JC", "QC", "2S"], &["5D"], &["6D"], &["10C", "4H", "9D"]);
        let view = TurnView::for_turn(&state, PlayerSlot::Player1, None).unwrap();
        assert_eq!(view.legal_pickups(), vec![0, 2]);
    }

    #[test]
    fn must_play_filters_options() {
        let mut state = playing_state(
            &["JC", "QC", "10C", "7S", "7H", "7D"],
            &["5D"],
            &["6D"],
            &[],
        );
        state.status = GameStatus::Playing(TurnPhase::Play);
        let view = TurnView::for_turn(&state, PlayerSlot::Player1, Some(card("10C"))).unwrap();
        assert_eq!(view.meld_options(), vec![cards(&["JC", "QC", "10C"])]);
        assert!(view.discard_options().is_empty());

        let free = TurnView { must_play: None, ..view };
        assert_eq!(free.meld_options().len(), 2);
        assert_eq!(free.discard_options().len(), 6);
    }

    #[test]
    fn lay_off_options_cover_opponent_melds() {
        let mut state = playing_state(&["8H", "2C"], &["5D"], &["6D"], &["3S"]);
        state.status = GameStatus::Playing(TurnPhase::Play);
        if let Some(p2) = state.player2.as_mut() {
            p2.melds.push(cards(&["8C", "8D", "8S"]));
        }
        let view = TurnView::for_turn(&state, PlayerSlot::Player1, None).unwrap();
        assert_eq!(
            view.lay_off_options(),
            vec![(
                card("8H"),
                MeldRef {
                    owner: PlayerSlot::Player2,
                    index: 0
                }
            )]
        );
    }

    #[test]
    fn view_requires_turn() {
        let state = playing_state(&["2C"], &["5D"], &["6D"], &["3S"]);
        assert!(TurnView::for_turn(&state, PlayerSlot::Player2, None).is_err());
    }

    #[test]
    fn find_meld_uses_wrapping_runs() {
        let hand = cards(&["KS", "3S", "9D"]);
        assert_eq!(find_meld_containing(&hand, card("AS")), None);
        let hand = cards(&["KS", "2S", "AS", "9D"]);
        assert_eq!(
            find_meld_containing(&hand, card("AS")),
            Some(cards(&["AS", "KS", "2S"]))
        );
    }
}
