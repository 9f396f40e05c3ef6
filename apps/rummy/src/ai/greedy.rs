//! Greedy - a deterministic baseline that banks points as early as it can.
//!
//! Draw: take the top discard when it plays at once, take a short playable
//! run of the pile when one is offered, otherwise draw from the deck.
//!
//! Play: lay down the richest meld, then lay off, then discard the most
//! expensive card left in hand.

use crate::ai::{AiError, AiPlayer, DrawChoice, PlayChoice};
use crate::domain::cards_logic::{card_points, sum_points};
use crate::domain::melds::validate_lay_off;
use crate::domain::player_view::{find_meld_containing, TurnView};

/// Longest deep pickup the greedy player will take.
const MAX_PICKUP: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Greedy {
    pub const NAME: &'static str = "Greedy";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new() -> Self {
        Self
    }

    fn top_plays_now(view: &TurnView) -> bool {
        let Some(top) = view.discard.last().copied() else {
            return false;
        };
        let mut hand = view.hand.clone();
        hand.push(top);
        find_meld_containing(&hand, top).is_some()
            || view
                .table
                .iter()
                .any(|(_, meld)| validate_lay_off(top, meld).is_ok())
    }
}

impl AiPlayer for Greedy {
    fn choose_draw(&self, view: &TurnView) -> Result<DrawChoice, AiError> {
        let pickups = view.legal_pickups();
        let top = view.discard.len().checked_sub(1);

        if let Some(top) = top {
            if Self::top_plays_now(view) && pickups.contains(&top) {
                return Ok(DrawChoice::Discard(top));
            }
        }
        let short_deep = pickups
            .iter()
            .copied()
            .filter(|i| Some(*i) != top)
            .filter(|i| view.discard.len() - i <= MAX_PICKUP)
            .min_by_key(|i| view.discard.len() - i);
        if let Some(index) = short_deep {
            return Ok(DrawChoice::Discard(index));
        }
        if view.can_draw_from_deck() {
            return Ok(DrawChoice::Deck);
        }
        pickups
            .last()
            .copied()
            .map(DrawChoice::Discard)
            .ok_or_else(|| AiError::InvalidMove("Nothing to draw".into()))
    }

    fn choose_play(&self, view: &TurnView) -> Result<PlayChoice, AiError> {
        if let Some(meld) = view
            .meld_options()
            .into_iter()
            .max_by_key(|meld| sum_points(meld))
        {
            return Ok(PlayChoice::LayDown(meld));
        }
        if let Some((card, target)) = view.lay_off_options().into_iter().next() {
            return Ok(PlayChoice::LayOff(card, target));
        }
        view.discard_options()
            .into_iter()
            .max_by_key(|card| (card_points(*card), card.rank))
            .map(PlayChoice::Discard)
            .ok_or_else(|| AiError::InvalidMove("No legal plays available".into()))
    }
}
