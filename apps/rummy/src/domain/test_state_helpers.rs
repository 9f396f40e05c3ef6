//! Shared helpers for building GameState fixtures in unit tests.

use crate::domain::cards_parsing::try_parse_cards;
use crate::domain::state::{GameState, GameStatus, Player, PlayerSlot, TurnPhase};
use crate::domain::Card;

pub fn card(token: &str) -> Card {
    token.parse().expect("hardcoded card token")
}

pub fn cards(tokens: &[&str]) -> Vec<Card> {
    try_parse_cards(tokens).expect("hardcoded card tokens")
}

/// Round in progress: player1 ("Ann") to draw, player2 ("Bob") dealt.
///
/// Card sets are not required to cover the full deck.
pub fn playing_state(hand1: &[&str], hand2: &[&str], deck: &[&str], discard: &[&str]) -> GameState {
    let mut p1 = Player::new("Ann", "token-ann");
    p1.hand = cards(hand1);
    let mut p2 = Player::new("Bob", "token-bob");
    p2.hand = cards(hand2);

    let mut state = GameState::new_waiting("TEST23", p1);
    state.player2 = Some(p2);
    state.status = GameStatus::Playing(TurnPhase::Draw);
    state.current_turn = Some(PlayerSlot::Player1);
    state.dealer = Some(PlayerSlot::Player2);
    state.deck = cards(deck);
    state.discard = cards(discard);
    state
}
