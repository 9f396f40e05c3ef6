//! Round lifecycle transitions: first deal on join, scoring, and re-dealing.

use rand::Rng;
use tracing::info;

use crate::domain::dealing::deal_round;
use crate::domain::game_update::GameUpdate;
use crate::domain::scoring::{calculate_round_score, ScoreEntry};
use crate::domain::state::{require_player, GameState, GameStatus, Player, PlayerSlot, TurnPhase};
use crate::errors::domain::{DomainError, TransitionKind};

/// Seat the second player and deal round one.
///
/// The creator (player1) opens; the joiner is dealer.
pub fn join_and_deal<R: Rng + ?Sized>(
    state: &GameState,
    name: &str,
    token: &str,
    rng: &mut R,
) -> Result<GameUpdate, DomainError> {
    if state.status != GameStatus::Waiting {
        return Err(DomainError::illegal(
            TransitionKind::AlreadyStarted,
            "Game already started",
        ));
    }
    let deal = deal_round(rng)?;
    let [hand1, hand2] = deal.hands;

    let mut joiner = Player::new(name, token);
    joiner.hand = hand2;
    info!(game_id = %state.game_id, "second player joined, dealing round 1");

    Ok(GameUpdate::new()
        .with_status(GameStatus::Playing(TurnPhase::Draw))
        .with_deck(deal.deck)
        .with_discard(deal.discard)
        .with_current_turn(PlayerSlot::Player1)
        .with_dealer(PlayerSlot::Player2)
        .with_round_number(1)
        .with_hand(PlayerSlot::Player1, hand1)
        .with_seat(PlayerSlot::Player2, joiner)
        .with_score_history(Vec::new())
        .with_last_action(format!(
            "{name} joined! Cards dealt. {} goes first.",
            state.player1.name
        )))
}

/// Scores produced when a round closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub entry: ScoreEntry,
    pub update: GameUpdate,
}

/// Score both seats and freeze the round.
///
/// `state` must be freshly read from the store: hands and melds are taken
/// as-is and never from a client's stale mirror.
pub fn score_round(state: &GameState) -> Result<RoundResult, DomainError> {
    if !matches!(state.status, GameStatus::Playing(_)) {
        return Err(DomainError::illegal(
            TransitionKind::NotPlaying,
            "Round is not in play",
        ));
    }
    let p1 = require_player(state, PlayerSlot::Player1)?;
    let p2 = require_player(state, PlayerSlot::Player2)?;

    let entry = ScoreEntry {
        round: state.round_number,
        player1_delta: calculate_round_score(&p1.melds, &p1.hand),
        player2_delta: calculate_round_score(&p2.melds, &p2.hand),
    };
    let mut history = state.score_history.clone();
    history.push(entry);
    info!(
        game_id = %state.game_id,
        round = entry.round,
        player1 = entry.player1_delta,
        player2 = entry.player2_delta,
        "round scored"
    );

    let update = GameUpdate::new()
        .with_status(GameStatus::RoundOver)
        .with_score_history(history)
        .with_score(PlayerSlot::Player1, p1.score + entry.player1_delta)
        .with_score(PlayerSlot::Player2, p2.score + entry.player2_delta);
    Ok(RoundResult { entry, update })
}

/// Deal the next round: dealer alternates, the non-dealer opens, melds reset.
pub fn start_new_round<R: Rng + ?Sized>(
    state: &GameState,
    rng: &mut R,
) -> Result<GameUpdate, DomainError> {
    if state.status != GameStatus::RoundOver {
        return Err(DomainError::illegal(
            TransitionKind::NotRoundOver,
            "The current round has not ended",
        ));
    }
    let dealer = state.dealer.unwrap_or(PlayerSlot::Player2).other();
    let opener = dealer.other();
    let round = state.round_number + 1;
    let deal = deal_round(rng)?;
    let [hand1, hand2] = deal.hands;
    info!(game_id = %state.game_id, round, dealer = %dealer, "dealing new round");

    Ok(GameUpdate::new()
        .with_status(GameStatus::Playing(TurnPhase::Draw))
        .with_deck(deal.deck)
        .with_discard(deal.discard)
        .with_current_turn(opener)
        .with_dealer(dealer)
        .with_round_number(round)
        .with_hand(PlayerSlot::Player1, hand1)
        .with_melds(PlayerSlot::Player1, Vec::new())
        .with_hand(PlayerSlot::Player2, hand2)
        .with_melds(PlayerSlot::Player2, Vec::new())
        .with_last_action(format!("Round {round} - Cards dealt!")))
}
