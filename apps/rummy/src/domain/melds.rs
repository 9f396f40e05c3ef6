//! Meld validation: sets, circular runs, lay-offs, and display ordering.
//!
//! A run lives on a circular rank sequence of 13 steps, so Q-K-A and K-A-2
//! are both legal. The decision rule tries every rotation of the sorted
//! distinct rank indices and accepts when one rotation steps by exactly one
//! (mod 13) all the way through.

use std::collections::HashSet;

use super::cards_logic::display_name;
use super::cards_types::{Card, Rank, Suit};
use super::rules::{MAX_SET_SIZE, MIN_MELD_SIZE, RANK_CYCLE};
use crate::errors::domain::{DomainError, ValidationKind};

/// Ordered cards on the table. Only grows by lay-off.
pub type Meld = Vec<Card>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeldKind {
    Set,
    Run,
}

pub fn is_valid_set(cards: &[Card]) -> bool {
    if !(MIN_MELD_SIZE..=MAX_SET_SIZE).contains(&cards.len()) {
        return false;
    }
    let rank = cards[0].rank;
    if cards.iter().any(|c| c.rank != rank) {
        return false;
    }
    let suits: HashSet<Suit> = cards.iter().map(|c| c.suit).collect();
    suits.len() == cards.len()
}

pub fn is_valid_run(cards: &[Card]) -> bool {
    if cards.len() < MIN_MELD_SIZE || cards.len() >= RANK_CYCLE as usize {
        return false;
    }
    let suit = cards[0].suit;
    if cards.iter().any(|c| c.suit != suit) {
        return false;
    }

    let mut indices: Vec<u8> = cards.iter().map(|c| c.rank.index()).collect();
    indices.sort_unstable();
    indices.dedup();
    if indices.len() != cards.len() {
        return false;
    }

    let n = indices.len();
    (0..n).any(|start| {
        (1..n).all(|step| {
            let prev = indices[(start + step - 1) % n];
            let curr = indices[(start + step) % n];
            (curr + RANK_CYCLE - prev) % RANK_CYCLE == 1
        })
    })
}

pub fn is_valid_meld(cards: &[Card]) -> bool {
    is_valid_set(cards) || is_valid_run(cards)
}

/// Classify `cards` as a set or run, or explain why it is neither.
pub fn validate_meld(cards: &[Card]) -> Result<MeldKind, DomainError> {
    if cards.len() < MIN_MELD_SIZE {
        return Err(DomainError::validation(
            ValidationKind::TooFewCards,
            "Need at least 3 cards to lay down",
        ));
    }
    if is_valid_set(cards) {
        return Ok(MeldKind::Set);
    }
    if is_valid_run(cards) {
        return Ok(MeldKind::Run);
    }

    let ranks: HashSet<Rank> = cards.iter().map(|c| c.rank).collect();
    let suits: HashSet<Suit> = cards.iter().map(|c| c.suit).collect();

    if ranks.len() == 1 {
        if cards.len() > MAX_SET_SIZE {
            return Err(DomainError::validation(
                ValidationKind::SetTooLarge,
                "A set can have at most 4 cards (one per suit)",
            ));
        }
        return Err(DomainError::validation(
            ValidationKind::DuplicateSuit,
            format!(
                "Duplicate suits in set, need different suits for {}",
                cards[0].rank.label()
            ),
        ));
    }
    if suits.len() == 1 && ranks.len() == cards.len() && cards.len() >= RANK_CYCLE as usize {
        return Err(DomainError::validation(
            ValidationKind::RunTooLong,
            "A run can have at most 12 cards",
        ));
    }
    if suits.len() == 1 {
        return Err(DomainError::validation(
            ValidationKind::NotSequential,
            format!("Same suit ({}) but not in sequence", cards[0].suit.name()),
        ));
    }
    Err(DomainError::validation(
        ValidationKind::MixedRankAndSuit,
        "Mixed ranks and suits, need all same rank (set) or all same suit in order (run)",
    ))
}

/// A lay-off is legal iff `meld` plus `card` is still a set or a run.
pub fn validate_lay_off(card: Card, meld: &[Card]) -> Result<MeldKind, DomainError> {
    let mut extended = meld.to_vec();
    extended.push(card);
    if is_valid_set(&extended) {
        return Ok(MeldKind::Set);
    }
    if is_valid_run(&extended) {
        return Ok(MeldKind::Run);
    }
    Err(DomainError::validation(
        ValidationKind::DoesNotExtend,
        format!("{} doesn't extend this meld", display_name(card)),
    ))
}

/// Order a meld for left-to-right display.
///
/// Sets follow the fixed suit order. Runs start right after the largest
/// circular gap between consecutive rank indices, so Q-K-A renders as
/// Q-K-A rather than A-Q-K.
pub fn sort_meld_for_display(cards: &[Card]) -> Vec<Card> {
    let mut sorted = cards.to_vec();
    if sorted.len() <= 1 {
        return sorted;
    }

    let first_rank = sorted[0].rank;
    if sorted.iter().all(|c| c.rank == first_rank) {
        sorted.sort_by_key(|c| c.suit);
        return sorted;
    }

    sorted.sort_by_key(|c| c.rank.index());
    let n = sorted.len();
    let mut best_start = 0;
    let mut max_gap = 0;
    for i in 0..n {
        let next = (i + 1) % n;
        let gap = (sorted[next].rank.index() + RANK_CYCLE - sorted[i].rank.index()) % RANK_CYCLE;
        if gap > max_gap {
            max_gap = gap;
            best_start = next;
        }
    }
    sorted.rotate_left(best_start);
    sorted
}
