//! Deck construction, shuffling, and round dealing.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::domain::rules::{HAND_SIZE, PLAYERS};
use crate::domain::{Card, Rank, Suit};
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Generate a full 52-card deck in suit-major, rank-minor order (AC, 2C, .. KS).
pub fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// Fisher-Yates shuffle into a new vector; `deck` is not modified.
pub fn shuffle_deck<R: Rng + ?Sized>(deck: &[Card], rng: &mut R) -> Vec<Card> {
    let mut shuffled = deck.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

/// Deterministic shuffle for replays and tests.
pub fn shuffle_with_seed(deck: &[Card], seed: u64) -> Vec<Card> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    shuffle_deck(deck, &mut rng)
}

/// Cards laid out at the start of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    /// Indexed by seat: player1 first.
    pub hands: [Vec<Card>; PLAYERS],
    /// Single face-up card that opens the discard pile.
    pub discard: Vec<Card>,
    /// Remaining stock; index 0 is drawn next.
    pub deck: Vec<Card>,
}

/// Shuffle a fresh deck and deal seven cards to each seat (player1 first),
/// then flip one card to start the discard pile.
pub fn deal_round<R: Rng + ?Sized>(rng: &mut R) -> Result<Deal, DomainError> {
    let mut deck = shuffle_deck(&create_deck(), rng).into_iter();

    let hand1: Vec<Card> = deck.by_ref().take(HAND_SIZE).collect();
    let hand2: Vec<Card> = deck.by_ref().take(HAND_SIZE).collect();
    let first = deck.next().ok_or_else(|| {
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            "Deck exhausted while dealing",
        )
    })?;

    Ok(Deal {
        hands: [hand1, hand2],
        discard: vec![first],
        deck: deck.collect(),
    })
}
