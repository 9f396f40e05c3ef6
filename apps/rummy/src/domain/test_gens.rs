// Proptest generators for domain types.
// These generators ensure unique cards and valid meld shapes for property-based testing.

use proptest::prelude::*;

use crate::domain::dealing::{create_deck, shuffle_with_seed};
use crate::domain::rules::RANK_CYCLE;
use crate::domain::{Card, Rank, Suit};

/// Generate a random Suit
pub fn suit() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Clubs),
        Just(Suit::Diamonds),
        Just(Suit::Hearts),
        Just(Suit::Spades),
    ]
}

/// Generate a random Rank
pub fn rank() -> impl Strategy<Value = Rank> {
    (0usize..13).prop_map(|i| Rank::ALL[i])
}

/// Generate a single Card
pub fn card() -> impl Strategy<Value = Card> {
    (suit(), rank()).prop_map(|(suit, rank)| Card { suit, rank })
}

/// Generate a circular run: suit, starting rank index, and length 3..=12,
/// returned in a shuffled order.
pub fn shuffled_run() -> impl Strategy<Value = (Suit, u8, Vec<Card>)> {
    (suit(), 0u8..RANK_CYCLE, 3u8..RANK_CYCLE).prop_flat_map(|(suit, start, len)| {
        let run: Vec<Card> = (0..len)
            .map(|k| Card {
                suit,
                rank: Rank::ALL[((start + k) % RANK_CYCLE) as usize],
            })
            .collect();
        (Just(suit), Just(start), Just(run).prop_shuffle())
    })
}

/// Generate a set of 3 or 4 cards sharing a rank, in shuffled suit order.
pub fn shuffled_set() -> impl Strategy<Value = Vec<Card>> {
    (rank(), 3usize..=4).prop_flat_map(|(rank, size)| {
        Just(Suit::ALL.to_vec())
            .prop_shuffle()
            .prop_map(move |suits| {
                suits
                    .into_iter()
                    .take(size)
                    .map(|suit| Card { suit, rank })
                    .collect::<Vec<_>>()
            })
    })
}

/// Generate `count` distinct cards drawn from a seeded shuffle of the deck.
pub fn unique_cards(count: usize) -> impl Strategy<Value = Vec<Card>> {
    any::<u64>().prop_map(move |seed| {
        shuffle_with_seed(&create_deck(), seed)
            .into_iter()
            .take(count)
            .collect()
    })
}

/// Generate up to `max` distinct cards.
pub fn unique_cards_up_to(max: usize) -> impl Strategy<Value = Vec<Card>> {
    (0..=max).prop_flat_map(unique_cards)
}
