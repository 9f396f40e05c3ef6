//! Card-level helpers: point values, display labels, asset keys, hand ordering.

use serde::{Deserialize, Serialize};

use super::cards_types::{Card, Rank, Suit};

/// Point value of a single card: Ace 15, ten and faces 10, everything else 5.
pub fn card_points(card: Card) -> i32 {
    match card.rank {
        Rank::Ace => 15,
        Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
        _ => 5,
    }
}

pub fn sum_points(cards: &[Card]) -> i32 {
    cards.iter().copied().map(card_points).sum()
}

/// Short label with the suit symbol, e.g. `10♣`.
pub fn display_name(card: Card) -> String {
    format!("{}{}", card.rank.label(), card.suit.symbol())
}

/// Image asset key for a card face, e.g. `cards/club_1.png` for the ace of clubs.
pub fn asset_key(card: Card) -> String {
    let suit = match card.suit {
        Suit::Clubs => "club",
        Suit::Diamonds => "diamond",
        Suit::Hearts => "heart",
        Suit::Spades => "spade",
    };
    let rank = match card.rank {
        Rank::Ace => "1",
        Rank::Jack => "jack",
        Rank::Queen => "queen",
        Rank::King => "king",
        other => other.label(),
    };
    format!("cards/{suit}_{rank}.png")
}

/// Hand ordering a player can cycle through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Suit,
    Rank,
    Points,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::Suit => SortMode::Rank,
            SortMode::Rank => SortMode::Points,
            SortMode::Points => SortMode::Suit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Suit => "Sort: by Suit",
            SortMode::Rank => "Sort: by Rank",
            SortMode::Points => "Sort: by Points",
        }
    }
}

/// Returns a re-ordered copy of `cards`; the input is untouched.
pub fn sort_hand(cards: &[Card], mode: SortMode) -> Vec<Card> {
    let mut sorted = cards.to_vec();
    match mode {
        SortMode::Suit => sorted.sort(),
        SortMode::Rank => sorted.sort_by_key(|c| (c.rank, c.suit)),
        SortMode::Points => sorted.sort_by_key(|c| (card_points(*c), c.rank, c.suit)),
    }
    sorted
}
