//! Card parsing from canonical identifiers (e.g., "AS", "10C", "QH")

use std::str::FromStr;

use super::cards_types::{Card, Rank, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || DomainError::validation(ValidationKind::ParseCard, format!("Parse card: {s}"));

        let suit_ch = s.chars().last().ok_or_else(parse_err)?;
        let suit = Suit::from_letter(suit_ch).ok_or_else(parse_err)?;
        let rank_str = &s[..s.len() - suit_ch.len_utf8()];
        let rank = Rank::from_label(rank_str).ok_or_else(parse_err)?;
        Ok(Card { suit, rank })
    }
}

/// Non-panicking helper to parse card tokens (e.g., "AS", "10C") into Card instances.
/// Returns Result<Vec<Card>, DomainError> if any token is invalid.
pub fn try_parse_cards<I, S>(tokens: I) -> Result<Vec<Card>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|s| s.as_ref().parse::<Card>())
        .collect()
}
