use serde::{Deserialize, Serialize};

use crate::domain::cards_logic::sum_points;
use crate::domain::melds::Meld;
use crate::domain::state::PlayerSlot;
use crate::domain::Card;

/// Points on the table minus points still in hand. May be negative.
pub fn calculate_round_score(melds: &[Meld], hand: &[Card]) -> i32 {
    let meld_points: i32 = melds.iter().map(|m| sum_points(m)).sum();
    meld_points - sum_points(hand)
}

/// One archived round in `scoreHistory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub round: u32,
    #[serde(rename = "player1")]
    pub player1_delta: i32,
    #[serde(rename = "player2")]
    pub player2_delta: i32,
}

impl ScoreEntry {
    pub fn delta(&self, slot: PlayerSlot) -> i32 {
        match slot {
            PlayerSlot::Player1 => self.player1_delta,
            PlayerSlot::Player2 => self.player2_delta,
        }
    }
}

/// Running totals derived from the score history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standings {
    pub player1_total: i32,
    pub player2_total: i32,
}

impl Standings {
    pub fn from_history(history: &[ScoreEntry]) -> Self {
        history.iter().fold(
            Standings {
                player1_total: 0,
                player2_total: 0,
            },
            |acc, entry| Standings {
                player1_total: acc.player1_total + entry.player1_delta,
                player2_total: acc.player2_total + entry.player2_delta,
            },
        )
    }

    /// Leading seat and margin; `None` when tied.
    pub fn leader(&self) -> Option<(PlayerSlot, i32)> {
        let delta = self.player1_total - self.player2_total;
        match delta {
            0 => None,
            d if d > 0 => Some((PlayerSlot::Player1, d)),
            d => Some((PlayerSlot::Player2, -d)),
        }
    }
}
