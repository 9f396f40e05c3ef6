//! Fixed rule constants for two-player rummy.

pub const PLAYERS: usize = 2;
pub const DECK_SIZE: usize = 52;
pub const HAND_SIZE: usize = 7;

/// Length of the circular rank sequence (A..K).
pub const RANK_CYCLE: u8 = 13;

pub const MIN_MELD_SIZE: usize = 3;
pub const MAX_SET_SIZE: usize = 4;
