//! Domain layer: pure rules engine and turn state machine.

pub mod cards_logic;
pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod dealing;
pub mod game_update;
pub mod melds;
pub mod player_view;

pub mod game_transition;
pub mod round;
pub mod rules;
pub mod scoring;
pub mod state;
#[cfg(test)]
pub(crate) mod test_state_helpers;
pub mod turns;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_props_conservation;
#[cfg(test)]
mod tests_props_melds;
#[cfg(test)]
mod tests_props_dealing;

// Re-exports for ergonomics
pub use cards_logic::{card_points, display_name, sort_hand, SortMode};
pub use cards_types::{Card, Rank, Suit};
pub use dealing::{create_deck, shuffle_deck};
pub use game_transition::{derive_game_transitions, GameTransition};
pub use game_update::GameUpdate;
pub use melds::{
    is_valid_meld, is_valid_run, is_valid_set, sort_meld_for_display, validate_lay_off,
    validate_meld, Meld, MeldKind,
};
pub use player_view::TurnView;
pub use scoring::{calculate_round_score, ScoreEntry, Standings};
pub use state::{GameState, GameStatus, Player, PlayerSlot, TurnPhase};
pub use turns::{MeldRef, Move};
