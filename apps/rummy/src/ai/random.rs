//! Random AI player - makes random legal moves.

use parking_lot::Mutex;
use rand::prelude::*;
use rand_chacha::ChaCha20Rng;

use super::trait_def::{AiError, AiPlayer, DrawChoice, PlayChoice};
use crate::domain::player_view::TurnView;

/// AI that chooses uniformly among the options `TurnView` offers.
///
/// Seeded players are deterministic; unseeded ones draw from OS entropy.
pub struct RandomPlayer {
    rng: Mutex<ChaCha20Rng>,
}

impl RandomPlayer {
    pub const NAME: &'static str = "RandomPlayer";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha20Rng::seed_from_u64(s),
            None => ChaCha20Rng::from_rng(&mut rand::rng()),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl AiPlayer for RandomPlayer {
    fn choose_draw(&self, view: &TurnView) -> Result<DrawChoice, AiError> {
        let mut options: Vec<DrawChoice> = view
            .legal_pickups()
            .into_iter()
            .map(DrawChoice::Discard)
            .collect();
        if view.can_draw_from_deck() {
            options.push(DrawChoice::Deck);
        }
        if options.is_empty() {
            return Err(AiError::InvalidMove("Nothing to draw".into()));
        }

        let mut rng = self.rng.lock();
        options
            .choose(&mut *rng)
            .copied()
            .ok_or_else(|| AiError::Internal("Failed to choose a draw".into()))
    }

    fn choose_play(&self, view: &TurnView) -> Result<PlayChoice, AiError> {
        let mut options: Vec<PlayChoice> = view
            .meld_options()
            .into_iter()
            .map(PlayChoice::LayDown)
            .collect();
        options.extend(
            view.lay_off_options()
                .into_iter()
                .map(|(card, target)| PlayChoice::LayOff(card, target)),
        );
        options.extend(view.discard_options().into_iter().map(PlayChoice::Discard));
        if options.is_empty() {
            return Err(AiError::InvalidMove("No legal plays available".into()));
        }

        let mut rng = self.rng.lock();
        options
            .choose(&mut *rng)
            .cloned()
            .ok_or_else(|| AiError::Internal("Failed to choose a play".into()))
    }
}
