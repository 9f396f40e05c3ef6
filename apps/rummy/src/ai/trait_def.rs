//! AI player trait definition.

use std::fmt;

use crate::domain::player_view::TurnView;
use crate::domain::turns::MeldRef;
use crate::domain::Card;
use crate::error::AppError;

/// Errors that can occur during AI decision-making.
#[derive(Debug)]
pub enum AiError {
    /// AI encountered an internal error
    Internal(String),
    /// No legal option was available to choose from
    InvalidMove(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Internal(msg) => write!(f, "AI internal error: {msg}"),
            AiError::InvalidMove(msg) => write!(f, "AI invalid move: {msg}"),
        }
    }
}

impl std::error::Error for AiError {}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        AppError::internal(format!("AI error: {err}"))
    }
}

/// How to open a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawChoice {
    Deck,
    /// Take the discard pile from this index to the top.
    Discard(usize),
}

/// One action in the play phase. Only `Discard` ends the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayChoice {
    LayDown(Vec<Card>),
    LayOff(Card, MeldRef),
    Discard(Card),
}

/// Trait for AI players.
///
/// Implementations receive the view of the seat holding the turn and must
/// choose from the options its helpers offer.
pub trait AiPlayer: Send + Sync {
    /// Choose where to draw from. Called in the draw phase.
    fn choose_draw(&self, view: &TurnView) -> Result<DrawChoice, AiError>;

    /// Choose the next play-phase action. Called repeatedly until a discard.
    fn choose_play(&self, view: &TurnView) -> Result<PlayChoice, AiError>;
}
