//! Domain-level error type used across the engine and the service layer.
//!
//! This error type is transport-agnostic. Services return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Shape or rule failures that are recovered locally; no write is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    TooFewCards,
    DuplicateSuit,
    SetTooLarge,
    NotSequential,
    MixedRankAndSuit,
    RunTooLong,
    DoesNotExtend,
    CardNotInHand,
    ParseCard,
    MustPlayOutstanding,
    NothingToDraw,
    HandNotEmpty,
    InvalidIndex,
    EmptyName,
    EmptyCode,
}

/// Actions attempted outside their legal status/phase/turn.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionKind {
    NotYourTurn,
    PhaseMismatch,
    NotPlaying,
    NotRoundOver,
    AlreadyStarted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Token,
    Player,
    Resume,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Connectivity,
    DataCorruption,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Meld/lay-off shape or business rule violation; detail is the user-facing reason
    Validation(ValidationKind, String),
    /// Action outside the legal phase or turn
    IllegalTransition(TransitionKind, String),
    /// Unknown game code, token, or seat
    NotFound(NotFoundKind, String),
    /// Transport or stored-data failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(_, d) => write!(f, "{d}"),
            DomainError::IllegalTransition(kind, d) => write!(f, "illegal {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn illegal(kind: TransitionKind, detail: impl Into<String>) -> Self {
        Self::IllegalTransition(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Human-readable detail without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            DomainError::Validation(_, d)
            | DomainError::IllegalTransition(_, d)
            | DomainError::NotFound(_, d)
            | DomainError::Infra(_, d) => d,
        }
    }
}
