use thiserror::Error;

use crate::errors::domain::{
    DomainError, InfraErrorKind, NotFoundKind, TransitionKind, ValidationKind,
};
use crate::sync::store::StoreError;

/// Error returned by the client service layer.
///
/// Every variant is recoverable: the caller surfaces `notice()` and keeps its
/// last confirmed state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: &'static str, detail: String },
    #[error("Not allowed: {detail}")]
    Conflict { code: &'static str, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: &'static str, detail: String },
    #[error("Connection error: {detail}")]
    Unavailable { detail: String },
    #[error("Corrupt game data: {detail}")]
    Corrupt { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::NotFound { code, .. } => *code,
            AppError::Unavailable { .. } => "UNAVAILABLE",
            AppError::Corrupt { .. } => "CORRUPT_DATA",
            AppError::Config { .. } => "CONFIG_ERROR",
            AppError::Internal { .. } => "INTERNAL",
        }
    }

    /// Text to show the player.
    pub fn notice(&self) -> &str {
        match self {
            AppError::Validation { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Unavailable { detail }
            | AppError::Corrupt { detail }
            | AppError::Config { detail }
            | AppError::Internal { detail } => detail.as_str(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }

    pub fn internal(detail: String) -> Self {
        Self::Internal { detail }
    }

    pub fn config(detail: String) -> Self {
        Self::Config { detail }
    }

    pub fn conflict(code: &'static str, detail: String) -> Self {
        Self::Conflict { code, detail }
    }

    pub fn not_found(code: &'static str, detail: String) -> Self {
        Self::NotFound { code, detail }
    }
}

fn validation_code(kind: &ValidationKind) -> &'static str {
    match kind {
        ValidationKind::TooFewCards => "TOO_FEW_CARDS",
        ValidationKind::DuplicateSuit => "DUPLICATE_SUIT",
        ValidationKind::SetTooLarge => "SET_TOO_LARGE",
        ValidationKind::NotSequential => "NOT_SEQUENTIAL",
        ValidationKind::MixedRankAndSuit => "MIXED_RANK_AND_SUIT",
        ValidationKind::RunTooLong => "RUN_TOO_LONG",
        ValidationKind::DoesNotExtend => "DOES_NOT_EXTEND",
        ValidationKind::CardNotInHand => "CARD_NOT_IN_HAND",
        ValidationKind::ParseCard => "PARSE_CARD",
        ValidationKind::MustPlayOutstanding => "MUST_PLAY_OUTSTANDING",
        ValidationKind::NothingToDraw => "NOTHING_TO_DRAW",
        ValidationKind::HandNotEmpty => "HAND_NOT_EMPTY",
        ValidationKind::InvalidIndex => "INVALID_INDEX",
        ValidationKind::EmptyName => "EMPTY_NAME",
        ValidationKind::EmptyCode => "EMPTY_CODE",
    }
}

fn transition_code(kind: &TransitionKind) -> &'static str {
    match kind {
        TransitionKind::NotYourTurn => "NOT_YOUR_TURN",
        TransitionKind::PhaseMismatch => "PHASE_MISMATCH",
        TransitionKind::NotPlaying => "NOT_PLAYING",
        TransitionKind::NotRoundOver => "NOT_ROUND_OVER",
        TransitionKind::AlreadyStarted => "ALREADY_STARTED",
    }
}

fn not_found_code(kind: &NotFoundKind) -> &'static str {
    match kind {
        NotFoundKind::Game => "GAME_NOT_FOUND",
        NotFoundKind::Token => "TOKEN_NOT_FOUND",
        NotFoundKind::Player => "PLAYER_NOT_FOUND",
        NotFoundKind::Resume => "RESUME_NOT_FOUND",
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => AppError::Validation {
                code: validation_code(&kind),
                detail,
            },
            DomainError::IllegalTransition(kind, detail) => AppError::Conflict {
                code: transition_code(&kind),
                detail,
            },
            DomainError::NotFound(kind, detail) => AppError::NotFound {
                code: not_found_code(&kind),
                detail,
            },
            DomainError::Infra(InfraErrorKind::Connectivity, detail) => {
                AppError::Unavailable { detail }
            }
            DomainError::Infra(InfraErrorKind::DataCorruption, detail) => {
                AppError::Corrupt { detail }
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Unavailable {
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_keeps_reason_as_notice() {
        let err: AppError = DomainError::validation(
            ValidationKind::TooFewCards,
            "Need at least 3 cards to lay down",
        )
        .into();
        assert_eq!(err.code(), "TOO_FEW_CARDS");
        assert_eq!(err.notice(), "Need at least 3 cards to lay down");
        assert!(err.is_validation());
    }

    #[test]
    fn transitions_map_to_conflict() {
        let err: AppError =
            DomainError::illegal(TransitionKind::AlreadyStarted, "Game already started").into();
        assert_eq!(err.code(), "ALREADY_STARTED");
        assert_eq!(err.to_string(), "Not allowed: Game already started");
    }

    #[test]
    fn store_errors_keep_transport_message() {
        let err: AppError = StoreError::Rejected {
            path: "games/ABCDEF".into(),
            detail: "permission denied".into(),
        }
        .into();
        assert_eq!(err.code(), "UNAVAILABLE");
        assert!(err.notice().contains("permission denied"));
    }
}
