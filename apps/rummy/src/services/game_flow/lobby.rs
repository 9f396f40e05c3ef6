//! Create, join, resume and delete games.

use std::collections::BTreeSet;

use tracing::{info, warn};

use super::{GameFlowService, GameSession};
use crate::domain::round::join_and_deal;
use crate::domain::state::{GameState, GameStatus, Player, PlayerSlot};
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::repos::resume::ResumeEntry;
use crate::sync::document::creation_value;
use crate::sync::presence::{attach_presence, detach_presence};
use crate::sync::store::StoreError;
use crate::utils::join_code::{
    generate_game_code, generate_token, is_game_code, normalize_game_code,
};

const CODE_ATTEMPTS: usize = 8;

/// Result of `join_game`.
pub struct JoinOutcome {
    pub session: GameSession,
    /// The game had started and we took back an existing seat by name.
    pub reconnected: bool,
}

impl JoinOutcome {
    /// Toast for a name reconnect.
    pub fn notice(&self) -> Option<String> {
        if !self.reconnected {
            return None;
        }
        let state = self.session.state()?;
        let name = &state.player(self.session.slot)?.name;
        Some(format!("Reconnected as {name}!"))
    }
}

fn require_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation(ValidationKind::EmptyName, "Enter your name").into());
    }
    Ok(name)
}

fn seat_by_name(state: &GameState, name: &str) -> Option<PlayerSlot> {
    let wanted = name.to_lowercase();
    PlayerSlot::ALL.into_iter().find(|slot| {
        state
            .player(*slot)
            .is_some_and(|p| p.name.trim().to_lowercase() == wanted)
    })
}

impl GameFlowService {
    /// Subscribe, assert presence and wait for the first snapshot.
    async fn open_session(
        &self,
        game_id: &str,
        slot: PlayerSlot,
        token: &str,
    ) -> Result<GameSession, AppError> {
        let game_path = self.config.game_path(game_id);
        let subscription = self.store.subscribe(&game_path).await?;
        let mut session = GameSession::new(
            game_id.to_string(),
            slot,
            token.to_string(),
            game_path,
            subscription,
        );
        attach_presence(&*self.store, &session.game_path, slot).await?;
        session.next_change().await?;
        session.refresh()?;
        self.resume.remember(game_id, slot, token).await?;
        Ok(session)
    }

    pub async fn create_game(&self, name: &str) -> Result<GameSession, AppError> {
        let name = require_name(name)?;

        let mut chosen = None;
        for _ in 0..CODE_ATTEMPTS {
            let code = {
                let mut rng = self.rng.lock();
                generate_game_code(&mut *rng)
            };
            if self.store.get(&self.config.game_path(&code)).await?.is_none() {
                chosen = Some(code);
                break;
            }
        }
        let game_id = chosen.ok_or_else(|| {
            AppError::conflict("CODE_EXHAUSTED", "Could not allocate a game code".to_string())
        })?;

        let token = {
            let mut rng = self.rng.lock();
            generate_token(&mut *rng)
        };
        let creator = Player::new(name, token.as_str());
        self.store
            .set(&self.config.game_path(&game_id), creation_value(&creator))
            .await?;
        info!(game_id = %game_id, "game created");

        self.open_session(&game_id, PlayerSlot::Player1, &token).await
    }

    /// Join by code. A started game can be re-entered by matching a seated name.
    pub async fn join_game(&self, code: &str, name: &str) -> Result<JoinOutcome, AppError> {
        let name = require_name(name)?;
        let game_id = normalize_game_code(code);
        if game_id.is_empty() {
            return Err(
                DomainError::validation(ValidationKind::EmptyCode, "Enter a game code").into(),
            );
        }
        let state = self.require_game(&game_id, "Game not found").await?;

        if state.status != GameStatus::Waiting {
            let Some(slot) = seat_by_name(&state, name) else {
                return Err(AppError::conflict(
                    "ALREADY_STARTED",
                    "Game already started".to_string(),
                ));
            };
            let token = state
                .player(slot)
                .map(|p| p.token.clone())
                .unwrap_or_default();
            info!(game_id = %game_id, slot = %slot, "reconnected by name");
            let session = self.open_session(&game_id, slot, &token).await?;
            return Ok(JoinOutcome {
                session,
                reconnected: true,
            });
        }

        let token = {
            let mut rng = self.rng.lock();
            generate_token(&mut *rng)
        };
        let update = {
            let mut rng = self.rng.lock();
            join_and_deal(&state, name, &token, &mut *rng)?
        };
        self.write_update(&game_id, &update).await?;

        let session = self
            .open_session(&game_id, PlayerSlot::Player2, &token)
            .await?;
        Ok(JoinOutcome {
            session,
            reconnected: false,
        })
    }

    /// Rejoin a seat by its secret token.
    pub async fn resume_with_token(
        &self,
        game_id: &str,
        token: &str,
    ) -> Result<GameSession, AppError> {
        let state = self.require_game(game_id, "Game no longer exists").await?;
        let slot = state.slot_for_token(token).ok_or_else(|| {
            AppError::from(DomainError::not_found(
                NotFoundKind::Token,
                "Cannot resume - invalid token",
            ))
        })?;
        info!(game_id, slot = %slot, "resuming seat");
        self.open_session(game_id, slot, token).await
    }

    /// Resume using the token saved in the resume book.
    pub async fn resume_saved(&self, game_id: &str) -> Result<GameSession, AppError> {
        let entry = self.resume.find_for_game(game_id).await?.ok_or_else(|| {
            AppError::from(DomainError::not_found(
                NotFoundKind::Resume,
                "No saved game data",
            ))
        })?;
        self.resume_with_token(&entry.game_id, &entry.token).await
    }

    /// Most recently played games, newest first.
    pub async fn recent_games(&self) -> Result<Vec<ResumeEntry>, AppError> {
        Ok(self.resume.recent(self.config.resume_limit).await?)
    }

    /// Drop our presence hooks first so a later disconnect cannot recreate the seat.
    async fn remove_game(&self, game_id: &str) -> Result<(), StoreError> {
        if !is_game_code(game_id) {
            return Err(StoreError::InvalidPath(game_id.to_string()));
        }
        let game_path = self.config.game_path(game_id);
        detach_presence(&*self.store, &game_path).await?;
        self.store.remove(&game_path).await
    }

    /// Remove the shared document and every saved entry for it.
    pub async fn delete_game(&self, game_id: &str) -> Result<(), AppError> {
        if let Err(err) = self.remove_game(game_id).await {
            warn!(game_id, error = %err, "could not remove game document");
        }
        let forgotten = self.resume.forget(game_id).await?;
        info!(game_id, forgotten, "game deleted");
        Ok(())
    }

    pub async fn delete_all_games(&self) -> Result<usize, AppError> {
        let game_ids: BTreeSet<String> = self
            .resume
            .all()
            .await?
            .into_iter()
            .map(|entry| entry.game_id)
            .collect();
        let mut removed = 0;
        for game_id in &game_ids {
            match self.remove_game(game_id).await {
                Ok(()) => removed += 1,
                Err(err) => warn!(game_id = %game_id, error = %err, "could not remove game document"),
            }
        }
        self.resume.forget_all().await?;
        Ok(removed)
    }
}
