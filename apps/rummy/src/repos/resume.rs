//! Resume book: the (gameId, slot, token, lastPlayed) entries a client keeps
//! so it can rejoin its seats later.
//!
//! All entries live as one JSON object under a single key, keyed
//! `<gameId>:<slot>` so two seats of one game never overwrite each other.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::state::PlayerSlot;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::infra::clock::Clock;

/// Save/get/delete by key, provided by the environment.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;
    async fn save(&self, key: &str, value: &str) -> Result<(), DomainError>;
    async fn delete(&self, key: &str) -> Result<(), DomainError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeEntry {
    pub game_id: String,
    pub player_slot: PlayerSlot,
    pub token: String,
    pub last_played: i64,
}

impl ResumeEntry {
    pub fn key(&self) -> String {
        entry_key(&self.game_id, self.player_slot)
    }
}

fn entry_key(game_id: &str, slot: PlayerSlot) -> String {
    format!("{game_id}:{}", slot.key())
}

type Book = BTreeMap<String, ResumeEntry>;

pub struct ResumeRepo {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    storage_key: String,
}

impl ResumeRepo {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            kv,
            clock,
            storage_key: storage_key.into(),
        }
    }

    async fn load(&self) -> Result<Book, DomainError> {
        let Some(raw) = self.kv.get(&self.storage_key).await? else {
            return Ok(Book::new());
        };
        serde_json::from_str(&raw).map_err(|err| {
            warn!(key = %self.storage_key, error = %err, "unreadable resume book");
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("Saved games could not be read: {err}"),
            )
        })
    }

    async fn store(&self, book: &Book) -> Result<(), DomainError> {
        if book.is_empty() {
            return self.kv.delete(&self.storage_key).await;
        }
        let raw = serde_json::to_string(book).map_err(|err| {
            DomainError::infra(InfraErrorKind::DataCorruption, err.to_string())
        })?;
        self.kv.save(&self.storage_key, &raw).await
    }

    /// Record (or refresh) the seat this client holds, stamped with the clock.
    pub async fn remember(
        &self,
        game_id: &str,
        slot: PlayerSlot,
        token: &str,
    ) -> Result<ResumeEntry, DomainError> {
        let entry = ResumeEntry {
            game_id: game_id.to_string(),
            player_slot: slot,
            token: token.to_string(),
            last_played: self.clock.now_millis(),
        };
        let mut book = self.load().await?;
        book.insert(entry.key(), entry.clone());
        self.store(&book).await?;
        Ok(entry)
    }

    /// Most recently played seat for `game_id`, if any.
    pub async fn find_for_game(&self, game_id: &str) -> Result<Option<ResumeEntry>, DomainError> {
        let book = self.load().await?;
        Ok(book
            .into_values()
            .filter(|e| e.game_id == game_id)
            .max_by_key(|e| e.last_played))
    }

    /// Entries ordered most recent first, at most `limit`.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ResumeEntry>, DomainError> {
        let mut entries: Vec<ResumeEntry> = self.load().await?.into_values().collect();
        entries.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        entries.truncate(limit);
        Ok(entries)
    }

    pub async fn all(&self) -> Result<Vec<ResumeEntry>, DomainError> {
        Ok(self.load().await?.into_values().collect())
    }

    /// Drop every seat recorded for `game_id`.
    pub async fn forget(&self, game_id: &str) -> Result<usize, DomainError> {
        let mut book = self.load().await?;
        let before = book.len();
        book.retain(|_, e| e.game_id != game_id);
        let removed = before - book.len();
        if removed > 0 {
            self.store(&book).await?;
        }
        Ok(removed)
    }

    pub async fn forget_all(&self) -> Result<(), DomainError> {
        self.kv.delete(&self.storage_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{ManualClock, MemoryKv};

    fn repo() -> (Arc<MemoryKv>, ResumeRepo) {
        let kv = Arc::new(MemoryKv::new());
        let repo = ResumeRepo::new(
            kv.clone(),
            Arc::new(ManualClock::new(1_000)),
            "rummy2go_games",
        );
        (kv, repo)
    }

    #[tokio::test]
    async fn both_seats_of_one_game_coexist() {
        let (kv, repo) = repo();
        repo.remember("ABCDEF", PlayerSlot::Player1, "t1").await.unwrap();
        repo.remember("ABCDEF", PlayerSlot::Player2, "t2").await.unwrap();

        let raw = kv.get("rummy2go_games").await.unwrap().unwrap();
        assert!(raw.contains("ABCDEF:player1"));
        assert!(raw.contains("\"playerSlot\":\"player2\""));

        let latest = repo.find_for_game("ABCDEF").await.unwrap().unwrap();
        assert_eq!(latest.player_slot, PlayerSlot::Player2);
        assert_eq!(latest.token, "t2");
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let (_kv, repo) = repo();
        for code in ["AAAAAA", "BBBBBB", "CCCCCC", "DDDDDD"] {
            repo.remember(code, PlayerSlot::Player1, "t").await.unwrap();
        }
        repo.remember("AAAAAA", PlayerSlot::Player1, "t").await.unwrap();

        let recent = repo.recent(3).await.unwrap();
        let codes: Vec<&str> = recent.iter().map(|e| e.game_id.as_str()).collect();
        assert_eq!(codes, vec!["AAAAAA", "DDDDDD", "CCCCCC"]);
    }

    #[tokio::test]
    async fn forget_removes_every_seat_for_game() {
        let (kv, repo) = repo();
        repo.remember("ABCDEF", PlayerSlot::Player1, "t1").await.unwrap();
        repo.remember("ABCDEF", PlayerSlot::Player2, "t2").await.unwrap();
        repo.remember("ZZZZZZ", PlayerSlot::Player1, "t3").await.unwrap();

        assert_eq!(repo.forget("ABCDEF").await.unwrap(), 2);
        assert_eq!(repo.all().await.unwrap().len(), 1);
        assert_eq!(repo.forget("ABCDEF").await.unwrap(), 0);

        repo.forget_all().await.unwrap();
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn corrupt_book_is_reported() {
        let (kv, repo) = repo();
        kv.save("rummy2go_games", "not json").await.unwrap();
        assert!(matches!(
            repo.recent(5).await,
            Err(DomainError::Infra(InfraErrorKind::DataCorruption, _))
        ));
    }
}
