//! Wire schema of the shared game document and the normalization boundary.
//!
//! The store may hand back any ordered sequence as a JSON array, as an array
//! with holes, as a keyed map (`{"0": .., "2": ..}`), or not at all when it
//! is empty. `FlexSeq` accepts every one of those shapes and yields a plain
//! ordered `Vec`; nothing past `decode_game` ever sees the ambiguity.

use std::collections::BTreeMap;

use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::domain::scoring::ScoreEntry;
use crate::domain::state::{GameState, GameStatus, Player, PlayerSlot, TurnPhase};
use crate::domain::Card;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::sync::store::server_timestamp;

/// Ordered sequence normalized from any of the store's representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlexSeq<T>(pub Vec<T>);

impl<T> Default for FlexSeq<T> {
    fn default() -> Self {
        FlexSeq(Vec::new())
    }
}

impl<T> FlexSeq<T> {
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeqOrMap<T> {
    Seq(Vec<Option<T>>),
    Map(BTreeMap<String, T>),
}

impl<'de, T> Deserialize<'de> for FlexSeq<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<SeqOrMap<T>>::deserialize(deserializer)? {
            None => Ok(FlexSeq(Vec::new())),
            Some(SeqOrMap::Seq(items)) => Ok(FlexSeq(items.into_iter().flatten().collect())),
            Some(SeqOrMap::Map(entries)) => {
                let mut keyed = Vec::with_capacity(entries.len());
                for (key, item) in entries {
                    let index: usize = key
                        .parse()
                        .map_err(|_| D::Error::custom(format!("non-numeric sequence key {key:?}")))?;
                    keyed.push((index, item));
                }
                keyed.sort_by_key(|(index, _)| *index);
                Ok(FlexSeq(keyed.into_iter().map(|(_, item)| item).collect()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireStatus {
    Waiting,
    Playing,
    RoundOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDoc {
    pub name: String,
    pub token: String,
    #[serde(default)]
    pub hand: FlexSeq<Card>,
    #[serde(default)]
    pub melds: FlexSeq<FlexSeq<Card>>,
    #[serde(default)]
    pub score: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayersDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player1: Option<PlayerDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player2: Option<PlayerDoc>,
}

/// The document stored at `<games_root>/<gameId>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDoc {
    pub status: WireStatus,
    #[serde(default)]
    pub phase: Option<TurnPhase>,
    #[serde(default)]
    pub current_turn: Option<PlayerSlot>,
    #[serde(default)]
    pub dealer: Option<PlayerSlot>,
    #[serde(default)]
    pub round_number: Option<u32>,
    #[serde(default)]
    pub deck: FlexSeq<Card>,
    #[serde(default)]
    pub discard: FlexSeq<Card>,
    #[serde(default)]
    pub players: PlayersDoc,
    #[serde(default)]
    pub score_history: FlexSeq<ScoreEntry>,
    #[serde(default)]
    pub last_action: Option<String>,
    #[serde(default)]
    pub last_action_time: Option<i64>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl From<PlayerDoc> for Player {
    fn from(doc: PlayerDoc) -> Self {
        Player {
            name: doc.name,
            token: doc.token,
            hand: doc.hand.into_vec(),
            melds: doc.melds.into_vec().into_iter().map(FlexSeq::into_vec).collect(),
            score: doc.score,
            online: doc.online,
            last_seen: doc.last_seen,
        }
    }
}

impl GameDoc {
    pub fn into_state(self, game_id: &str) -> Result<GameState, DomainError> {
        let status = match self.status {
            WireStatus::Waiting => GameStatus::Waiting,
            WireStatus::RoundOver => GameStatus::RoundOver,
            WireStatus::Playing => {
                let phase = self.phase.ok_or_else(|| {
                    DomainError::infra(
                        InfraErrorKind::DataCorruption,
                        format!("Game {game_id} is playing without a phase"),
                    )
                })?;
                GameStatus::Playing(phase)
            }
        };
        let player1 = self.players.player1.ok_or_else(|| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("Game {game_id} has no player1"),
            )
        })?;

        Ok(GameState {
            game_id: game_id.to_string(),
            status,
            current_turn: self.current_turn,
            dealer: self.dealer,
            round_number: self.round_number.unwrap_or(1),
            deck: self.deck.into_vec(),
            discard: self.discard.into_vec(),
            player1: player1.into(),
            player2: self.players.player2.map(Player::from),
            score_history: self.score_history.into_vec(),
            last_action: self.last_action,
            last_action_time: self.last_action_time,
            created_at: self.created_at,
        })
    }
}

/// Decode a raw snapshot. `Ok(None)` when nothing is stored at the path.
pub fn decode_game(game_id: &str, raw: Option<Value>) -> Result<Option<GameState>, DomainError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let doc: GameDoc = serde_json::from_value(raw).map_err(|err| {
        warn!(game_id, error = %err, "undecodable game document");
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("Game {game_id} could not be read: {err}"),
        )
    })?;
    doc.into_state(game_id).map(Some)
}

/// Full player record as written when a seat is taken.
pub fn player_value(player: &Player) -> Value {
    json!({
        "name": player.name,
        "token": player.token,
        "hand": player.hand,
        "melds": player.melds,
        "score": player.score,
    })
}

/// Initial document for a freshly created game.
pub fn creation_value(creator: &Player) -> Value {
    json!({
        "status": WireStatus::Waiting,
        "createdAt": server_timestamp(),
        "players": { "player1": player_value(creator) },
    })
}
