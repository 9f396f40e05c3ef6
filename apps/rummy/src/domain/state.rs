use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::melds::Meld;
use crate::domain::rules::DECK_SIZE;
use crate::domain::scoring::ScoreEntry;
use crate::domain::Card;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind, TransitionKind};

/// One of the two fixed seats.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerSlot {
    Player1,
    Player2,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::Player1, PlayerSlot::Player2];

    #[inline]
    pub fn other(self) -> PlayerSlot {
        match self {
            PlayerSlot::Player1 => PlayerSlot::Player2,
            PlayerSlot::Player2 => PlayerSlot::Player1,
        }
    }

    /// Path segment under `players/`.
    pub fn key(self) -> &'static str {
        match self {
            PlayerSlot::Player1 => "player1",
            PlayerSlot::Player2 => "player2",
        }
    }

    pub fn from_key(key: &str) -> Option<PlayerSlot> {
        match key {
            "player1" => Some(PlayerSlot::Player1),
            "player2" => Some(PlayerSlot::Player2),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            PlayerSlot::Player1 => 0,
            PlayerSlot::Player2 => 1,
        }
    }
}

impl std::fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Sub-phase of a turn while the round is in play.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPhase {
    /// Current player must take a card from the deck or the discard pile.
    Draw,
    /// Current player has drawn and must discard or go out.
    Play,
}

/// Overall game progression. Phase exists only while playing.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameStatus {
    /// Created; waiting for the second player to join.
    Waiting,
    Playing(TurnPhase),
    /// Scores are in; frozen until a new round is started.
    RoundOver,
}

impl GameStatus {
    pub fn phase(self) -> Option<TurnPhase> {
        match self {
            GameStatus::Playing(phase) => Some(phase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    /// Stable bearer token used to resume the seat. Identity, not a secret.
    pub token: String,
    pub hand: Vec<Card>,
    pub melds: Vec<Meld>,
    /// Cumulative across rounds.
    pub score: i32,
    /// Presence markers; written only by this player's own client.
    pub online: Option<bool>,
    pub last_seen: Option<i64>,
}

impl Player {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            hand: Vec::new(),
            melds: Vec::new(),
            score: 0,
            online: None,
            last_seen: None,
        }
    }
}

/// Entire shared game document, as seen by one client's mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub game_id: String,
    pub status: GameStatus,
    /// None while waiting.
    pub current_turn: Option<PlayerSlot>,
    pub dealer: Option<PlayerSlot>,
    /// 1-based; incremented by one per new round.
    pub round_number: u32,
    /// Remaining stock; index 0 is drawn next.
    pub deck: Vec<Card>,
    /// Last element is the top of the pile.
    pub discard: Vec<Card>,
    pub player1: Player,
    /// None until the second player joins.
    pub player2: Option<Player>,
    pub score_history: Vec<ScoreEntry>,
    /// Advisory text for display only.
    pub last_action: Option<String>,
    pub last_action_time: Option<i64>,
    pub created_at: Option<i64>,
}

impl GameState {
    /// Freshly created game with only the creator seated.
    pub fn new_waiting(game_id: impl Into<String>, creator: Player) -> Self {
        Self {
            game_id: game_id.into(),
            status: GameStatus::Waiting,
            current_turn: None,
            dealer: None,
            round_number: 1,
            deck: Vec::new(),
            discard: Vec::new(),
            player1: creator,
            player2: None,
            score_history: Vec::new(),
            last_action: None,
            last_action_time: None,
            created_at: None,
        }
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&Player> {
        match slot {
            PlayerSlot::Player1 => Some(&self.player1),
            PlayerSlot::Player2 => self.player2.as_ref(),
        }
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> Option<&mut Player> {
        match slot {
            PlayerSlot::Player1 => Some(&mut self.player1),
            PlayerSlot::Player2 => self.player2.as_mut(),
        }
    }

    pub fn phase(&self) -> Option<TurnPhase> {
        self.status.phase()
    }

    pub fn is_turn_of(&self, slot: PlayerSlot) -> bool {
        self.current_turn == Some(slot)
    }

    /// Seat holding `token`, if any.
    pub fn slot_for_token(&self, token: &str) -> Option<PlayerSlot> {
        PlayerSlot::ALL
            .into_iter()
            .find(|&slot| self.player(slot).is_some_and(|p| p.token == token))
    }

    /// Every card currently in play: stock, discard, both hands, all melds.
    pub fn all_cards(&self) -> impl Iterator<Item = &Card> + '_ {
        let seated = [Some(&self.player1), self.player2.as_ref()];
        self.deck.iter().chain(self.discard.iter()).chain(
            seated
                .into_iter()
                .flatten()
                .flat_map(|p| p.hand.iter().chain(p.melds.iter().flatten())),
        )
    }

    /// Verify that the 52 cards are accounted for exactly once.
    pub fn check_conservation(&self) -> Result<(), DomainError> {
        let mut seen: HashSet<Card> = HashSet::with_capacity(DECK_SIZE);
        let mut total = 0usize;
        for card in self.all_cards() {
            total += 1;
            if !seen.insert(*card) {
                return Err(DomainError::infra(
                    InfraErrorKind::DataCorruption,
                    format!("Card {card} appears more than once"),
                ));
            }
        }
        if total != DECK_SIZE {
            return Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("Expected {DECK_SIZE} cards in play, found {total}"),
            ));
        }
        Ok(())
    }
}

pub fn require_player(state: &GameState, slot: PlayerSlot) -> Result<&Player, DomainError> {
    state.player(slot).ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Player, format!("No player seated at {slot}"))
    })
}

/// Ensure `actor` holds the turn in `expected` phase.
pub fn require_turn(
    state: &GameState,
    actor: PlayerSlot,
    expected: TurnPhase,
) -> Result<(), DomainError> {
    let phase = match state.status {
        GameStatus::Playing(phase) => phase,
        GameStatus::Waiting => {
            return Err(DomainError::illegal(
                TransitionKind::NotPlaying,
                "Waiting for the second player",
            ))
        }
        GameStatus::RoundOver => {
            return Err(DomainError::illegal(
                TransitionKind::NotPlaying,
                "Round is over",
            ))
        }
    };
    if !state.is_turn_of(actor) {
        return Err(DomainError::illegal(
            TransitionKind::NotYourTurn,
            "Not your turn",
        ));
    }
    if phase != expected {
        let detail = match expected {
            TurnPhase::Draw => "You already drew, play or discard",
            TurnPhase::Play => "Draw a card first",
        };
        return Err(DomainError::illegal(TransitionKind::PhaseMismatch, detail));
    }
    Ok(())
}
