use crate::domain::state::{GameState, GameStatus, PlayerSlot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameTransition {
    /// Edge-triggered: Waiting -> Playing on the second join.
    GameStarted,

    /// Edge-triggered: the turn became a specific seat.
    TurnBecame { slot: PlayerSlot },

    /// Edge-triggered: Playing -> RoundOver.
    RoundEnded { round: u32 },

    /// Edge-triggered: RoundOver -> Playing with a new round number.
    RoundStarted { round: u32 },

    /// A seat's presence marker flipped.
    PresenceChanged { slot: PlayerSlot, online: bool },
}

/// Derive transitions between two consecutive mirrors of the same game.
pub fn derive_game_transitions(before: Option<&GameState>, after: &GameState) -> Vec<GameTransition> {
    let mut transitions = Vec::new();

    let before_status = before.map(|b| b.status);
    let was_playing = matches!(before_status, Some(GameStatus::Playing(_)));
    let is_playing = matches!(after.status, GameStatus::Playing(_));

    // 1. Game start
    if before_status == Some(GameStatus::Waiting) && is_playing {
        transitions.push(GameTransition::GameStarted);
    }

    // 2. Round boundaries
    if was_playing && after.status == GameStatus::RoundOver {
        transitions.push(GameTransition::RoundEnded {
            round: after.round_number,
        });
    }
    if before_status == Some(GameStatus::RoundOver) && is_playing {
        transitions.push(GameTransition::RoundStarted {
            round: after.round_number,
        });
    }

    // 3. Turn change
    if is_playing {
        if let Some(slot) = after.current_turn {
            let turn_before = before.and_then(|b| b.current_turn);
            let restarted = !was_playing;
            if turn_before != Some(slot) || restarted {
                transitions.push(GameTransition::TurnBecame { slot });
            }
        }
    }

    // 4. Presence
    for slot in PlayerSlot::ALL {
        let online_before = before.and_then(|b| b.player(slot)).and_then(|p| p.online);
        let online_after = after.player(slot).and_then(|p| p.online);
        if let Some(online) = online_after {
            if online_before != Some(online) {
                transitions.push(GameTransition::PresenceChanged { slot, online });
            }
        }
    }

    transitions
}
