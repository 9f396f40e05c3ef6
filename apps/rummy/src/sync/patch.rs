//! Encode a `GameUpdate` as a multi-path partial write.
//!
//! Only the fields the update names are written. Turn hand-off fields are
//! absent from the patch whenever the update leaves them `None`.

use serde_json::{json, Value};

use crate::domain::game_update::GameUpdate;
use crate::domain::state::{GameStatus, PlayerSlot};
use crate::sync::document::{player_value, WireStatus};
use crate::sync::store::Patch;

fn player_path(slot: PlayerSlot, field: &str) -> String {
    format!("players/{}/{field}", slot.key())
}

fn wire_status(status: GameStatus) -> WireStatus {
    match status {
        GameStatus::Waiting => WireStatus::Waiting,
        GameStatus::Playing(_) => WireStatus::Playing,
        GameStatus::RoundOver => WireStatus::RoundOver,
    }
}

/// Build the patch for `update`, stamping `lastActionTime` with `now`.
pub fn encode_update(update: &GameUpdate, now: i64) -> Patch {
    let mut patch = Patch::new();

    if let Some(status) = update.status {
        patch.insert("status".into(), json!(wire_status(status)));
        if let Some(phase) = status.phase() {
            patch.insert("phase".into(), json!(phase));
        }
    }
    if let Some(turn) = update.current_turn {
        patch.insert("currentTurn".into(), json!(turn));
    }
    if let Some(dealer) = update.dealer {
        patch.insert("dealer".into(), json!(dealer));
    }
    if let Some(round) = update.round_number {
        patch.insert("roundNumber".into(), json!(round));
    }
    if let Some(deck) = &update.deck {
        patch.insert("deck".into(), json!(deck));
    }
    if let Some(discard) = &update.discard {
        patch.insert("discard".into(), json!(discard));
    }
    if let Some((slot, player)) = &update.seat {
        patch.insert(format!("players/{}", slot.key()), player_value(player));
    }
    for (slot, hand) in &update.hands {
        patch.insert(player_path(*slot, "hand"), json!(hand));
    }
    for (slot, melds) in &update.melds {
        patch.insert(player_path(*slot, "melds"), json!(melds));
    }
    for write in &update.meld_writes {
        patch.insert(
            player_path(write.owner, &format!("melds/{}", write.index)),
            json!(write.cards),
        );
    }
    for (slot, score) in &update.scores {
        patch.insert(player_path(*slot, "score"), json!(score));
    }
    if let Some(history) = &update.score_history {
        patch.insert("scoreHistory".into(), json!(history));
    }
    if let Some(text) = &update.last_action {
        patch.insert("lastAction".into(), Value::String(text.clone()));
        patch.insert("lastActionTime".into(), json!(now));
    }
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::TurnPhase;
    use crate::domain::test_state_helpers::cards;

    #[test]
    fn playing_status_writes_phase_too() {
        let patch = encode_update(
            &GameUpdate::new()
                .with_status(GameStatus::Playing(TurnPhase::Play))
                .with_hand(PlayerSlot::Player2, cards(&["AC"])),
            7,
        );
        assert_eq!(patch["status"], json!("playing"));
        assert_eq!(patch["phase"], json!("play"));
        assert_eq!(patch["players/player2/hand"], json!(["AC"]));
        assert!(!patch.contains_key("lastActionTime"));
    }

    #[test]
    fn round_over_leaves_phase_alone() {
        let patch = encode_update(&GameUpdate::new().with_status(GameStatus::RoundOver), 7);
        assert_eq!(patch["status"], json!("roundOver"));
        assert!(!patch.contains_key("phase"));
    }

    #[test]
    fn going_out_discard_omits_turn_handoff() {
        let update = GameUpdate::new()
            .with_current_turn(PlayerSlot::Player2)
            .with_status(GameStatus::Playing(TurnPhase::Draw))
            .with_discard(cards(&["9D"]))
            .without_turn_handoff()
            .with_last_action("Ann went out!");
        let patch = encode_update(&update, 99);
        let keys: Vec<&str> = patch.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["discard", "lastAction", "lastActionTime"]);
        assert_eq!(patch["lastActionTime"], json!(99));
    }

    #[test]
    fn lay_off_targets_single_meld() {
        let update =
            GameUpdate::new().with_meld_write(PlayerSlot::Player1, 2, cards(&["5H", "6H", "7H", "8H"]));
        let patch = encode_update(&update, 0);
        assert_eq!(
            patch["players/player1/melds/2"],
            json!(["5H", "6H", "7H", "8H"])
        );
    }
}
