/// Property-based tests for card conservation across legal action sequences
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::domain::player_view::TurnView;
use crate::domain::round::{join_and_deal, score_round, start_new_round};
use crate::domain::state::{GameState, GameStatus, Player, PlayerSlot, TurnPhase};
use crate::domain::turns::{discard, draw_from_deck, lay_down_meld, lay_off, pick_up_discard};
use crate::domain::{test_prelude, Card};

const MAX_STEPS: usize = 160;

/// Drives one legal action chosen by `choice` and returns the new must-play card.
fn step(
    state: &mut GameState,
    must_play: Option<Card>,
    choice: u8,
    rng: &mut ChaCha20Rng,
) -> Option<Card> {
    let actor = state.current_turn.unwrap();
    let view = TurnView::for_turn(state, actor, must_play).unwrap();
    let pick = |len: usize| (choice as usize) % len.max(1);

    let mv = match view.phase {
        TurnPhase::Draw => {
            let pickups = view.legal_pickups();
            if view.can_draw_from_deck() && (choice % 3 != 0 || pickups.is_empty()) {
                draw_from_deck(state, actor, rng).unwrap()
            } else {
                pick_up_discard(state, actor, pickups[pick(pickups.len())]).unwrap()
            }
        }
        TurnPhase::Play => {
            let melds = view.meld_options();
            let lay_offs = view.lay_off_options();
            let discards = view.discard_options();
            if !melds.is_empty() && (choice % 2 == 0 || discards.is_empty()) {
                lay_down_meld(state, actor, &melds[pick(melds.len())], must_play).unwrap()
            } else if !lay_offs.is_empty() && (choice % 3 == 1 || discards.is_empty()) {
                let (card, target) = lay_offs[pick(lay_offs.len())];
                lay_off(state, actor, card, target, must_play).unwrap()
            } else {
                let before = actor;
                let mv = discard(state, actor, discards[pick(discards.len())], must_play).unwrap();
                if !mv.goes_out {
                    let mut after = state.clone();
                    mv.update.apply_to(&mut after, None);
                    assert_eq!(after.current_turn, Some(before.other()));
                    assert_eq!(after.status, GameStatus::Playing(TurnPhase::Draw));
                }
                mv
            }
        }
    };

    mv.update.apply_to(state, None);
    state.check_conservation().unwrap();

    if mv.goes_out {
        let result = score_round(state).unwrap();
        result.update.apply_to(state, None);
        state.check_conservation().unwrap();
        start_new_round(state, rng).unwrap().apply_to(state, None);
        state.check_conservation().unwrap();
        return None;
    }
    mv.must_play
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: after any sequence of legal actions, deck, discard, hands and
    /// melds together hold each of the 52 cards exactly once.
    #[test]
    fn prop_card_conservation(
        seed in any::<u64>(),
        choices in prop::collection::vec(any::<u8>(), MAX_STEPS),
    ) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut state = GameState::new_waiting("PROP23", Player::new("Ann", "t1"));
        join_and_deal(&state, "Bob", "t2", &mut rng).unwrap().apply_to(&mut state, None);
        state.check_conservation().unwrap();

        let mut must_play = None;
        for choice in choices {
            must_play = step(&mut state, must_play, choice, &mut rng);
            prop_assert!(matches!(state.status, GameStatus::Playing(_)));
        }
    }

    /// Property: the score history and cumulative scores always agree.
    #[test]
    fn prop_scores_match_history(
        seed in any::<u64>(),
        choices in prop::collection::vec(any::<u8>(), MAX_STEPS),
    ) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut state = GameState::new_waiting("PROP23", Player::new("Ann", "t1"));
        join_and_deal(&state, "Bob", "t2", &mut rng).unwrap().apply_to(&mut state, None);

        let mut must_play = None;
        for choice in choices {
            must_play = step(&mut state, must_play, choice, &mut rng);
        }
        prop_assert_eq!(state.round_number as usize, state.score_history.len() + 1);
        for slot in PlayerSlot::ALL {
            let total: i32 = state.score_history.iter().map(|e| e.delta(slot)).sum();
            prop_assert_eq!(state.player(slot).map(|p| p.score), Some(total));
        }
    }
}
