/// Property-based tests for meld validation and display ordering
use proptest::prelude::*;

use crate::domain::melds::{
    is_valid_meld, is_valid_run, is_valid_set, sort_meld_for_display, validate_lay_off,
    validate_meld, MeldKind,
};
use crate::domain::rules::RANK_CYCLE;
use crate::domain::{test_gens, test_prelude, Card, Rank};

fn canonical_run(cards: &[Card], start: u8) -> Vec<Card> {
    let suit = cards[0].suit;
    (0..cards.len() as u8)
        .map(|k| Card {
            suit,
            rank: Rank::ALL[((start + k) % RANK_CYCLE) as usize],
        })
        .collect()
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: a circular run is valid in any input order.
    #[test]
    fn prop_run_valid_regardless_of_order((_suit, _start, run) in test_gens::shuffled_run()) {
        prop_assert!(is_valid_run(&run), "run {:?} must be valid", run);
        prop_assert!(!is_valid_set(&run));
        prop_assert_eq!(validate_meld(&run).unwrap(), MeldKind::Run);
    }

    /// Property: runs display from their lowest arc position without wrapping.
    #[test]
    fn prop_run_display_starts_after_gap((_suit, start, run) in test_gens::shuffled_run()) {
        let shown = sort_meld_for_display(&run);
        prop_assert_eq!(shown, canonical_run(&run, start));
    }

    /// Property: removing an interior card of a run leaves a gap.
    #[test]
    fn prop_run_interior_removal_invalid(
        (_suit, start, run) in test_gens::shuffled_run(),
        pick in any::<prop::sample::Index>(),
    ) {
        let ordered = canonical_run(&run, start);
        let interior = 1 + pick.index(ordered.len() - 2);
        let mut broken = ordered.clone();
        broken.remove(interior);
        prop_assert!(!is_valid_run(&broken), "{:?} must have a gap", broken);
    }

    /// Property: either end of a run can be extended until the cycle closes.
    #[test]
    fn prop_run_extends_at_both_ends((_suit, start, run) in test_gens::shuffled_run()) {
        prop_assume!(run.len() + 1 < RANK_CYCLE as usize);
        let ordered = canonical_run(&run, start);
        let suit = ordered[0].suit;
        let below = Card { suit, rank: Rank::ALL[((start + RANK_CYCLE - 1) % RANK_CYCLE) as usize] };
        let above = Card {
            suit,
            rank: Rank::ALL[((start + run.len() as u8) % RANK_CYCLE) as usize],
        };
        prop_assert!(validate_lay_off(below, &run).is_ok());
        prop_assert!(validate_lay_off(above, &run).is_ok());
    }

    /// Property: sets of distinct suits are valid in any order and display in suit order.
    #[test]
    fn prop_set_valid_and_sorted(set in test_gens::shuffled_set()) {
        prop_assert!(is_valid_set(&set));
        prop_assert_eq!(validate_meld(&set).unwrap(), MeldKind::Set);

        let shown = sort_meld_for_display(&set);
        let mut expected = set.clone();
        expected.sort_by_key(|c| c.suit);
        prop_assert_eq!(shown, expected);
    }

    /// Property: a duplicated card never forms a set.
    #[test]
    fn prop_set_with_duplicate_invalid(set in test_gens::shuffled_set()) {
        let mut dup = set.clone();
        dup.truncate(2);
        dup.push(set[0]);
        prop_assert!(!is_valid_set(&dup));
        prop_assert!(validate_meld(&dup).is_err());
    }

    /// Property: the diagnostic validator agrees with the boolean one.
    #[test]
    fn prop_validate_matches_boolean(cards in test_gens::unique_cards_up_to(6)) {
        prop_assert_eq!(validate_meld(&cards).is_ok(), is_valid_meld(&cards));
    }
}
