/// Property-based tests for shuffling and dealing
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::domain::dealing::{create_deck, deal_round, shuffle_with_seed};
use crate::domain::rules::{DECK_SIZE, HAND_SIZE};
use crate::domain::test_prelude;

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: a shuffle is a permutation of the input and leaves it untouched.
    #[test]
    fn prop_shuffle_is_permutation(seed in any::<u64>()) {
        let deck = create_deck();
        let shuffled = shuffle_with_seed(&deck, seed);
        prop_assert_eq!(shuffled.len(), DECK_SIZE);

        let mut sorted = shuffled.clone();
        sorted.sort();
        prop_assert_eq!(&sorted, &deck, "shuffle must keep the same multiset");
        prop_assert_eq!(deck, create_deck(), "input deck must not be mutated");
    }

    /// Property: same seed, same order.
    #[test]
    fn prop_shuffle_deterministic_per_seed(seed in any::<u64>()) {
        let deck = create_deck();
        prop_assert_eq!(shuffle_with_seed(&deck, seed), shuffle_with_seed(&deck, seed));
    }

    /// Property: a deal accounts for every card exactly once.
    #[test]
    fn prop_deal_accounts_for_every_card(seed in any::<u64>()) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let deal = deal_round(&mut rng).unwrap();
        prop_assert_eq!(deal.hands[0].len(), HAND_SIZE);
        prop_assert_eq!(deal.hands[1].len(), HAND_SIZE);
        prop_assert_eq!(deal.discard.len(), 1);
        prop_assert_eq!(deal.deck.len(), DECK_SIZE - 2 * HAND_SIZE - 1);

        let mut all: Vec<_> = deal.hands.iter().flatten()
            .chain(deal.discard.iter())
            .chain(deal.deck.iter())
            .copied()
            .collect();
        all.sort();
        prop_assert_eq!(all, create_deck());
    }
}
