/// Property-based tests for capture soundness and exhaustiveness
use proptest::prelude::*;

use crate::domain::capture::{is_legal_capture, legal_captures};
use crate::domain::{test_gens, test_prelude, Card};

fn sorted(mut cards: Vec<Card>) -> Vec<Card> {
    cards.sort();
    cards
}

fn subsets(table: &[Card]) -> impl Iterator<Item = Vec<Card>> + '_ {
    (1u32..(1u32 << table.len())).map(move |mask| {
        table
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, c)| *c)
            .collect()
    })
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Every offered combination is accepted by the validator.
    #[test]
    fn prop_offered_captures_are_legal((played, table) in test_gens::played_and_table(10)) {
        for combo in legal_captures(played, &table) {
            prop_assert!(!combo.is_empty());
            prop_assert!(is_legal_capture(played, &combo, &table),
                "{:?} offered {:?} on {:?} but validator refused", played, combo, table);
        }
    }

    /// Any non-empty selection the resolver did not offer is refused.
    #[test]
    fn prop_unoffered_selections_are_illegal((played, table) in test_gens::played_and_table(9)) {
        let offered: Vec<Vec<Card>> = legal_captures(played, &table)
            .into_iter()
            .map(sorted)
            .collect();
        for subset in subsets(&table) {
            let legal = is_legal_capture(played, &subset, &table);
            let was_offered = offered.contains(&sorted(subset.clone()));
            prop_assert_eq!(legal, was_offered,
                "{:?} with {:?} on {:?}", played, subset, table);
        }
    }

    /// A Jack offers exactly the full table, or nothing on an empty table.
    #[test]
    fn prop_jack_captures_all(suit in test_gens::suit(), table in test_gens::unique_cards(0, 12)) {
        let jack = Card { suit, rank: crate::domain::Rank::Jack };
        let table: Vec<Card> = table.into_iter().filter(|c| *c != jack).collect();
        let combos = legal_captures(jack, &table);
        if table.is_empty() {
            prop_assert!(combos.is_empty());
        } else {
            prop_assert_eq!(combos, vec![table.clone()]);
        }
    }

    /// Summation groups always add up to the played card's value.
    #[test]
    fn prop_sums_match_value((played, table) in test_gens::played_and_table(10)) {
        for combo in legal_captures(played, &table) {
            if combo.len() > 1 && !played.is_jack() {
                let sum: u32 = combo.iter().map(|c| c.numeric_value() as u32).sum();
                prop_assert_eq!(sum, played.numeric_value() as u32);
                prop_assert!(combo.iter().all(|c| c.numeric_value() > 0));
            }
        }
    }
}
