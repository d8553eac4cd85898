//! Capture resolution: which table cards a played card may take.
//!
//! Three capture shapes exist:
//! - a Jack takes the whole table,
//! - any other card takes a single table card of the same rank,
//! - a numbered card takes any group of two or more numbered table cards
//!   whose values add up to its own value.
//!
//! Face cards (J/Q/K) never take part in a sum.

use crate::domain::Card;

/// Every capture the player could choose with `played` against `table`.
///
/// Single-rank matches come first, one per matching table card, followed by
/// summation groups in include/exclude search order. Cards with equal values
/// are treated as distinct elements. No returned group is empty.
pub fn legal_captures(played: Card, table: &[Card]) -> Vec<Vec<Card>> {
    if played.is_jack() {
        if table.is_empty() {
            return Vec::new();
        }
        return vec![table.to_vec()];
    }

    let mut combos: Vec<Vec<Card>> = table
        .iter()
        .filter(|c| c.rank == played.rank)
        .map(|c| vec![*c])
        .collect();

    let target = played.numeric_value();
    if target > 0 {
        let numbered: Vec<Card> = table
            .iter()
            .copied()
            .filter(|c| c.numeric_value() > 0)
            .collect();
        let mut current = Vec::with_capacity(numbered.len());
        collect_sums(&numbered, 0, target, &mut current, &mut combos);
    }

    combos
}

// Single-card sums are already covered by the rank matches above: among
// numbered cards, equal value means equal rank.
fn collect_sums(
    cards: &[Card],
    idx: usize,
    remaining: u8,
    current: &mut Vec<Card>,
    out: &mut Vec<Vec<Card>>,
) {
    if remaining == 0 {
        if current.len() > 1 {
            out.push(current.clone());
        }
        return;
    }
    let Some(&card) = cards.get(idx) else {
        return;
    };

    let value = card.numeric_value();
    if value <= remaining {
        current.push(card);
        collect_sums(cards, idx + 1, remaining - value, current, out);
        current.pop();
    }
    collect_sums(cards, idx + 1, remaining, current, out);
}

/// Whether `chosen` is an acceptable capture for `played` on `table`.
///
/// An empty selection is always legal: the card is laid face-up.
pub fn is_legal_capture(played: Card, chosen: &[Card], table: &[Card]) -> bool {
    if chosen.is_empty() {
        return true;
    }

    // Multiset containment: each chosen card must be on the table once.
    let mut left_on_table = table.to_vec();
    for card in chosen {
        match left_on_table.iter().position(|t| t == card) {
            Some(pos) => {
                left_on_table.swap_remove(pos);
            }
            None => return false,
        }
    }

    if played.is_jack() {
        return left_on_table.is_empty();
    }

    if chosen.len() == 1 {
        return chosen[0].rank == played.rank;
    }

    let target = played.numeric_value() as u32;
    target > 0
        && chosen.iter().all(|c| c.numeric_value() > 0)
        && chosen.iter().map(|c| c.numeric_value() as u32).sum::<u32>() == target
}

/// Whether `played` can capture anything at all.
pub fn can_capture(played: Card, table: &[Card]) -> bool {
    !legal_captures(played, table).is_empty()
}
