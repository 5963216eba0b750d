//! Combines the exchange and purchase searches into the two decisions an
//! agent callback needs: what to trade, and what to buy. Tie-break chains
//! are layered filters that stop the moment one candidate remains.

use crate::equation::{Equation, EquationSet};
use crate::search::exchange::{all_possible_exchanges, Exchange};
use crate::search::purchase::{find_all_possible_purchases, Policy, PurchaseSequence};
use crate::turn_state::TurnState;

/// Narrows a set of `(exchange, purchase)` pairs down to one, applying:
/// highest re-scored points, then most pebbles left over, then
/// lexicographically smallest exchange wallet, then shortest purchase
/// sequence. Each stage only runs if more than one candidate remains.
fn tie_break_purchase_pairs(candidates: &[(Exchange, PurchaseSequence)]) -> (Exchange, PurchaseSequence) {
    let mut remaining: Vec<&(Exchange, PurchaseSequence)> = candidates.iter().collect();
    debug_assert!(!remaining.is_empty());

    if remaining.len() > 1 {
        let best = remaining
            .iter()
            .map(|(e, p)| p.score_against(&e.wallet))
            .max()
            .unwrap();
        remaining.retain(|(e, p)| p.score_against(&e.wallet) == best);
    }

    if remaining.len() > 1 {
        let best = remaining
            .iter()
            .map(|(e, p)| p.remaining_pebbles(&e.wallet).total())
            .max()
            .unwrap();
        remaining.retain(|(e, p)| p.remaining_pebbles(&e.wallet).total() == best);
    }

    if remaining.len() > 1 {
        let best = remaining.iter().map(|(e, _)| e.wallet).min().unwrap();
        remaining.retain(|(e, _)| e.wallet == best);
    }

    if remaining.len() > 1 {
        let best = remaining.iter().map(|(_, p)| p.cards.len()).min().unwrap();
        remaining.retain(|(_, p)| p.cards.len() == best);
    }

    remaining[0].clone()
}

/// The best purchase sequence reachable from a single exchange's resulting
/// wallet/bank: none if nothing is affordable, the sole candidate if only
/// one exists, else the winner of `tie_break_purchase_pairs`.
fn best_purchase(exchange: &Exchange, visibles: &crate::card::Deck, policy: Policy) -> PurchaseSequence {
    let candidates = find_all_possible_purchases(visibles, &exchange.wallet, &exchange.bank, policy);
    match candidates.len() {
        0 => PurchaseSequence::empty(exchange.wallet, exchange.bank),
        1 => candidates.into_iter().next().unwrap(),
        _ => {
            let pairs: Vec<_> = candidates
                .into_iter()
                .map(|c| (exchange.clone(), c))
                .collect();
            tie_break_purchase_pairs(&pairs).1
        }
    }
}

fn add_if_better_exchange_purchase(
    candidates: &mut Vec<(Exchange, PurchaseSequence)>,
    candidate: (Exchange, PurchaseSequence),
    policy: Policy,
) {
    let key = |p: &PurchaseSequence| match policy {
        Policy::Points => p.points,
        Policy::Size => p.cards.len() as u32,
    };
    let candidate_key = key(&candidate.1);
    let best_key = candidates.first().map(|(_, p)| key(p));
    match best_key {
        None => candidates.push(candidate),
        Some(best) if candidate_key > best => {
            candidates.clear();
            candidates.push(candidate);
        }
        Some(best) if candidate_key == best => candidates.push(candidate),
        _ => {}
    }
}

/// Fewest equations, then the card tie-break chain, then the
/// lexicographically smallest equation sequence.
fn tie_break_exchange_and_purchase(
    candidates: Vec<(Exchange, PurchaseSequence)>,
) -> (Exchange, PurchaseSequence) {
    debug_assert!(!candidates.is_empty());
    let min_len = candidates.iter().map(|(e, _)| e.sequence.len()).min().unwrap();
    let mut remaining: Vec<(Exchange, PurchaseSequence)> = candidates
        .into_iter()
        .filter(|(e, _)| e.sequence.len() == min_len)
        .collect();

    if remaining.len() > 1 {
        let winner = tie_break_purchase_pairs(&remaining);
        remaining.retain(|(e, p)| e.wallet == winner.0.wallet && p.cards == winner.1.cards);
    }

    if remaining.len() > 1 {
        remaining.sort_by(|a, b| a.0.sequence_cmp(&b.0));
    }

    remaining.into_iter().next().unwrap()
}

/// Chooses the turn's exchange: `None` means there is truly nothing to do
/// (no trade possible and the bank is empty); `Some` wraps the chosen
/// equation sequence, empty meaning "draw a pebble".
pub fn request_exchange(
    ruleset: &EquationSet,
    turn_state: &TurnState,
    policy: Policy,
) -> Option<Vec<Equation>> {
    let exchanges = all_possible_exchanges(ruleset, &turn_state.active_wallet, &turn_state.bank);

    if exchanges.is_empty() {
        return if turn_state.bank.is_empty() {
            None
        } else {
            Some(Vec::new())
        };
    }

    let mut candidates: Vec<(Exchange, PurchaseSequence)> = Vec::new();
    let identity = Exchange::identity(turn_state.active_wallet, turn_state.bank);
    for exchange in exchanges.iter().chain(std::iter::once(&identity)) {
        let purchase = best_purchase(exchange, &turn_state.cards, policy);
        add_if_better_exchange_purchase(&mut candidates, (exchange.clone(), purchase), policy);
    }

    if candidates.is_empty() {
        return Some(Vec::new());
    }

    let (winner, _) = tie_break_exchange_and_purchase(candidates);
    Some(winner.sequence)
}

/// Chooses the best purchase for the already-exchanged turn state.
pub fn request_purchase(turn_state: &TurnState, policy: Policy) -> PurchaseSequence {
    let candidates = find_all_possible_purchases(
        &turn_state.cards,
        &turn_state.active_wallet,
        &turn_state.bank,
        policy,
    );
    match candidates.len() {
        0 => PurchaseSequence::empty(turn_state.active_wallet, turn_state.bank),
        1 => candidates.into_iter().next().unwrap(),
        _ => {
            let identity = Exchange::identity(turn_state.active_wallet, turn_state.bank);
            let pairs: Vec<_> = candidates.into_iter().map(|c| (identity.clone(), c)).collect();
            tie_break_purchase_pairs(&pairs).1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Deck};
    use crate::pebble::{PebbleCollection, PebbleColor};

    // Testing strategy:
    // - no equations, empty bank: request_exchange returns None (skip)
    // - no equations, nonempty bank: request_exchange returns Some(empty) (draw)
    // - a clearly-better purchase sequence wins request_purchase outright

    #[test]
    fn skip_when_nothing_possible() {
        let ruleset = EquationSet::new(vec![]);
        let turn_state = TurnState::new(
            PebbleCollection::empty(),
            Deck::new(vec![]),
            PebbleCollection::empty(),
            0,
            vec![],
        );
        assert_eq!(request_exchange(&ruleset, &turn_state, Policy::Points), None);
    }

    #[test]
    fn draw_when_bank_nonempty_but_no_trades() {
        let ruleset = EquationSet::new(vec![]);
        let turn_state = TurnState::new(
            PebbleCollection::from_counts(&[(PebbleColor::Red, 1)]),
            Deck::new(vec![]),
            PebbleCollection::empty(),
            0,
            vec![],
        );
        assert_eq!(
            request_exchange(&ruleset, &turn_state, Policy::Points),
            Some(Vec::new())
        );
    }

    #[test]
    fn request_purchase_picks_the_only_affordable_card() {
        let card = Card::new(PebbleCollection::from_counts(&[(PebbleColor::Red, 5)]), true);
        let turn_state = TurnState::new(
            PebbleCollection::empty(),
            Deck::new(vec![card]),
            PebbleCollection::from_counts(&[(PebbleColor::Red, 5)]),
            0,
            vec![],
        );
        let result = request_purchase(&turn_state, Policy::Points);
        assert_eq!(result.cards, vec![card]);
    }
}
