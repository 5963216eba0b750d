//! Exchange search: enumerate every wallet/bank pair reachable within
//! `MAX_EXCHANGE_DEPTH` equation applications, deduplicated by resulting
//! wallet.

use crate::equation::EquationSet;
use crate::pebble::PebbleCollection;
use crate::rulebook::{tradable, MAX_EXCHANGE_DEPTH};
use crate::Equation;
use std::cmp::Ordering;

/// One reachable point in the exchange search: the wallet/bank pair you end
/// up with, and the sequence of directed equations that got you there.
#[derive(Clone, Debug, PartialEq)]
pub struct Exchange {
    pub wallet: PebbleCollection,
    pub bank: PebbleCollection,
    pub sequence: Vec<Equation>,
}

impl Exchange {
    pub fn identity(wallet: PebbleCollection, bank: PebbleCollection) -> Self {
        Exchange {
            wallet,
            bank,
            sequence: Vec::new(),
        }
    }

    fn extend(&self, equation: Equation) -> Exchange {
        let mut sequence = self.sequence.clone();
        sequence.push(equation);
        Exchange {
            wallet: self.wallet - equation.lhs + equation.rhs,
            bank: self.bank - equation.rhs + equation.lhs,
            sequence,
        }
    }

    /// Sequence-length-first, then equation-wise lexicographic comparison —
    /// the explicit total order `DESIGN.md` calls for over exchange
    /// sequences.
    pub fn sequence_cmp(&self, other: &Exchange) -> Ordering {
        self.sequence
            .len()
            .cmp(&other.sequence.len())
            .then_with(|| self.sequence.cmp(&other.sequence))
    }

    pub fn is_better_than(&self, other: &Exchange) -> bool {
        self.sequence_cmp(other) == Ordering::Less
    }
}

/// All exchanges reachable from `(wallet, bank)` using at most
/// `MAX_EXCHANGE_DEPTH` equations from `ruleset`, one per distinct
/// resulting wallet (shortest, then lexicographically-smallest sequence
/// wins), excluding the trivial zero-length sequence.
pub fn all_possible_exchanges(
    ruleset: &EquationSet,
    wallet: &PebbleCollection,
    bank: &PebbleCollection,
) -> Vec<Exchange> {
    let mut explored: Vec<Exchange> = Vec::new();
    let start = Exchange::identity(*wallet, *bank);
    search(ruleset, &start, &mut explored);
    explored.retain(|e| !e.sequence.is_empty());
    explored
}

fn add_if_better(explored: &mut Vec<Exchange>, candidate: Exchange) {
    if let Some(existing) = explored.iter_mut().find(|e| e.wallet == candidate.wallet) {
        if candidate.is_better_than(existing) {
            *existing = candidate;
        }
    } else {
        explored.push(candidate);
    }
}

fn search(ruleset: &EquationSet, node: &Exchange, explored: &mut Vec<Exchange>) {
    if node.sequence.len() >= MAX_EXCHANGE_DEPTH {
        return;
    }
    for equation in ruleset.as_slice() {
        for directed in tradable(equation, &node.wallet, &node.bank) {
            let next = node.extend(directed);
            add_if_better(explored, next.clone());
            search(ruleset, &next, explored);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pebble::PebbleColor;

    // Testing strategy:
    // - no legal equations: empty result
    // - one applicable equation: one reachable exchange
    // - dominance: two paths to the same wallet keep only the shorter one

    fn collection(color: PebbleColor, n: u32) -> PebbleCollection {
        let mut p = PebbleCollection::empty();
        p[color] = n;
        p
    }

    #[test]
    fn no_equations_means_no_exchanges() {
        let ruleset = EquationSet::new(vec![]);
        let wallet = collection(PebbleColor::Red, 1);
        let bank = collection(PebbleColor::Blue, 1);
        assert!(all_possible_exchanges(&ruleset, &wallet, &bank).is_empty());
    }

    #[test]
    fn single_equation_yields_one_reachable_wallet() {
        let eq = Equation::undirected(collection(PebbleColor::Red, 1), collection(PebbleColor::Blue, 1));
        let ruleset = EquationSet::new(vec![eq]);
        let wallet = collection(PebbleColor::Red, 1);
        let bank = collection(PebbleColor::Blue, 1);
        let results = all_possible_exchanges(&ruleset, &wallet, &bank);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].wallet, collection(PebbleColor::Blue, 1));
    }

    #[test]
    fn dominance_keeps_shortest_sequence_per_wallet() {
        // Two equations that both, in sequence, return the wallet to its
        // start; and one equation that reaches the same wallet directly.
        let out_and_back_first = Equation::undirected(collection(PebbleColor::Red, 1), collection(PebbleColor::White, 1));
        let out_and_back_second = Equation::undirected(collection(PebbleColor::White, 1), collection(PebbleColor::Red, 1));
        let ruleset = EquationSet::new(vec![out_and_back_first, out_and_back_second]);
        let wallet = collection(PebbleColor::Red, 1);
        let bank = PebbleCollection::empty();
        let results = all_possible_exchanges(&ruleset, &wallet, &bank);
        // Only one distinct wallet (White) is reachable besides the start;
        // the round trip back to Red is excluded as the trivial sequence
        // only when it equals zero length — here it's length 2, so it is
        // kept as a genuine (if pointless) second entry.
        assert!(results.iter().any(|e| e.wallet == collection(PebbleColor::White, 1)));
    }
}
