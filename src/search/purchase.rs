//! Purchase search: enumerate ordered, affordable purchase sequences from
//! the visible deck, keeping only the sequences that dominate under the
//! active policy.

use crate::card::{Card, Deck};
use crate::pebble::PebbleCollection;
use crate::rulebook::{can_purchase, score_if_bought};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    #[serde(rename = "purchase-points")]
    Points,
    #[serde(rename = "purchase-size")]
    Size,
}

/// One ordered sequence of purchases, with the wallet/bank left over and
/// the total points scored (each card scored against the wallet at the
/// moment it was bought).
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseSequence {
    pub cards: Vec<Card>,
    pub points: u32,
    pub wallet: PebbleCollection,
    pub bank: PebbleCollection,
}

impl PurchaseSequence {
    pub fn empty(wallet: PebbleCollection, bank: PebbleCollection) -> Self {
        PurchaseSequence {
            cards: Vec::new(),
            points: 0,
            wallet,
            bank,
        }
    }

    fn extend(&self, card: Card) -> PurchaseSequence {
        let points_for_card = score_if_bought(&card, &self.wallet);
        let mut cards = self.cards.clone();
        cards.push(card);
        PurchaseSequence {
            cards,
            points: self.points + points_for_card,
            wallet: self.wallet - card.pebbles,
            bank: self.bank + card.pebbles,
        }
    }

    /// Re-scores this sequence from scratch against a (possibly different)
    /// starting wallet, stopping at the first card that wallet can't
    /// afford.
    pub fn score_against(&self, wallet: &PebbleCollection) -> u32 {
        let mut wallet = *wallet;
        let mut points = 0;
        for card in &self.cards {
            if !can_purchase(card, &wallet) {
                break;
            }
            points += score_if_bought(card, &wallet);
            wallet -= card.pebbles;
        }
        points
    }

    /// The wallet left after replaying this sequence against `wallet`, or
    /// `wallet` unchanged if the sequence isn't fully affordable from it.
    pub fn remaining_pebbles(&self, wallet: &PebbleCollection) -> PebbleCollection {
        let mut current = *wallet;
        for card in &self.cards {
            if !can_purchase(card, &current) {
                return *wallet;
            }
            current -= card.pebbles;
        }
        current
    }
}

/// Every affordable ordered purchase sequence from `visibles`, keeping only
/// the ones tied for best under `policy`.
pub fn find_all_possible_purchases(
    visibles: &Deck,
    wallet: &PebbleCollection,
    bank: &PebbleCollection,
    policy: Policy,
) -> Vec<PurchaseSequence> {
    let mut candidates = Vec::new();
    let start = PurchaseSequence::empty(*wallet, *bank);
    search(visibles, &start, policy, &mut candidates);
    candidates
}

fn add_if_better(candidates: &mut Vec<PurchaseSequence>, candidate: PurchaseSequence, policy: Policy) {
    let candidate_key = match policy {
        Policy::Points => candidate.points,
        Policy::Size => candidate.cards.len() as u32,
    };
    let best_key = candidates
        .first()
        .map(|best| match policy {
            Policy::Points => best.points,
            Policy::Size => best.cards.len() as u32,
        });
    match best_key {
        None => candidates.push(candidate),
        Some(best) if candidate_key > best => {
            candidates.clear();
            candidates.push(candidate);
        }
        Some(best) if candidate_key == best => {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        _ => {}
    }
}

fn search(
    visibles: &Deck,
    node: &PurchaseSequence,
    policy: Policy,
    candidates: &mut Vec<PurchaseSequence>,
) {
    let affordable = visibles.find_matching_cards(&node.wallet);
    if !node.cards.is_empty() {
        add_if_better(candidates, node.clone(), policy);
    }
    for card in affordable {
        let mut remaining = visibles.clone();
        remaining.pop_card(&card);
        let next = node.extend(card);
        search(&remaining, &next, policy, candidates);
    }
}
