//! Pure rule functions. None of these touch agents, the referee state
//! machine, or I/O — everything here is a plain function over values.

use crate::card::{Card, Deck};
use crate::equation::{Equation, EquationSet};
use crate::pebble::{PebbleCollection, PebbleColor};
use crate::referee::game_state::GameState;

pub const WIN_SCORE: u32 = 20;
pub const MAX_EXCHANGE_DEPTH: usize = 4;
pub const MAX_VISIBLE_CARDS: usize = 4;

/// The RWB bonus: +10 if any owned card's pebbles contain red, white, and
/// blue.
pub const RWB_BONUS: u32 = 10;
/// The SEY bonus: +50 if any owned card's pebbles contain all five colors.
pub const SEY_BONUS: u32 = 50;

/// Every direction of `equation` that is legal to apply right now: `lhs`
/// drawn from `wallet`, `rhs` drawn from `bank`. Returns 0, 1, or 2
/// directed equations.
pub fn tradable(equation: &Equation, wallet: &PebbleCollection, bank: &PebbleCollection) -> Vec<Equation> {
    let mut out = Vec::with_capacity(2);
    if wallet.contains(&equation.lhs) && bank.contains(&equation.rhs) {
        out.push(Equation::directed(equation.lhs, equation.rhs));
    }
    if wallet.contains(&equation.rhs) && bank.contains(&equation.lhs) {
        out.push(Equation::directed(equation.rhs, equation.lhs));
    }
    out
}

/// Applies a sequence of directed equations in order. Fails if the
/// sequence is too long, any step's lhs/rhs is unaffordable, or a listed
/// equation is not a direction of any equation in `ruleset`.
pub fn apply_trade_sequence(
    sequence: &[Equation],
    ruleset: &EquationSet,
    wallet: &PebbleCollection,
    bank: &PebbleCollection,
) -> Option<(PebbleCollection, PebbleCollection)> {
    if sequence.len() > MAX_EXCHANGE_DEPTH {
        return None;
    }
    let mut wallet = *wallet;
    let mut bank = *bank;
    for step in sequence {
        if !ruleset.contains(step) {
            return None;
        }
        if !wallet.contains(&step.lhs) || !bank.contains(&step.rhs) {
            return None;
        }
        wallet = wallet - step.lhs + step.rhs;
        bank = bank - step.rhs + step.lhs;
    }
    Some((wallet, bank))
}

pub fn can_purchase(card: &Card, wallet: &PebbleCollection) -> bool {
    wallet.contains(&card.pebbles)
}

/// Applies an ordered purchase sequence. Each card must be visible AND
/// affordable at the moment it is bought; the spent pebbles go to the bank.
pub fn apply_purchase_sequence(
    cards: &[Card],
    visibles: &Deck,
    wallet: &PebbleCollection,
    bank: &PebbleCollection,
) -> Option<(PebbleCollection, PebbleCollection)> {
    let mut wallet = *wallet;
    let mut bank = *bank;
    let mut remaining_visibles = visibles.clone();
    for card in cards {
        if !remaining_visibles.contains(card) || !can_purchase(card, &wallet) {
            return None;
        }
        remaining_visibles.pop_card(card);
        wallet -= card.pebbles;
        bank += card.pebbles;
    }
    Some((wallet, bank))
}

/// Points scored for buying `card` out of `wallet`; 0 if unaffordable.
pub fn score_if_bought(card: &Card, wallet: &PebbleCollection) -> u32 {
    if !can_purchase(card, wallet) {
        return 0;
    }
    let remaining = *wallet - card.pebbles;
    card.score_for_remaining(&remaining)
}

/// Draws the canonically-smallest-color pebble present. `None` iff empty.
pub fn draw_pebble(bank: &PebbleCollection) -> Option<(PebbleColor, PebbleCollection)> {
    let mut bank = *bank;
    let color = bank.draw()?;
    Some((color, bank))
}

/// True once any one of the terminal conditions holds: no players left, a
/// player has reached `WIN_SCORE`, the visible row is empty, or the bank
/// is empty and no remaining player can afford any visible card.
pub fn is_game_over(state: &GameState) -> bool {
    state.players.is_empty()
        || state.players.iter().any(|p| p.score >= WIN_SCORE)
        || state.visibles_empty()
        || (state.is_bank_empty() && !state.can_any_remaining_player_afford_any_visible_card())
}

pub fn has_rwb(pebbles: &PebbleCollection) -> bool {
    pebbles.red > 0 && pebbles.white > 0 && pebbles.blue > 0
}

pub fn has_sey(pebbles: &PebbleCollection) -> bool {
    PebbleColor::all().iter().all(|&c| pebbles[c] > 0)
}

/// Whether any owned card qualifies the player for the RWB bonus.
pub fn qualifies_for_rwb(owned_cards: &[Card]) -> bool {
    owned_cards.iter().any(|c| has_rwb(&c.pebbles))
}

/// Whether any owned card qualifies the player for the SEY bonus.
pub fn qualifies_for_sey(owned_cards: &[Card]) -> bool {
    owned_cards.iter().any(|c| has_sey(&c.pebbles))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Testing strategy:
    // - tradable: neither direction, one direction, both directions legal
    // - apply_trade_sequence: empty, within depth, over depth, unlisted equation
    // - score_if_bought: unaffordable (0), affordable with remaining-pebble cap
    // - draw_pebble: canonical color order, empty bank
    // - is_game_over: no players, win score reached, empty visibles, empty
    //   bank with no affordable card, and the live-game negative case

    fn red() -> PebbleCollection {
        PebbleCollection::from_counts(&[(PebbleColor::Red, 1)])
    }
    fn blue() -> PebbleCollection {
        PebbleCollection::from_counts(&[(PebbleColor::Blue, 1)])
    }

    #[test]
    fn tradable_returns_both_directions_when_both_legal() {
        let eq = Equation::undirected(red(), blue());
        let wallet = red() + blue();
        let bank = red() + blue();
        assert_eq!(tradable(&eq, &wallet, &bank).len(), 2);
    }

    #[test]
    fn tradable_returns_empty_when_neither_legal() {
        let eq = Equation::undirected(red(), blue());
        let wallet = PebbleCollection::empty();
        let bank = PebbleCollection::empty();
        assert!(tradable(&eq, &wallet, &bank).is_empty());
    }

    #[test]
    fn apply_trade_sequence_rejects_over_depth() {
        let eq = Equation::directed(red(), blue());
        let ruleset = EquationSet::new(vec![eq]);
        let sequence = vec![eq; MAX_EXCHANGE_DEPTH + 1];
        let wallet = PebbleCollection::starting_bank();
        let bank = PebbleCollection::starting_bank();
        assert!(apply_trade_sequence(&sequence, &ruleset, &wallet, &bank).is_none());
    }

    #[test]
    fn apply_trade_sequence_rejects_unlisted_equation() {
        let eq = Equation::directed(red(), blue());
        let other = Equation::directed(
            PebbleCollection::from_counts(&[(PebbleColor::Green, 1)]),
            PebbleCollection::from_counts(&[(PebbleColor::Yellow, 1)]),
        );
        let ruleset = EquationSet::new(vec![other]);
        let wallet = red();
        let bank = blue();
        assert!(apply_trade_sequence(&[eq], &ruleset, &wallet, &bank).is_none());
    }

    #[test]
    fn score_if_bought_is_zero_when_unaffordable() {
        let card = Card::new(
            PebbleCollection::from_counts(&[(PebbleColor::Red, 5)]),
            false,
        );
        assert_eq!(score_if_bought(&card, &PebbleCollection::empty()), 0);
    }

    #[test]
    fn draw_pebble_follows_canonical_order() {
        let bank = PebbleCollection::from_counts(&[(PebbleColor::Yellow, 1), (PebbleColor::Blue, 1)]);
        let (color, _) = draw_pebble(&bank).unwrap();
        assert_eq!(color, PebbleColor::Blue);
        assert!(draw_pebble(&PebbleCollection::empty()).is_none());
    }

    fn solo_state(
        bank: PebbleCollection,
        visibles: Deck,
        score: u32,
    ) -> GameState {
        use crate::agent::StrategyAgent;
        use crate::referee::player_state::PlayerState;
        use crate::search::purchase::Policy;
        use std::collections::VecDeque;

        let mut player = PlayerState::new("Solo", Box::new(StrategyAgent::new("Solo", Policy::Points)));
        player.score = score;
        let mut players = VecDeque::new();
        players.push_back(player);
        GameState::new(EquationSet::new(vec![]), bank, visibles, Deck::new(vec![]), players)
    }

    #[test]
    fn is_game_over_when_no_players_remain() {
        use std::collections::VecDeque;
        let state = GameState::new(
            EquationSet::new(vec![]),
            PebbleCollection::empty(),
            Deck::new(vec![]),
            Deck::new(vec![]),
            VecDeque::new(),
        );
        assert!(is_game_over(&state));
    }

    #[test]
    fn is_game_over_when_a_player_reaches_win_score() {
        let card = Card::new(PebbleCollection::from_counts(&[(PebbleColor::Red, 5)]), false);
        let state = solo_state(PebbleCollection::starting_bank(), Deck::new(vec![card]), WIN_SCORE);
        assert!(is_game_over(&state));
    }

    #[test]
    fn is_game_over_when_visibles_are_empty() {
        let state = solo_state(PebbleCollection::starting_bank(), Deck::new(vec![]), 0);
        assert!(is_game_over(&state));
    }

    #[test]
    fn is_game_over_when_bank_empty_and_no_card_affordable() {
        let card = Card::new(PebbleCollection::from_counts(&[(PebbleColor::Red, 5)]), false);
        let state = solo_state(PebbleCollection::empty(), Deck::new(vec![card]), 0);
        assert!(is_game_over(&state));
    }

    #[test]
    fn is_game_over_is_false_mid_game() {
        let card = Card::new(PebbleCollection::from_counts(&[(PebbleColor::Red, 5)]), false);
        let state = solo_state(PebbleCollection::starting_bank(), Deck::new(vec![card]), 0);
        assert!(!is_game_over(&state));
    }
}
