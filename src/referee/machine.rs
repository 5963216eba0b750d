//! The referee state machine: `Exchange -> Purchase -> (Exchange | Over)`.
//! Each step consults exactly one agent callback under a fault shield,
//! validates its reply against the rulebook, mutates state on success, and
//! retests the terminal condition. `Init` (building or adopting a
//! `GameState` and calling `setup` on every agent) lives in `driver`,
//! upstream of this loop.

use crate::equation::Equation;
use crate::error::{AgentFault, InternalError};
use crate::referee::game_state::GameState;
use crate::referee::observer::{notify_all, notify_game_over, Observer};
use crate::rulebook::{apply_trade_sequence, can_purchase, score_if_bought, MAX_EXCHANGE_DEPTH, RWB_BONUS, SEY_BONUS};
use crate::{clock, rulebook};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Exchange,
    Purchase,
    Over,
}

pub struct BonusConfig {
    pub rwb: bool,
    pub sey: bool,
}

impl Default for BonusConfig {
    fn default() -> Self {
        BonusConfig { rwb: false, sey: false }
    }
}

/// Debug-only check that a trade or purchase moved pebbles between bank
/// and wallets without creating or destroying any — `before`/`after` are
/// `GameState::total_pebbles` readings taken around the mutation.
fn assert_pebbles_conserved(before: u32, after: u32) {
    debug_assert!(
        before == after,
        "{}",
        InternalError::ConservationViolated {
            detail: format!("{before} pebbles before, {after} after"),
        }
    );
}

pub struct Referee {
    pub state: GameState,
    pub phase: Phase,
    pub observers: Vec<Box<dyn Observer>>,
    pub kicked: Vec<String>,
    pub bonus: BonusConfig,
}

impl Referee {
    pub fn new(state: GameState, bonus: BonusConfig) -> Self {
        Referee {
            state,
            phase: Phase::Exchange,
            observers: Vec::new(),
            kicked: Vec::new(),
            bonus,
        }
    }

    /// Runs the state machine to completion, returning
    /// `(winners_by_name_sorted, kicked_by_name_sorted)`.
    pub async fn run(&mut self) -> (Vec<String>, Vec<String>) {
        if self.is_terminal() {
            self.phase = Phase::Over;
        }
        while self.phase != Phase::Over {
            self.step().await;
            notify_all(&mut self.observers, &self.state);
            if self.is_terminal() {
                self.phase = Phase::Over;
            }
        }
        self.finalize().await
    }

    fn is_terminal(&self) -> bool {
        rulebook::is_game_over(&self.state)
    }

    async fn step(&mut self) {
        match self.phase {
            Phase::Exchange => self.exchange_step().await,
            Phase::Purchase => self.purchase_step().await,
            Phase::Over => unreachable!("run() never steps while Over"),
        }
    }

    async fn exchange_step(&mut self) {
        let turn_state = self.state.extract_turn_state();
        let active_name = self.state.active_player().name.clone();
        let agent = self.state.active_player_mut().agent.as_mut();
        let reply = clock::call_with_fault_shield(None, move || agent.request_exchange(&turn_state)).await;

        match reply {
            Err(fault) => self.kick_active(&active_name, fault),
            Ok(None) => self.kick_active(&active_name, AgentFault::WalletCannotTrade),
            Ok(Some(sequence)) => self.apply_exchange_reply(&active_name, sequence),
        }
    }

    fn apply_exchange_reply(&mut self, active_name: &str, sequence: Vec<Equation>) {
        if sequence.is_empty() {
            if self.state.draw_for_active() {
                debug!("{active_name} drew a pebble");
                self.phase = Phase::Purchase;
            } else {
                self.kick_active(active_name, AgentFault::BankCannotTrade);
            }
            return;
        }
        if sequence.len() > MAX_EXCHANGE_DEPTH {
            self.kick_active(active_name, AgentFault::ExchangeDepthExceeded);
            return;
        }
        let active = self.state.active_player();
        match apply_trade_sequence(&sequence, &self.state.equations, &active.wallet, &self.state.bank) {
            Some((new_wallet, new_bank)) => {
                let before = self.state.total_pebbles();
                self.state.active_player_mut().wallet = new_wallet;
                self.state.bank = new_bank;
                assert_pebbles_conserved(before, self.state.total_pebbles());
                self.state.erode_one_card_after_trade();
                debug!("{active_name} traded {} equation(s)", sequence.len());
                self.phase = Phase::Purchase;
            }
            None => self.kick_active(active_name, AgentFault::UseNonExistentEquation),
        }
    }

    async fn purchase_step(&mut self) {
        let turn_state = self.state.extract_turn_state();
        let active_name = self.state.active_player().name.clone();
        let agent = self.state.active_player_mut().agent.as_mut();
        let reply = clock::call_with_fault_shield(None, move || agent.request_purchase(&turn_state)).await;

        match reply {
            Err(fault) => {
                self.kick_active(&active_name, fault);
                self.phase = Phase::Exchange;
            }
            Ok(sequence) => {
                self.apply_purchase_reply(&active_name, &sequence.cards);
            }
        }
    }

    fn apply_purchase_reply(&mut self, active_name: &str, cards: &[crate::card::Card]) {
        let mut wallet = self.state.active_player().wallet;
        let mut bank = self.state.bank;
        let mut total_points = 0u32;
        for card in cards {
            if !self.state.visibles.contains(card) || !can_purchase(card, &wallet) {
                self.kick_active(active_name, AgentFault::WalletCannotBuyCard);
                self.phase = Phase::Exchange;
                return;
            }
            total_points += score_if_bought(card, &wallet);
            wallet -= card.pebbles;
            bank += card.pebbles;
        }

        let before = self.state.total_pebbles();
        self.state.active_player_mut().wallet = wallet;
        self.state.bank = bank;
        assert_pebbles_conserved(before, self.state.total_pebbles());
        self.state.active_player_mut().score += total_points;
        self.state.active_player_mut().owned_cards.extend_from_slice(cards);
        self.state.refill_visibles_after_purchase(cards);
        debug!("{active_name} bought {} card(s) for {total_points} points", cards.len());

        self.state.rotate_to_next_turn();
        self.phase = Phase::Exchange;
    }

    fn kick_active(&mut self, name: &str, fault: AgentFault) {
        info!("kicking {name}: {fault}");
        let kicked_player = self.state.kick_active();
        self.kicked.push(kicked_player.name);
        self.phase = Phase::Exchange;
    }

    async fn finalize(&mut self) -> (Vec<String>, Vec<String>) {
        for player in self.state.players.iter_mut() {
            if self.bonus.rwb && rulebook::qualifies_for_rwb(&player.owned_cards) {
                player.score += RWB_BONUS;
            }
            if self.bonus.sey && rulebook::qualifies_for_sey(&player.owned_cards) {
                player.score += SEY_BONUS;
            }
        }

        let winner_names = loop {
            if self.state.players.is_empty() {
                break Vec::new();
            }
            let max_score = self.state.players.iter().map(|p| p.score).max().unwrap();
            let winners: Vec<String> = self
                .state
                .players
                .iter()
                .filter(|p| p.score == max_score)
                .map(|p| p.name.clone())
                .collect();

            let mut any_winner_faulted = false;
            let mut i = 0;
            while i < self.state.players.len() {
                if winners.contains(&self.state.players[i].name) {
                    let agent = self.state.players[i].agent.as_mut();
                    let result = clock::call_with_fault_shield(None, move || agent.win(true)).await;
                    if result.is_err() {
                        let kicked = self.state.players.remove(i).unwrap();
                        info!("winner {} faulted on win(true), recomputing", kicked.name);
                        self.kicked.push(kicked.name);
                        any_winner_faulted = true;
                        continue;
                    }
                }
                i += 1;
            }

            if any_winner_faulted {
                continue;
            }

            for player in self.state.players.iter_mut() {
                if !winners.contains(&player.name) {
                    let agent = player.agent.as_mut();
                    let _ = clock::call_with_fault_shield(None, move || agent.win(false)).await;
                }
            }
            break winners;
        };

        notify_game_over(&mut self.observers, &self.state);

        let mut winners_sorted = winner_names;
        winners_sorted.sort();
        let mut kicked_sorted = self.kicked.clone();
        kicked_sorted.sort();
        (winners_sorted, kicked_sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::StrategyAgent;
    use crate::card::Deck;
    use crate::equation::EquationSet;
    use crate::pebble::PebbleCollection;
    use crate::referee::player_state::PlayerState;
    use crate::search::purchase::Policy;
    use std::collections::VecDeque;

    // Testing strategy:
    // - S1: one player, empty bank, no affordable cards -> immediate winner
    // - S2: an agent that always faults on request_exchange ends up kicked, not a winner
    // - assert_pebbles_conserved: matching totals pass, mismatched totals panic

    fn lone_player_state(agent: Box<dyn crate::agent::PlayerAgent + Send>) -> GameState {
        let mut players = VecDeque::new();
        players.push_back(PlayerState::new("Solo", agent));
        GameState::new(
            EquationSet::new(vec![]),
            PebbleCollection::empty(),
            Deck::new(vec![]),
            Deck::new(vec![]),
            players,
        )
    }

    #[tokio::test]
    async fn one_player_empty_bank_wins_immediately() {
        let mut agent = StrategyAgent::new("Solo", Policy::Points);
        agent.setup(&EquationSet::new(vec![]));
        let state = lone_player_state(Box::new(agent));
        let mut referee = Referee::new(state, BonusConfig::default());
        let (winners, kicked) = referee.run().await;
        assert_eq!(winners, vec!["Solo".to_string()]);
        assert!(kicked.is_empty());
    }

    struct AlwaysFaults;
    impl crate::agent::PlayerAgent for AlwaysFaults {
        fn setup(&mut self, _equations: &EquationSet) {}
        fn request_exchange(&mut self, _turn_state: &crate::turn_state::TurnState) -> Option<Vec<Equation>> {
            panic!("always faults");
        }
        fn request_purchase(&mut self, _turn_state: &crate::turn_state::TurnState) -> crate::search::purchase::PurchaseSequence {
            unreachable!()
        }
        fn win(&mut self, _did_win: bool) {}
    }

    #[tokio::test]
    async fn faulting_agent_ends_up_kicked() {
        let state = lone_player_state(Box::new(AlwaysFaults));
        let mut referee = Referee::new(state, BonusConfig::default());
        let (winners, kicked) = referee.run().await;
        assert!(winners.is_empty());
        assert_eq!(kicked, vec!["Solo".to_string()]);
    }

    #[test]
    fn assert_pebbles_conserved_accepts_matching_totals() {
        assert_pebbles_conserved(100, 100);
    }

    #[test]
    #[should_panic(expected = "pebble conservation violated")]
    #[cfg(debug_assertions)]
    fn assert_pebbles_conserved_rejects_mismatched_totals() {
        assert_pebbles_conserved(100, 99);
    }
}
