//! The abstract player-agent capability the referee consults. `PlayerAgent`
//! is the in-process trait any strategy — greedy, scripted, or
//! adversarial — implements; the referee never knows which.

use crate::equation::{Equation, EquationSet};
use crate::search::purchase::{Policy, PurchaseSequence};
use crate::turn_state::TurnState;

/// One of the four callbacks the referee may consult on an agent, used by
/// test harnesses to target a specific fault point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    Setup,
    RequestExchange,
    RequestPurchase,
    Win,
}

/// A deliberately-perturbed response mode for adversarial test agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheatMode {
    UseNonExistentEquation,
    BankCannotTrade,
    WalletCannotTrade,
    BuyUnavailableCard,
    WalletCannotBuyCard,
}

/// The capability set the referee drives each turn. Implementations may
/// panic (the referee catches it at the callback boundary, see
/// `referee::call_with_fault_shield`) to simulate a faulting agent.
pub trait PlayerAgent {
    fn setup(&mut self, equations: &EquationSet);

    /// `None` means there is nothing this agent can or wants to do this
    /// turn (no trade possible and the bank is empty — a "skip", not a
    /// fault). `Some(vec![])` means "draw a pebble."
    fn request_exchange(&mut self, turn_state: &TurnState) -> Option<Vec<Equation>>;

    fn request_purchase(&mut self, turn_state: &TurnState) -> PurchaseSequence;

    fn win(&mut self, did_win: bool);
}

/// The non-adversarial greedy agent: answers every callback using the
/// policy-driven search and tie-break chain in `strategy`.
pub struct StrategyAgent {
    pub name: String,
    pub policy: Policy,
    equations: Option<EquationSet>,
}

impl StrategyAgent {
    pub fn new(name: impl Into<String>, policy: Policy) -> Self {
        StrategyAgent {
            name: name.into(),
            policy,
            equations: None,
        }
    }

    fn ruleset(&self) -> &EquationSet {
        self.equations
            .as_ref()
            .expect("setup must be called before any request_* callback")
    }
}

impl PlayerAgent for StrategyAgent {
    fn setup(&mut self, equations: &EquationSet) {
        self.equations = Some(equations.clone());
    }

    fn request_exchange(&mut self, turn_state: &TurnState) -> Option<Vec<Equation>> {
        crate::strategy::request_exchange(self.ruleset(), turn_state, self.policy)
    }

    fn request_purchase(&mut self, turn_state: &TurnState) -> PurchaseSequence {
        crate::strategy::request_purchase(turn_state, self.policy)
    }

    fn win(&mut self, _did_win: bool) {}
}

/// Wraps another agent, injecting a panic on the Nth call to a chosen
/// callback, or perturbing its response according to a cheat mode. Used
/// exclusively by fault-handling tests.
pub struct AdversarialAgent {
    inner: StrategyAgent,
    fault_point: Option<(FaultPoint, u32)>,
    cheat: Option<CheatMode>,
    calls: u32,
}

impl AdversarialAgent {
    pub fn new(inner: StrategyAgent) -> Self {
        AdversarialAgent {
            inner,
            fault_point: None,
            cheat: None,
            calls: 0,
        }
    }

    pub fn with_fault_at(mut self, point: FaultPoint, count: u32) -> Self {
        self.fault_point = Some((point, count));
        self
    }

    pub fn with_cheat(mut self, cheat: CheatMode) -> Self {
        self.cheat = Some(cheat);
        self
    }

    fn maybe_panic(&mut self, point: FaultPoint) {
        self.calls += 1;
        if let Some((target, count)) = self.fault_point {
            if target == point && self.calls == count {
                panic!("AdversarialAgent: injected fault at {:?} call {}", point, count);
            }
        }
    }
}

impl PlayerAgent for AdversarialAgent {
    fn setup(&mut self, equations: &EquationSet) {
        self.maybe_panic(FaultPoint::Setup);
        self.inner.setup(equations);
    }

    fn request_exchange(&mut self, turn_state: &TurnState) -> Option<Vec<Equation>> {
        self.maybe_panic(FaultPoint::RequestExchange);
        let response = self.inner.request_exchange(turn_state);
        match self.cheat {
            Some(CheatMode::UseNonExistentEquation) => Some(vec![Equation::directed(
                crate::pebble::PebbleCollection::empty(),
                crate::pebble::PebbleCollection::empty(),
            )]),
            Some(CheatMode::WalletCannotTrade) => Some(vec![Equation::directed(
                turn_state.active_wallet + crate::pebble::PebbleCollection::one(crate::pebble::PebbleColor::Red),
                crate::pebble::PebbleCollection::one(crate::pebble::PebbleColor::Blue),
            )]),
            Some(CheatMode::BankCannotTrade) => Some(vec![Equation::directed(
                crate::pebble::PebbleCollection::one(crate::pebble::PebbleColor::Red),
                turn_state.bank + crate::pebble::PebbleCollection::one(crate::pebble::PebbleColor::Blue),
            )]),
            _ => response,
        }
    }

    fn request_purchase(&mut self, turn_state: &TurnState) -> PurchaseSequence {
        self.maybe_panic(FaultPoint::RequestPurchase);
        let response = self.inner.request_purchase(turn_state);
        match self.cheat {
            Some(CheatMode::BuyUnavailableCard) | Some(CheatMode::WalletCannotBuyCard) => {
                let mut bogus = response.clone();
                bogus.cards.push(crate::card::Card::new(
                    crate::pebble::PebbleCollection::from_counts(&[
                        (crate::pebble::PebbleColor::Red, 5),
                    ]),
                    true,
                ));
                bogus
            }
            _ => response,
        }
    }

    fn win(&mut self, did_win: bool) {
        self.maybe_panic(FaultPoint::Win);
        self.inner.win(did_win);
    }
}
