#![allow(unused)]

pub mod agent;
pub mod card;
pub mod clock;
pub mod driver;
pub mod equation;
pub mod error;
pub mod pebble;
pub mod referee;
pub mod rulebook;
pub mod search;
pub mod strategy;
pub mod turn_state;

pub use crate::agent::{AdversarialAgent, CheatMode, FaultPoint, PlayerAgent, StrategyAgent};
pub use crate::card::{Card, Deck};
pub use crate::driver::execute_game;
pub use crate::equation::{Equation, EquationSet};
pub use crate::error::{AgentFault, DeserializeError, InternalError};
pub use crate::pebble::{PebbleCollection, PebbleColor};
pub use crate::referee::{BonusConfig, GameState, Observer, PlayerState, Referee};
pub use crate::search::{all_possible_exchanges, find_all_possible_purchases, Exchange, Policy, PurchaseSequence};
pub use crate::turn_state::TurnState;

/// Shared persistence convenience, implemented for every type with a
/// hand-written `Serialize`/`Deserialize` round trip.
pub trait JSONable: serde::Serialize + serde::de::DeserializeOwned {
    fn from_json(json: &str) -> Self {
        serde_json::from_str(json).expect("Should be able to deserialize")
    }
    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("Should be able to serialize")
    }
}

impl JSONable for PebbleCollection {}
impl JSONable for Equation {}
impl JSONable for EquationSet {}
impl JSONable for Card {}
impl JSONable for Deck {}
impl JSONable for TurnState {}
