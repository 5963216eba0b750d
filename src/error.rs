use derive_more::{Display, Error};

/// Malformed persisted JSON for any of the crate's serializable forms.
#[derive(Debug, Display, Error)]
pub enum DeserializeError {
    #[display(fmt = "missing required field `{}`", field)]
    MissingField { field: &'static str },
    #[display(fmt = "invalid pebble color string `{}`", value)]
    InvalidColor { value: String },
    #[display(fmt = "equation side has {} pebbles, must be in 1..=4", size)]
    InvalidEquationSize { size: u32 },
    #[display(fmt = "equation sides share a color")]
    NonDisjointEquation,
    #[display(fmt = "card has {} pebbles, must be exactly 5", size)]
    InvalidCardSize { size: u32 },
}

/// Why an agent's turn was refused. The referee's reaction is uniform
/// (kick) regardless of variant; this exists for logging and for
/// fault-injection tests.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum AgentFault {
    #[display(fmt = "requested equation is not in the ruleset")]
    UseNonExistentEquation,
    #[display(fmt = "bank cannot supply this trade")]
    BankCannotTrade,
    #[display(fmt = "wallet cannot supply this trade")]
    WalletCannotTrade,
    #[display(fmt = "exchange sequence exceeds maximum depth")]
    ExchangeDepthExceeded,
    #[display(fmt = "requested card is not visible")]
    BuyUnavailableCard,
    #[display(fmt = "wallet cannot afford this card")]
    WalletCannotBuyCard,
    #[display(fmt = "agent callback panicked")]
    CallbackPanicked,
    #[display(fmt = "agent callback exceeded its time budget")]
    TimedOut,
}

/// An invariant the rest of the crate assumes construction makes
/// impossible (e.g. pebble conservation broken after a legal trade). Not
/// part of the public fallible API — reaching one is a bug in this crate,
/// not in caller input.
#[derive(Debug, Display, Error)]
pub enum InternalError {
    #[display(fmt = "pebble conservation violated: {}", detail)]
    ConservationViolated { detail: String },
}
