pub mod exchange;
pub mod purchase;

pub use exchange::{all_possible_exchanges, Exchange};
pub use purchase::{find_all_possible_purchases, Policy, PurchaseSequence};
