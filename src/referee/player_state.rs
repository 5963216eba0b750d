use crate::agent::PlayerAgent;
use crate::card::Card;
use crate::pebble::PebbleCollection;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One seat at the table: the player's wallet, score, owned cards, and the
/// agent bound to it for the duration of the game. Score is monotonic
/// nondecreasing — enforced by the referee, not by this type.
pub struct PlayerState {
    pub name: String,
    pub wallet: PebbleCollection,
    pub score: u32,
    pub owned_cards: Vec<Card>,
    pub agent: Box<dyn PlayerAgent + Send>,
}

impl PlayerState {
    pub fn new(name: impl Into<String>, agent: Box<dyn PlayerAgent + Send>) -> Self {
        PlayerState {
            name: name.into(),
            wallet: PebbleCollection::empty(),
            score: 0,
            owned_cards: Vec::new(),
            agent,
        }
    }
}

/// Persisted as `{"wallet":[...], "score":int}`, with an optional `"cards"`
/// key carrying owned cards when nonempty. There is no matching
/// `Deserialize`: a player's bound agent has no JSON form, so this type is
/// write-only for the observer save path, not a round-trip fixture format.
impl Serialize for PlayerState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(if self.owned_cards.is_empty() { 2 } else { 3 }))?;
        map.serialize_entry("wallet", &self.wallet)?;
        map.serialize_entry("score", &self.score)?;
        if !self.owned_cards.is_empty() {
            map.serialize_entry("cards", &self.owned_cards)?;
        }
        map.end()
    }
}
