use crate::card::Deck;
use crate::pebble::PebbleCollection;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserializer, Serialize, Serializer};
use std::fmt;

/// The information visible to the active player on their turn: the bank,
/// the visible cards, their own wallet and score, and every player's score
/// in turn order starting after the active player.
#[derive(Clone, Debug)]
pub struct TurnState {
    pub bank: PebbleCollection,
    pub cards: Deck,
    pub active_wallet: PebbleCollection,
    pub active_score: u32,
    pub other_scores: Vec<u32>,
}

impl TurnState {
    pub fn new(
        bank: PebbleCollection,
        cards: Deck,
        active_wallet: PebbleCollection,
        active_score: u32,
        other_scores: Vec<u32>,
    ) -> Self {
        TurnState {
            bank,
            cards,
            active_wallet,
            active_score,
            other_scores,
        }
    }
}

/// Persisted as `{"bank":[...], "cards":[...], "active":{"wallet":[...],
/// "score":int}, "scores":[int,...]}`.
impl Serialize for TurnState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("bank", &self.bank)?;
        map.serialize_entry("cards", &self.cards)?;
        map.serialize_entry(
            "active",
            &ActiveWire {
                wallet: self.active_wallet,
                score: self.active_score,
            },
        )?;
        map.serialize_entry("scores", &self.other_scores)?;
        map.end()
    }
}

#[derive(Serialize)]
struct ActiveWire {
    wallet: PebbleCollection,
    score: u32,
}

#[derive(serde::Deserialize)]
struct ActiveWireOwned {
    wallet: PebbleCollection,
    score: u32,
}

struct TurnStateVisitor;
impl<'de> Visitor<'de> for TurnStateVisitor {
    type Value = TurnState;
    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a map with \"bank\", \"cards\", \"active\", and \"scores\"")
    }
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TurnState, A::Error> {
        let mut bank: Option<PebbleCollection> = None;
        let mut cards: Option<Deck> = None;
        let mut active: Option<ActiveWireOwned> = None;
        let mut scores: Option<Vec<u32>> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "bank" => bank = Some(map.next_value()?),
                "cards" => cards = Some(map.next_value()?),
                "active" => active = Some(map.next_value()?),
                "scores" => scores = Some(map.next_value()?),
                _ => {
                    let _: de::IgnoredAny = map.next_value()?;
                }
            }
        }
        let bank = bank.ok_or_else(|| de::Error::missing_field("bank"))?;
        let cards = cards.ok_or_else(|| de::Error::missing_field("cards"))?;
        let active = active.ok_or_else(|| de::Error::missing_field("active"))?;
        let scores = scores.ok_or_else(|| de::Error::missing_field("scores"))?;
        Ok(TurnState {
            bank,
            cards,
            active_wallet: active.wallet,
            active_score: active.score,
            other_scores: scores,
        })
    }
}

impl<'de> serde::Deserialize<'de> for TurnState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TurnStateVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::pebble::PebbleColor;

    // Testing strategy:
    // - round trip through the exact nested wire shape

    #[test]
    fn json_round_trips_through_nested_active_object() {
        let turn = TurnState::new(
            PebbleCollection::one(PebbleColor::Red),
            Deck::new(vec![Card::new(
                PebbleCollection::from_counts(&[(PebbleColor::Blue, 5)]),
                false,
            )]),
            PebbleCollection::one(PebbleColor::White),
            3,
            vec![1, 2],
        );
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(
            json,
            r#"{"bank":["red"],"cards":[{"pebbles":["blue","blue","blue","blue","blue"]}],"active":{"wallet":["white"],"score":3},"scores":[1,2]}"#
        );
        let back: TurnState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bank, turn.bank);
        assert_eq!(back.active_wallet, turn.active_wallet);
        assert_eq!(back.active_score, turn.active_score);
        assert_eq!(back.other_scores, turn.other_scores);
    }
}
