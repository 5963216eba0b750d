use crate::pebble::{PebbleCollection, PebbleColor};
use rand::Rng;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserializer, Serialize, Serializer};
use std::fmt;

pub const PEBBLE_COUNT: u32 = 5;
pub const CARD_COUNT: usize = 20;
pub const MIN_CARDS_NUM: usize = 0;
pub const MAX_CARDS_NUM: usize = 20;

/// Score awarded for buying a card, keyed by the buyer's remaining pebble
/// count after the purchase (capped at 3) and whether the card carries the
/// happy-face bonus flag.
fn reward(remaining_pebbles_capped: u32, happy_face: bool) -> u32 {
    match (remaining_pebbles_capped, happy_face) {
        (0, false) => 5,
        (0, true) => 8,
        (1, false) => 3,
        (1, true) => 5,
        (2, false) => 2,
        (2, true) => 3,
        (3, false) => 1,
        (3, true) => 2,
        _ => unreachable!("remaining_pebbles_capped must be in 0..=3"),
    }
}

/// Caps a raw remaining-pebble count at 3, since the reward table only
/// distinguishes 0, 1, 2, and "3 or more".
pub fn cap_remaining(remaining: u32) -> u32 {
    remaining.min(3)
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub struct Card {
    pub pebbles: PebbleCollection,
    pub happy_face: bool,
}

impl Card {
    pub fn new(pebbles: PebbleCollection, happy_face: bool) -> Self {
        debug_assert_eq!(pebbles.total(), PEBBLE_COUNT, "a card always costs exactly 5 pebbles");
        Card { pebbles, happy_face }
    }

    pub fn generate_random(rng: &mut impl Rng) -> Self {
        let mut pebbles = PebbleCollection::empty();
        for _ in 0..PEBBLE_COUNT {
            let color = *PebbleColor::all()
                .as_slice()
                .iter()
                .nth(rng.gen_range(0..5))
                .unwrap();
            pebbles.add_pebble(color);
        }
        Card::new(pebbles, rng.gen_bool(0.5))
    }

    /// Points scored if this card is bought leaving `remaining_wallet`
    /// pebbles in the buyer's wallet.
    pub fn score_for_remaining(&self, remaining_wallet: &PebbleCollection) -> u32 {
        reward(cap_remaining(remaining_wallet.total()), self.happy_face)
    }
}

/// Length-then-field ordering, matching `PebbleCollection`'s own `Ord`,
/// with `happy_face` breaking ties between otherwise-identical pebble sets.
impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.pebbles
            .cmp(&other.pebbles)
            .then_with(|| self.happy_face.cmp(&other.happy_face))
    }
}

/// Persisted as `{"pebbles": [...], "face": bool}`, with `"face"` omitted
/// when false.
impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(if self.happy_face { 2 } else { 1 }))?;
        map.serialize_entry("pebbles", &self.pebbles)?;
        if self.happy_face {
            map.serialize_entry("face", &true)?;
        }
        map.end()
    }
}

struct CardVisitor;
impl<'de> Visitor<'de> for CardVisitor {
    type Value = Card;
    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a map with a \"pebbles\" array and an optional \"face\" bool")
    }
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Card, A::Error> {
        let mut pebbles: Option<PebbleCollection> = None;
        let mut happy_face = false;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "pebbles" => pebbles = Some(map.next_value()?),
                "face" => happy_face = map.next_value()?,
                _ => {
                    let _: de::IgnoredAny = map.next_value()?;
                }
            }
        }
        let pebbles = pebbles.ok_or_else(|| de::Error::missing_field("pebbles"))?;
        if pebbles.total() != PEBBLE_COUNT {
            return Err(de::Error::custom(crate::error::DeserializeError::InvalidCardSize {
                size: pebbles.total(),
            }));
        }
        Ok(Card { pebbles, happy_face })
    }
}

impl<'de> serde::Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CardVisitor)
    }
}

/// The fixed pool of cards for a game: a visible row plus a face-down deck.
/// Persisted as a bare JSON array, not a wrapper object.
#[derive(Clone, Debug, Default)]
pub struct Deck {
    pub cards: Vec<Card>,
}

impl Serialize for Deck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.cards.serialize(serializer)
    }
}

struct DeckVisitor;
impl<'de> Visitor<'de> for DeckVisitor {
    type Value = Deck;
    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an array of cards")
    }
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Deck, A::Error> {
        let mut cards = Vec::new();
        while let Some(card) = seq.next_element()? {
            cards.push(card);
        }
        Ok(Deck { cards })
    }
}

impl<'de> serde::Deserialize<'de> for Deck {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(DeckVisitor)
    }
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Deck { cards }
    }

    pub fn random(count: usize, rng: &mut impl Rng) -> Self {
        assert!(count <= MAX_CARDS_NUM);
        Deck {
            cards: (0..count).map(|_| Card::generate_random(rng)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards.iter().any(|c| c == card)
    }

    pub fn pop_card(&mut self, card: &Card) -> Option<Card> {
        let index = self.cards.iter().position(|c| c == card)?;
        Some(self.cards.remove(index))
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Every card in the deck the given wallet can currently afford.
    pub fn find_matching_cards(&self, wallet: &PebbleCollection) -> Vec<Card> {
        self.cards
            .iter()
            .copied()
            .filter(|card| wallet.contains(&card.pebbles))
            .collect()
    }

    pub fn sorted(&self) -> Vec<Card> {
        let mut cards = self.cards.clone();
        cards.sort();
        cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // Testing strategy:
    // - generated cards always cost exactly 5 pebbles
    // - reward table: 0/1/2/3-or-more remaining pebbles, with and without happy_face
    // - find_matching_cards: affordable, unaffordable, exact-match boundary

    #[test]
    fn generated_card_costs_five_pebbles() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let card = Card::generate_random(&mut rng);
            assert_eq!(card.pebbles.total(), PEBBLE_COUNT);
        }
    }

    #[test]
    fn reward_table_matches_known_values() {
        assert_eq!(reward(0, false), 5);
        assert_eq!(reward(0, true), 8);
        assert_eq!(reward(3, false), 1);
        assert_eq!(reward(3, true), 2);
    }

    #[test]
    fn cap_remaining_saturates_at_three() {
        assert_eq!(cap_remaining(0), 0);
        assert_eq!(cap_remaining(3), 3);
        assert_eq!(cap_remaining(50), 3);
    }

    #[test]
    fn json_omits_face_key_when_false() {
        let plain = Card::new(PebbleCollection::from_counts(&[(PebbleColor::Red, 5)]), false);
        let json = serde_json::to_string(&plain).unwrap();
        assert_eq!(json, r#"{"pebbles":["red","red","red","red","red"]}"#);
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plain);

        let happy = Card::new(PebbleCollection::from_counts(&[(PebbleColor::Red, 5)]), true);
        let json = serde_json::to_string(&happy).unwrap();
        assert_eq!(json, r#"{"pebbles":["red","red","red","red","red"],"face":true}"#);
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, happy);
    }

    #[test]
    fn find_matching_cards_filters_by_affordability() {
        let affordable = Card::new(PebbleCollection::from_counts(&[(PebbleColor::Red, 5)]), false);
        let unaffordable = Card::new(PebbleCollection::from_counts(&[(PebbleColor::Blue, 5)]), false);
        let deck = Deck::new(vec![affordable, unaffordable]);
        let wallet = PebbleCollection::from_counts(&[(PebbleColor::Red, 5)]);
        let matches = deck.find_matching_cards(&wallet);
        assert_eq!(matches, vec![affordable]);
    }
}
