use crate::error::DeserializeError;
use rand::seq::SliceRandom;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};

/// Canonical color order, used for both lexical comparison and draw order.
pub const COLOR_ORDER: [PebbleColor; 5] = [
    PebbleColor::Red,
    PebbleColor::White,
    PebbleColor::Blue,
    PebbleColor::Green,
    PebbleColor::Yellow,
];

#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash, PartialOrd, Ord)]
pub enum PebbleColor {
    Red,
    White,
    Blue,
    Green,
    Yellow,
}

impl PebbleColor {
    pub fn all() -> [PebbleColor; 5] {
        COLOR_ORDER
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PebbleColor::Red => "red",
            PebbleColor::White => "white",
            PebbleColor::Blue => "blue",
            PebbleColor::Green => "green",
            PebbleColor::Yellow => "yellow",
        }
    }

    pub fn from_str(value: &str) -> Result<PebbleColor, DeserializeError> {
        match value {
            "red" => Ok(PebbleColor::Red),
            "white" => Ok(PebbleColor::White),
            "blue" => Ok(PebbleColor::Blue),
            "green" => Ok(PebbleColor::Green),
            "yellow" => Ok(PebbleColor::Yellow),
            other => Err(DeserializeError::InvalidColor { value: other.to_string() }),
        }
    }
}

/// Persisted as the lowercase color string.
impl Serialize for PebbleColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct PebbleColorVisitor;
impl<'de> Visitor<'de> for PebbleColorVisitor {
    type Value = PebbleColor;
    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "one of \"red\", \"white\", \"blue\", \"green\", \"yellow\"")
    }
    fn visit_str<E: de::Error>(self, value: &str) -> Result<PebbleColor, E> {
        PebbleColor::from_str(value).map_err(de::Error::custom)
    }
}

impl<'de> serde::Deserialize<'de> for PebbleColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(PebbleColorVisitor)
    }
}

pub type Pebble = PebbleColor;

/// A multiset of pebbles, keyed by color. Subtraction never panics: if
/// `other` is not a subset of `self`, `self` is returned unchanged, matching
/// the reference rulebook's "unable to pay" behavior rather than Rust's
/// usual checked-arithmetic idiom.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash, Default)]
pub struct PebbleCollection {
    pub red: u32,
    pub white: u32,
    pub blue: u32,
    pub green: u32,
    pub yellow: u32,
}

impl PebbleCollection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn one(color: PebbleColor) -> Self {
        let mut p = Self::empty();
        p[color] = 1;
        p
    }

    pub fn from_counts(counts: &[(PebbleColor, u32)]) -> Self {
        let mut p = Self::empty();
        for &(color, count) in counts {
            p[color] += count;
        }
        p
    }

    pub fn total(&self) -> u32 {
        self.red + self.white + self.blue + self.green + self.yellow
    }

    pub fn distinct_colors(&self) -> usize {
        PebbleColor::all()
            .iter()
            .filter(|&&c| self[c] > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// True if every color count in `other` is at most the matching count here.
    pub fn contains(&self, other: &PebbleCollection) -> bool {
        PebbleColor::all().iter().all(|&c| self[c] >= other[c])
    }

    /// Non-throwing subtraction. Returns `self` unchanged if `other` is not
    /// a subset.
    pub fn checked_sub(&self, other: &PebbleCollection) -> PebbleCollection {
        if self.contains(other) {
            *self - *other
        } else {
            *self
        }
    }

    /// Removes and returns one pebble in canonical color order, or `None`
    /// if empty.
    pub fn draw(&mut self) -> Option<PebbleColor> {
        let color = PebbleColor::all().into_iter().find(|&c| self[c] > 0)?;
        self[color] -= 1;
        Some(color)
    }

    pub fn add_pebble(&mut self, color: PebbleColor) {
        self[color] += 1;
    }

    /// 100 pebbles, 20 of each color — the starting bank.
    pub fn starting_bank() -> Self {
        PebbleCollection::from_counts(&[
            (PebbleColor::Red, 20),
            (PebbleColor::White, 20),
            (PebbleColor::Blue, 20),
            (PebbleColor::Green, 20),
            (PebbleColor::Yellow, 20),
        ])
    }

    pub fn shuffled_list(&self, rng: &mut impl rand::Rng) -> Vec<PebbleColor> {
        let mut list = Vec::with_capacity(self.total() as usize);
        for &c in PebbleColor::all().iter() {
            for _ in 0..self[c] {
                list.push(c);
            }
        }
        list.shuffle(rng);
        list
    }
}

impl Index<PebbleColor> for PebbleCollection {
    type Output = u32;
    fn index(&self, color: PebbleColor) -> &u32 {
        match color {
            PebbleColor::Red => &self.red,
            PebbleColor::White => &self.white,
            PebbleColor::Blue => &self.blue,
            PebbleColor::Green => &self.green,
            PebbleColor::Yellow => &self.yellow,
        }
    }
}

impl IndexMut<PebbleColor> for PebbleCollection {
    fn index_mut(&mut self, color: PebbleColor) -> &mut u32 {
        match color {
            PebbleColor::Red => &mut self.red,
            PebbleColor::White => &mut self.white,
            PebbleColor::Blue => &mut self.blue,
            PebbleColor::Green => &mut self.green,
            PebbleColor::Yellow => &mut self.yellow,
        }
    }
}

impl Add for PebbleCollection {
    type Output = PebbleCollection;
    fn add(self, other: PebbleCollection) -> PebbleCollection {
        PebbleCollection {
            red: self.red + other.red,
            white: self.white + other.white,
            blue: self.blue + other.blue,
            green: self.green + other.green,
            yellow: self.yellow + other.yellow,
        }
    }
}

impl AddAssign for PebbleCollection {
    fn add_assign(&mut self, other: PebbleCollection) {
        *self = *self + other;
    }
}

/// Unchecked subtraction: underflows panic in debug builds, same as plain
/// `u32` arithmetic. Callers that might subtract more than is present should
/// use `checked_sub` instead; this impl exists for the common case where the
/// caller has already verified `contains`.
impl Sub for PebbleCollection {
    type Output = PebbleCollection;
    fn sub(self, other: PebbleCollection) -> PebbleCollection {
        PebbleCollection {
            red: self.red - other.red,
            white: self.white - other.white,
            blue: self.blue - other.blue,
            green: self.green - other.green,
            yellow: self.yellow - other.yellow,
        }
    }
}

impl SubAssign for PebbleCollection {
    fn sub_assign(&mut self, other: PebbleCollection) {
        *self = *self - other;
    }
}

impl PebbleCollection {
    /// Every pebble's color string, one entry per pebble, sorted
    /// alphabetically (`"b" < "g" < "r" < "w" < "y"`). Matches the
    /// reference's `__list_str__`, which backs its `__lt__`.
    fn sorted_labels(&self) -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = PebbleColor::all()
            .iter()
            .flat_map(|&c| std::iter::repeat(c.as_str()).take(self[c] as usize))
            .collect();
        labels.sort_unstable();
        labels
    }
}

/// Length first, then lexicographic on sorted color strings — matching the
/// reference implementation's `__lt__` (alphabetical, not canonical, color
/// order: blue < green < red < white < yellow).
impl PartialOrd for PebbleCollection {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PebbleCollection {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total()
            .cmp(&other.total())
            .then_with(|| self.sorted_labels().cmp(&other.sorted_labels()))
    }
}

/// Persisted as a flat JSON array of color strings, one per pebble, in
/// canonical order.
impl Serialize for PebbleCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.total() as usize))?;
        for &color in PebbleColor::all().iter() {
            for _ in 0..self[color] {
                seq.serialize_element(&color)?;
            }
        }
        seq.end()
    }
}

struct PebbleCollectionVisitor;
impl<'de> Visitor<'de> for PebbleCollectionVisitor {
    type Value = PebbleCollection;
    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an array of pebble color strings")
    }
    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<PebbleCollection, A::Error> {
        let mut collection = PebbleCollection::empty();
        while let Some(color) = seq.next_element::<PebbleColor>()? {
            collection.add_pebble(color);
        }
        Ok(collection)
    }
}

impl<'de> serde::Deserialize<'de> for PebbleCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(PebbleCollectionVisitor)
    }
}
