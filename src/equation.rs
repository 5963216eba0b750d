use crate::pebble::{PebbleCollection, PebbleColor};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;

pub const MIN_EQUATION_SIZE: u32 = 1;
pub const MAX_EQUATION_SIZE: u32 = 4;
pub const MAX_EQUATION_NUM: usize = 10;

/// An undirected exchange between two nonempty, disjoint-color pebble
/// collections. `directed` marks whether a particular instance represents
/// a one-way `lhs -> rhs` trade (produced by `rulebook::tradable`) or the
/// symmetric relation as originally listed.
#[derive(Clone, Copy, Debug)]
pub struct Equation {
    pub lhs: PebbleCollection,
    pub rhs: PebbleCollection,
    pub directed: bool,
}

impl Equation {
    pub fn undirected(lhs: PebbleCollection, rhs: PebbleCollection) -> Self {
        Equation {
            lhs,
            rhs,
            directed: false,
        }
    }

    pub fn directed(lhs: PebbleCollection, rhs: PebbleCollection) -> Self {
        Equation {
            lhs,
            rhs,
            directed: true,
        }
    }

    /// The same equation traded the other way.
    pub fn reversed(&self) -> Self {
        Equation {
            lhs: self.rhs,
            rhs: self.lhs,
            directed: self.directed,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        let lhs_size = self.lhs.total();
        let rhs_size = self.rhs.total();
        let sizes_ok = (MIN_EQUATION_SIZE..=MAX_EQUATION_SIZE).contains(&lhs_size)
            && (MIN_EQUATION_SIZE..=MAX_EQUATION_SIZE).contains(&rhs_size);
        let disjoint = PebbleColor::all()
            .iter()
            .all(|&c| self.lhs[c] == 0 || self.rhs[c] == 0);
        sizes_ok && disjoint
    }

    pub fn generate_random(rng: &mut impl Rng) -> Self {
        loop {
            let lhs_size = rng.gen_range(MIN_EQUATION_SIZE..=MAX_EQUATION_SIZE);
            let rhs_size = rng.gen_range(MIN_EQUATION_SIZE..=MAX_EQUATION_SIZE);
            let mut colors = PebbleColor::all().to_vec();
            colors.shuffle(rng);
            let split = rng.gen_range(1..colors.len());
            let lhs_colors = &colors[..split];
            let rhs_colors = &colors[split..];
            if lhs_colors.is_empty() || rhs_colors.is_empty() {
                continue;
            }
            let lhs = random_collection(rng, lhs_colors, lhs_size);
            let rhs = random_collection(rng, rhs_colors, rhs_size);
            let eq = Equation::undirected(lhs, rhs);
            if eq.is_well_formed() {
                return eq;
            }
        }
    }
}

/// Persisted as `[lhs, rhs]` — two pebble-collection arrays. `directed` is
/// never part of the wire form; a deserialized equation is always
/// undirected, matching how equation sets are listed.
impl Serialize for Equation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.lhs)?;
        seq.serialize_element(&self.rhs)?;
        seq.end()
    }
}

struct EquationVisitor;
impl<'de> serde::de::Visitor<'de> for EquationVisitor {
    type Value = Equation;
    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "a two-element array of pebble collections")
    }
    fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<Equation, A::Error> {
        let lhs: PebbleCollection = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
        let rhs: PebbleCollection = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
        let equation = Equation::undirected(lhs, rhs);
        if !equation.is_well_formed() {
            let err = if lhs.total() == 0
                || rhs.total() == 0
                || lhs.total() > MAX_EQUATION_SIZE
                || rhs.total() > MAX_EQUATION_SIZE
            {
                crate::error::DeserializeError::InvalidEquationSize {
                    size: if (MIN_EQUATION_SIZE..=MAX_EQUATION_SIZE).contains(&lhs.total()) {
                        rhs.total()
                    } else {
                        lhs.total()
                    },
                }
            } else {
                crate::error::DeserializeError::NonDisjointEquation
            };
            return Err(serde::de::Error::custom(err));
        }
        Ok(equation)
    }
}

impl<'de> serde::Deserialize<'de> for Equation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(EquationVisitor)
    }
}

fn random_collection(rng: &mut impl Rng, colors: &[PebbleColor], size: u32) -> PebbleCollection {
    let mut collection = PebbleCollection::empty();
    for _ in 0..size {
        let color = *colors.choose(rng).expect("colors is nonempty");
        collection.add_pebble(color);
    }
    collection
}

/// Direction-agnostic equality: two equations are equal if their sides
/// match, or (when neither is directed) if one's sides are the other's
/// mirrored.
impl PartialEq for Equation {
    fn eq(&self, other: &Self) -> bool {
        let same_direction = self.lhs == other.lhs && self.rhs == other.rhs;
        if self.directed && other.directed {
            return same_direction;
        }
        same_direction || (self.lhs == other.rhs && self.rhs == other.lhs)
    }
}
impl Eq for Equation {}

/// Hash is mirror-invariant so that an equation and its reverse collide,
/// matching the reference's frozenset-based hash.
impl std::hash::Hash for Equation {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let (a, b) = if self.lhs <= self.rhs {
            (self.lhs, self.rhs)
        } else {
            (self.rhs, self.lhs)
        };
        a.hash(state);
        b.hash(state);
    }
}

impl PartialOrd for Equation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Equation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lhs.cmp(&other.lhs).then_with(|| self.rhs.cmp(&other.rhs))
    }
}

/// The fixed, randomly-generated set of equations available for a game,
/// capped at `MAX_EQUATION_NUM`.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct EquationSet {
    pub equations: Vec<Equation>,
}

impl EquationSet {
    pub fn new(equations: Vec<Equation>) -> Self {
        EquationSet { equations }
    }

    pub fn random(count: usize, rng: &mut impl Rng) -> Self {
        assert!(count <= MAX_EQUATION_NUM);
        let mut seen: Vec<Equation> = Vec::new();
        while seen.len() < count {
            let candidate = Equation::generate_random(rng);
            if !seen.contains(&candidate) {
                seen.push(candidate);
            }
        }
        EquationSet { equations: seen }
    }

    pub fn as_slice(&self) -> &[Equation] {
        &self.equations
    }

    pub fn contains(&self, equation: &Equation) -> bool {
        self.equations.iter().any(|e| e == equation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // Testing strategy:
    // - equality is mirror-invariant for undirected equations
    // - directed equations only match the exact direction
    // - hashing agrees with equality (mirror collides)
    // - random generation always yields well-formed, disjoint equations
    // - random set generation never yields duplicates up to mirroring

    #[test]
    fn undirected_equality_is_mirror_invariant() {
        let a = Equation::undirected(
            PebbleCollection::one(PebbleColor::Red),
            PebbleCollection::one(PebbleColor::Blue),
        );
        let b = Equation::undirected(
            PebbleCollection::one(PebbleColor::Blue),
            PebbleCollection::one(PebbleColor::Red),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn directed_equality_requires_same_direction() {
        let a = Equation::directed(
            PebbleCollection::one(PebbleColor::Red),
            PebbleCollection::one(PebbleColor::Blue),
        );
        let b = a.reversed();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_equations_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let eq = Equation::generate_random(&mut rng);
            assert!(eq.is_well_formed());
        }
    }

    #[test]
    fn random_set_has_no_duplicates() {
        let mut rng = StdRng::seed_from_u64(11);
        let set = EquationSet::random(MAX_EQUATION_NUM, &mut rng);
        for i in 0..set.equations.len() {
            for j in (i + 1)..set.equations.len() {
                assert_ne!(set.equations[i], set.equations[j]);
            }
        }
    }

    #[test]
    fn json_round_trips_and_drops_direction() {
        let eq = Equation::directed(
            PebbleCollection::one(PebbleColor::Red),
            PebbleCollection::one(PebbleColor::Blue),
        );
        let json = serde_json::to_string(&eq).unwrap();
        assert_eq!(json, r#"[["red"],["blue"]]"#);
        let back: Equation = serde_json::from_str(&json).unwrap();
        assert!(!back.directed);
        assert_eq!(back.lhs, eq.lhs);
        assert_eq!(back.rhs, eq.rhs);
    }

    #[test]
    fn json_rejects_non_disjoint_equation() {
        let json = r#"[["red"],["red"]]"#;
        assert!(serde_json::from_str::<Equation>(json).is_err());
    }
}
