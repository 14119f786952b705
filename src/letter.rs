use serde::{Deserialize, Serialize};
use std::fmt;

/// The highest tier a letter can have.
pub const MAX_TIER: u8 = 6;

/// Every glyph in the game together with its tier.
///
/// Common letters sit in the low tiers, rare ones in the high tiers.
pub const ALPHABET: [(char, u8); 26] = [
    ('e', 1),
    ('t', 1),
    ('a', 1),
    ('i', 1),
    ('o', 1),
    ('n', 1),
    ('s', 2),
    ('h', 2),
    ('r', 2),
    ('d', 2),
    ('l', 3),
    ('c', 3),
    ('u', 3),
    ('m', 3),
    ('w', 4),
    ('f', 4),
    ('g', 4),
    ('y', 4),
    ('p', 5),
    ('b', 5),
    ('v', 5),
    ('k', 5),
    ('j', 6),
    ('x', 6),
    ('q', 6),
    ('z', 6),
];

/// Looks up the tier of a glyph, `None` if it is not part of the alphabet.
pub fn tier_of(name: char) -> Option<u8> {
    ALPHABET
        .iter()
        .find(|(glyph, _)| *glyph == name)
        .map(|(_, tier)| *tier)
}

/// Score contributed by a letter of the given tier.
pub const fn value_for_tier(tier: u8) -> u32 {
    (tier as u32) * (tier as u32)
}

/// Unique identity of a letter tile within one game.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LetterId(pub u64);

impl fmt::Display for LetterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The container a letter currently sits in. Records location, never ownership.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterOrigin {
    Pool,
    Rack,
    Battle,
}

/// A single letter tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Letter {
    pub id: LetterId,
    pub name: char,
    pub tier: u8,
    pub value: u32,
    /// Frozen pool letters survive the next pool refresh in their slot.
    pub frozen: bool,
    pub origin: LetterOrigin,
}

impl Letter {
    /// Creates an unfrozen letter. The value is derived from the tier.
    pub fn new(id: LetterId, name: char, tier: u8, origin: LetterOrigin) -> Self {
        Self {
            id,
            name,
            tier,
            value: value_for_tier(tier),
            frozen: false,
            origin,
        }
    }

    /// Creates a letter for an alphabet glyph, `None` for unknown glyphs.
    pub fn from_glyph(id: LetterId, name: char, origin: LetterOrigin) -> Option<Self> {
        tier_of(name).map(|tier| Self::new(id, name, tier, origin))
    }

    /// Returns a copy with the frozen flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            frozen: !self.frozen,
            ..self.clone()
        }
    }

    /// Returns a copy tagged with a different container.
    pub fn with_origin(&self, origin: LetterOrigin) -> Self {
        Self {
            origin,
            ..self.clone()
        }
    }
}

/// Hands out fresh letter identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LetterIds {
    next: u64,
}

impl LetterIds {
    pub fn next_id(&mut self) -> LetterId {
        let id = LetterId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_tier_squared() {
        for (glyph, tier) in ALPHABET {
            let letter = Letter::from_glyph(LetterId(0), glyph, LetterOrigin::Pool).unwrap();
            assert_eq!(letter.value, (tier as u32).pow(2));
        }
    }

    #[test]
    fn unknown_glyph_has_no_tier() {
        assert_eq!(tier_of('z'), Some(6));
        assert_eq!(tier_of('?'), None);
        assert!(Letter::from_glyph(LetterId(0), '?', LetterOrigin::Pool).is_none());
    }

    #[test]
    fn toggled_only_flips_frozen() {
        // arrange
        let letter = Letter::new(LetterId(7), 'q', 6, LetterOrigin::Pool);

        // act
        let frozen = letter.toggled();

        // assert
        assert!(frozen.frozen);
        assert_eq!(frozen.toggled(), letter);
    }

    #[test]
    fn ids_are_unique() {
        let mut ids = LetterIds::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
    }
}
