//! Camelot wheel: the 24-key harmonic space used for DJ-style mixing
//!
//! A key is a position on a 12-spoke wheel plus a ring: the inner ring holds
//! the minor keys ('A' in Camelot notation), the outer ring the relative
//! majors ('B'). Adjacent positions are a perfect fifth apart, so neighbors
//! on the wheel are harmonically compatible.
//!
//! ```text
//!      5A      5B
//!    /    \  /    \
//!  4A      4B      6B
//!  |       |       |
//!  3A      3B      7B
//!    \    /  \    /
//!      2A      8B
//!       ...
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which ring of the wheel a key sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    /// Inner ring: minor keys ('A' suffix)
    Inner,
    /// Outer ring: major keys ('B' suffix)
    Outer,
}

impl KeyMode {
    fn suffix(self) -> char {
        match self {
            KeyMode::Inner => 'A',
            KeyMode::Outer => 'B',
        }
    }

    /// The other ring at the same position (relative major/minor)
    pub fn opposite(self) -> Self {
        match self {
            KeyMode::Inner => KeyMode::Outer,
            KeyMode::Outer => KeyMode::Inner,
        }
    }
}

/// A key on the Camelot wheel: position 0..=11 plus ring
///
/// Serialized as Camelot notation ("8B") so library files and analysis
/// manifests stay human-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CamelotKey {
    position: u8,
    mode: KeyMode,
}

impl From<CamelotKey> for String {
    fn from(key: CamelotKey) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for CamelotKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Maximum possible wheel distance: opposite spoke (6) across rings (+1)
pub const MAX_KEY_DISTANCE: u8 = 7;

impl CamelotKey {
    /// Create a key, wrapping the position onto the wheel
    pub fn new(position: u8, mode: KeyMode) -> Self {
        Self {
            position: position % 12,
            mode,
        }
    }

    pub fn position(self) -> u8 {
        self.position
    }

    pub fn mode(self) -> KeyMode {
        self.mode
    }

    /// Wheel number in Camelot notation (1-12)
    pub fn wheel_number(self) -> u8 {
        self.position + 1
    }

    /// Harmonic distance between two keys
    ///
    /// Pure, total, symmetric, always in 0..=7:
    /// - same key: 0
    /// - relative major/minor (same position, other ring): 1
    /// - adjacent position, same ring: 1
    /// - adjacent position, other ring: 2
    /// - general: circular position distance, plus 1 when the rings differ
    pub fn distance(self, other: CamelotKey) -> u8 {
        if self == other {
            return 0;
        }

        let delta = self.position.abs_diff(other.position);
        let wheel_dist = delta.min(12 - delta);

        if self.position == other.position {
            // Rings differ (equal keys returned above)
            return 1;
        }

        if self.mode == other.mode {
            wheel_dist
        } else {
            wheel_dist + 1
        }
    }

    /// Keys safe to mix with this one (the harmonic pre-filter)
    ///
    /// Same key, one step either way on the same ring, and the relative
    /// major/minor across the rings.
    pub fn compatible_keys(self) -> [CamelotKey; 4] {
        [
            self,
            CamelotKey::new((self.position + 1) % 12, self.mode),
            CamelotKey::new((self.position + 11) % 12, self.mode),
            CamelotKey::new(self.position, self.mode.opposite()),
        ]
    }
}

impl fmt::Display for CamelotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.wheel_number(), self.mode.suffix())
    }
}

impl FromStr for CamelotKey {
    type Err = String;

    /// Parse Camelot notation ("1A".."12B", case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() < 2 {
            return Err(format!("invalid Camelot key: '{s}'"));
        }

        let (num_str, suffix) = s.split_at(s.len() - 1);
        let number: u8 = num_str
            .parse()
            .map_err(|_| format!("invalid Camelot key: '{s}'"))?;
        if !(1..=12).contains(&number) {
            return Err(format!("Camelot wheel number out of range: '{s}'"));
        }

        let mode = match suffix.chars().next() {
            Some('A') | Some('a') => KeyMode::Inner,
            Some('B') | Some('b') => KeyMode::Outer,
            _ => return Err(format!("invalid Camelot ring suffix: '{s}'")),
        };

        Ok(CamelotKey::new(number - 1, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> CamelotKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_notation_round_trip() {
        let mut seen = std::collections::HashSet::new();
        for position in 0..12 {
            for mode in [KeyMode::Inner, KeyMode::Outer] {
                let k = CamelotKey::new(position, mode);
                let code = k.to_string();
                assert_eq!(code.parse::<CamelotKey>().unwrap(), k);
                assert!(seen.insert(code.clone()), "duplicate code: {}", code);
            }
        }
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn test_distance_identity_and_symmetry() {
        for position in 0..12 {
            for mode in [KeyMode::Inner, KeyMode::Outer] {
                let a = CamelotKey::new(position, mode);
                assert_eq!(a.distance(a), 0);
                for p2 in 0..12 {
                    for m2 in [KeyMode::Inner, KeyMode::Outer] {
                        let b = CamelotKey::new(p2, m2);
                        assert_eq!(a.distance(b), b.distance(a));
                        assert!(a.distance(b) <= MAX_KEY_DISTANCE);
                    }
                }
            }
        }
    }

    #[test]
    fn test_distance_cases() {
        // Relative major/minor
        assert_eq!(key("8A").distance(key("8B")), 1);
        // Adjacent, same ring
        assert_eq!(key("8A").distance(key("9A")), 1);
        assert_eq!(key("8A").distance(key("7A")), 1);
        // Adjacent, other ring
        assert_eq!(key("8A").distance(key("9B")), 2);
        // Wrap-around
        assert_eq!(key("12B").distance(key("1B")), 1);
        assert_eq!(key("1A").distance(key("12A")), 1);
        // Opposite spoke, same ring
        assert_eq!(key("1A").distance(key("7A")), 6);
        // Opposite spoke, other ring: the maximum
        assert_eq!(key("1A").distance(key("7B")), 7);
    }

    #[test]
    fn test_compatible_keys() {
        let compatible = key("8A").compatible_keys();
        assert!(compatible.contains(&key("8A")));
        assert!(compatible.contains(&key("9A")));
        assert!(compatible.contains(&key("7A")));
        assert!(compatible.contains(&key("8B")));
    }

    #[test]
    fn test_compatible_keys_wrap() {
        let compatible = key("12A").compatible_keys();
        assert!(compatible.contains(&key("1A")));
        assert!(compatible.contains(&key("11A")));

        let compatible = key("1B").compatible_keys();
        assert!(compatible.contains(&key("12B")));
        assert!(compatible.contains(&key("2B")));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<CamelotKey>().is_err());
        assert!("0A".parse::<CamelotKey>().is_err());
        assert!("13B".parse::<CamelotKey>().is_err());
        assert!("8C".parse::<CamelotKey>().is_err());
    }
}
