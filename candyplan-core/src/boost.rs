//! Candy boost selection.
//!
//! A boost doubles candy experience and multiplies the shard cost of the
//! candies it covers. Only one kind may be active per request.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DEFAULT_BOOST_COUNT, FULL_BOOST_SHARD_MULTIPLIER, MINI_BOOST_SHARD_MULTIPLIER};
use crate::error::{CalcError, ConfigError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoostKind {
    #[default]
    None,
    Mini,
    Full,
}

impl BoostKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mini => "mini",
            Self::Full => "full",
        }
    }

    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for BoostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shard cost multipliers applied to boosted candies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostShardMultipliers {
    #[serde(default = "BoostShardMultipliers::default_mini")]
    pub mini: u64,
    #[serde(default = "BoostShardMultipliers::default_full")]
    pub full: u64,
}

impl BoostShardMultipliers {
    const fn default_mini() -> u64 {
        MINI_BOOST_SHARD_MULTIPLIER
    }

    const fn default_full() -> u64 {
        FULL_BOOST_SHARD_MULTIPLIER
    }

    /// Multiplier for a candy of the given kind; 1 when no boost is active.
    #[must_use]
    pub const fn get(&self, kind: BoostKind) -> u64 {
        match kind {
            BoostKind::None => 1,
            BoostKind::Mini => self.mini,
            BoostKind::Full => self.full,
        }
    }

    /// # Errors
    ///
    /// Returns an error if either multiplier is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mini == 0 || self.full == 0 {
            return Err(ConfigError::ZeroBoostMultiplier);
        }
        Ok(())
    }
}

impl Default for BoostShardMultipliers {
    fn default() -> Self {
        Self {
            mini: Self::default_mini(),
            full: Self::default_full(),
        }
    }
}

/// The single active boost and how many candies it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostSelection {
    pub kind: BoostKind,
    pub count: u32,
}

impl BoostSelection {
    pub const NONE: Self = Self {
        kind: BoostKind::None,
        count: 0,
    };

    #[must_use]
    pub const fn new(kind: BoostKind, count: u32) -> Self {
        Self { kind, count }
    }

    /// Build a selection from the separate full-boost and mini-boost counts.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::ConflictingBoost`] if both counts are positive.
    pub fn resolve(full: u32, mini: u32) -> Result<Self, CalcError> {
        match (full, mini) {
            (0, 0) => Ok(Self::NONE),
            (full, 0) => Ok(Self::new(BoostKind::Full, full)),
            (0, mini) => Ok(Self::new(BoostKind::Mini, mini)),
            (full, mini) => Err(CalcError::ConflictingBoost { full, mini }),
        }
    }

    /// Candies the boost can still cover; zero when no kind is selected.
    #[must_use]
    pub const fn effective_count(&self) -> u32 {
        if self.kind.is_active() { self.count } else { 0 }
    }
}

impl Default for BoostSelection {
    fn default() -> Self {
        Self::new(BoostKind::None, DEFAULT_BOOST_COUNT)
    }
}

/// Raw boost fields as the caller received them; `None` means untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BoostInput {
    #[serde(default)]
    pub full: Option<u32>,
    #[serde(default)]
    pub mini: Option<u32>,
}

impl BoostInput {
    #[must_use]
    pub const fn full(count: u32) -> Self {
        Self {
            full: Some(count),
            mini: None,
        }
    }

    #[must_use]
    pub const fn mini(count: u32) -> Self {
        Self {
            full: None,
            mini: Some(count),
        }
    }

    /// Resolve the fields, filling untouched ones.
    ///
    /// An untouched full-boost field takes `default_count` only while the
    /// mini-boost field is also untouched; an untouched mini field is 0.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::ConflictingBoost`] if both end up positive.
    pub fn resolve(&self, default_count: u32) -> Result<BoostSelection, CalcError> {
        let full = match (self.full, self.mini) {
            (Some(full), _) => full,
            (None, None) => default_count,
            (None, Some(_)) => 0,
        };
        BoostSelection::resolve(full, self.mini.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_picks_the_positive_count() {
        assert_eq!(BoostSelection::resolve(0, 0), Ok(BoostSelection::NONE));
        assert_eq!(
            BoostSelection::resolve(12, 0),
            Ok(BoostSelection::new(BoostKind::Full, 12))
        );
        assert_eq!(
            BoostSelection::resolve(0, 7),
            Ok(BoostSelection::new(BoostKind::Mini, 7))
        );
    }

    #[test]
    fn both_boosts_conflict() {
        assert_eq!(
            BoostSelection::resolve(3, 4),
            Err(CalcError::ConflictingBoost { full: 3, mini: 4 })
        );
    }

    #[test]
    fn default_selection_is_explicitly_empty() {
        let selection = BoostSelection::default();
        assert_eq!(selection.kind, BoostKind::None);
        assert_eq!(selection.effective_count(), 0);
        assert_eq!(BoostSelection::new(BoostKind::None, 50).effective_count(), 0);
    }

    #[test]
    fn untouched_fields_use_the_explicit_default() {
        assert_eq!(BoostInput::default().resolve(0), Ok(BoostSelection::NONE));
        assert_eq!(
            BoostInput::default().resolve(999),
            Ok(BoostSelection::new(BoostKind::Full, 999))
        );
        assert_eq!(
            BoostInput::mini(6).resolve(999),
            Ok(BoostSelection::new(BoostKind::Mini, 6))
        );
        assert_eq!(
            BoostInput::full(0).resolve(999),
            Ok(BoostSelection::NONE)
        );
        assert!(matches!(
            BoostInput {
                full: Some(2),
                mini: Some(2)
            }
            .resolve(0),
            Err(CalcError::ConflictingBoost { .. })
        ));
    }

    #[test]
    fn shard_multipliers_follow_kind() {
        let mults = BoostShardMultipliers::default();
        assert_eq!(mults.get(BoostKind::None), 1);
        assert_eq!(mults.get(BoostKind::Mini), 4);
        assert_eq!(mults.get(BoostKind::Full), 5);
        assert!(mults.validate().is_ok());
        assert!(BoostShardMultipliers { mini: 0, full: 5 }.validate().is_err());
    }
}
