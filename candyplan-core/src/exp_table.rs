//! Experience required per level on each growth track.
//!
//! Only the normal track is read from the data resource. Accelerated tracks
//! are derived from the running normal total: the cumulative value is scaled
//! and rounded, and each level's requirement is the difference between two
//! consecutive rounded totals. Rounding the running total rather than each
//! step keeps the sum over any span equal to the rounded totals at its ends.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    FIRST_STEP_LEVEL, LV_MAX, LV_MIN, TRACK_MULT_LEGENDARY, TRACK_MULT_NORMAL,
    TRACK_MULT_PSEUDO_LEGENDARY, TRACK_MULT_SEMI_LEGENDARY,
};
use crate::error::{CalcError, ConfigError, TableParseError};
use crate::numbers::{round_f64_to_u64, u64_to_f64};
use crate::table_text::LevelColumn;

/// Experience multiplier class of a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Track {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "600")]
    PseudoLegendary,
    #[serde(rename = "semi")]
    SemiLegendary,
    #[serde(rename = "legend")]
    Legendary,
}

impl Track {
    pub const ALL: [Self; 4] = [
        Self::Normal,
        Self::PseudoLegendary,
        Self::SemiLegendary,
        Self::Legendary,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::PseudoLegendary => "600",
            Self::SemiLegendary => "semi",
            Self::Legendary => "legend",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::PseudoLegendary => 1,
            Self::SemiLegendary => 2,
            Self::Legendary => 3,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "600" | "pseudo" => Ok(Self::PseudoLegendary),
            "semi" => Ok(Self::SemiLegendary),
            "legend" | "legendary" => Ok(Self::Legendary),
            _ => Err(()),
        }
    }
}

/// Per-track multipliers relative to the normal curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackMultipliers {
    #[serde(default = "TrackMultipliers::default_normal")]
    pub normal: f64,
    #[serde(default = "TrackMultipliers::default_pseudo_legendary", rename = "600")]
    pub pseudo_legendary: f64,
    #[serde(default = "TrackMultipliers::default_semi_legendary", rename = "semi")]
    pub semi_legendary: f64,
    #[serde(default = "TrackMultipliers::default_legendary", rename = "legend")]
    pub legendary: f64,
}

impl TrackMultipliers {
    const fn default_normal() -> f64 {
        TRACK_MULT_NORMAL
    }

    const fn default_pseudo_legendary() -> f64 {
        TRACK_MULT_PSEUDO_LEGENDARY
    }

    const fn default_semi_legendary() -> f64 {
        TRACK_MULT_SEMI_LEGENDARY
    }

    const fn default_legendary() -> f64 {
        TRACK_MULT_LEGENDARY
    }

    #[must_use]
    pub const fn get(&self, track: Track) -> f64 {
        match track {
            Track::Normal => self.normal,
            Track::PseudoLegendary => self.pseudo_legendary,
            Track::SemiLegendary => self.semi_legendary,
            Track::Legendary => self.legendary,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the normal multiplier is not 1.0 or any other
    /// multiplier is below 1.0 or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.normal - TRACK_MULT_NORMAL).abs() > f64::EPSILON {
            return Err(ConfigError::NormalMultiplier { value: self.normal });
        }
        for track in Track::ALL {
            let value = self.get(track);
            if !value.is_finite() || value < 1.0 {
                return Err(ConfigError::MultiplierBelowOne { track, value });
            }
        }
        Ok(())
    }
}

impl Default for TrackMultipliers {
    fn default() -> Self {
        Self {
            normal: Self::default_normal(),
            pseudo_legendary: Self::default_pseudo_legendary(),
            semi_legendary: Self::default_semi_legendary(),
            legendary: Self::default_legendary(),
        }
    }
}

/// Requirement lookups for every track, built once from the normal column.
///
/// Arrays are indexed by level. `None` marks a level whose row (or an
/// earlier row its cumulative total depends on) is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRequirementTable {
    steps: [Vec<Option<u64>>; 4],
    cumulative: [Vec<Option<u64>>; 4],
    /// Lowest level with no source row; every total from here up is unknown.
    first_gap: Option<u32>,
}

impl LevelRequirementTable {
    /// Build the normal arrays and derive the accelerated tracks.
    ///
    /// Building is a pure function of its inputs; calling it again with the
    /// same column yields an identical table.
    ///
    /// # Errors
    ///
    /// Returns [`TableParseError::ValueOutOfRange`] if the running total
    /// overflows.
    pub fn build(
        normal: &LevelColumn,
        multipliers: TrackMultipliers,
    ) -> Result<Self, TableParseError> {
        let len = usize_level(LV_MAX) + 1;
        let mut normal_steps = vec![None; len];
        let mut normal_cumulative = vec![None; len];
        normal_cumulative[usize_level(LV_MIN)] = Some(0_u64);

        let mut running = Some(0_u64);
        for level in FIRST_STEP_LEVEL..=LV_MAX {
            let step = normal.get(level);
            normal_steps[usize_level(level)] = step;
            running = match (running, step) {
                (Some(total), Some(value)) => Some(total.checked_add(value).ok_or(
                    TableParseError::ValueOutOfRange {
                        table: "exp",
                        level,
                        value,
                    },
                )?),
                _ => None,
            };
            normal_cumulative[usize_level(level)] = running;
        }

        let missing: Vec<u32> = (FIRST_STEP_LEVEL..=LV_MAX)
            .filter(|lv| normal.get(*lv).is_none())
            .collect();
        if !missing.is_empty() {
            log::warn!("experience table is missing levels {missing:?}");
        }

        let mut steps: [Vec<Option<u64>>; 4] = Default::default();
        let mut cumulative: [Vec<Option<u64>>; 4] = Default::default();
        for track in Track::ALL {
            let (track_steps, track_cumulative) = if track == Track::Normal {
                (normal_steps.clone(), normal_cumulative.clone())
            } else {
                derive_track(&normal_cumulative, multipliers.get(track))
            };
            steps[track.index()] = track_steps;
            cumulative[track.index()] = track_cumulative;
        }

        log::debug!(
            "built requirement tables: {} normal rows, total to Lv{LV_MAX} = {:?}",
            normal.len(),
            normal_cumulative[usize_level(LV_MAX)]
        );

        Ok(Self {
            steps,
            cumulative,
            first_gap: missing.first().copied(),
        })
    }

    fn missing(&self, level: u32, track: Track) -> CalcError {
        let level = self.first_gap.filter(|gap| *gap <= level).unwrap_or(level);
        CalcError::DataIntegrity { level, track }
    }

    /// Experience needed for the step that ends at `level`.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::DataIntegrity`] if `level` is outside 2..=65 or
    /// its row is unavailable. A derived value missing because of an earlier
    /// gap names the gap.
    pub fn requirement(&self, level: u32, track: Track) -> Result<u64, CalcError> {
        if !(FIRST_STEP_LEVEL..=LV_MAX).contains(&level) {
            return Err(CalcError::DataIntegrity { level, track });
        }
        self.steps[track.index()][usize_level(level)]
            .ok_or_else(|| self.missing(level, track))
    }

    /// Rounded running total from level 1 up to `level`.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::DataIntegrity`] if `level` is outside 1..=65 or
    /// any row up to it is unavailable.
    pub fn cumulative(&self, level: u32, track: Track) -> Result<u64, CalcError> {
        if !(LV_MIN..=LV_MAX).contains(&level) {
            return Err(CalcError::DataIntegrity { level, track });
        }
        self.cumulative[track.index()][usize_level(level)]
            .ok_or_else(|| self.missing(level, track))
    }

    /// Total experience to go from `now` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::DataIntegrity`] if either bound is unavailable.
    pub fn total_requirement(&self, now: u32, target: u32, track: Track) -> Result<u64, CalcError> {
        let end = self.cumulative(target, track)?;
        let start = self.cumulative(now, track)?;
        Ok(end.saturating_sub(start))
    }

    /// Check the span `(now, target]` can be planned on `track`.
    ///
    /// Totals for the span depend on every row from level 2 up to `target`,
    /// so a gap below `now` fails too.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::DataIntegrity`] for the lowest missing level.
    pub fn ensure_span(&self, now: u32, target: u32, track: Track) -> Result<(), CalcError> {
        if let Some(level) = self.first_gap.filter(|gap| *gap <= target) {
            return Err(CalcError::DataIntegrity { level, track });
        }
        for level in now + 1..=target {
            self.requirement(level, track)?;
        }
        Ok(())
    }
}

fn derive_track(
    normal_cumulative: &[Option<u64>],
    multiplier: f64,
) -> (Vec<Option<u64>>, Vec<Option<u64>>) {
    let cumulative: Vec<Option<u64>> = normal_cumulative
        .iter()
        .map(|total| total.map(|t| round_f64_to_u64(u64_to_f64(t) * multiplier)))
        .collect();
    let mut steps = vec![None; cumulative.len()];
    for level in FIRST_STEP_LEVEL..=LV_MAX {
        let idx = usize_level(level);
        steps[idx] = cumulative[idx]
            .zip(cumulative[idx - 1])
            .map(|(here, prev)| here.saturating_sub(prev));
    }
    (steps, cumulative)
}

const fn usize_level(level: u32) -> usize {
    level as usize
}
