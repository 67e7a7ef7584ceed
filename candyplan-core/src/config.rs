//! Calculator tuning loaded from JSON or taken from the built-in defaults.

use serde::{Deserialize, Serialize};

use crate::boost::BoostShardMultipliers;
use crate::constants::{BOOST_EXP_MULTIPLIER, DEFAULT_BOOST_COUNT};
use crate::error::ConfigError;
use crate::exp_table::TrackMultipliers;
use crate::passive::PassiveIncomeCalculator;
use crate::yield_policy::{CandyYieldPolicy, YieldBands};

/// Every tunable number the planner uses.
///
/// Missing JSON fields fall back to the in-game values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalcConfig {
    #[serde(default)]
    pub track_multipliers: TrackMultipliers,
    #[serde(default)]
    pub yield_bands: YieldBands,
    /// Apply the older extra x0.82 / x1.18 nature factor on top of the band
    /// yields. The band yields already encode nature, so this is off.
    #[serde(default)]
    pub legacy_nature_factor: bool,
    #[serde(default = "CalcConfig::default_boost_exp_multiplier")]
    pub boost_exp_multiplier: u64,
    #[serde(default)]
    pub boost_shard_multipliers: BoostShardMultipliers,
    #[serde(default)]
    pub passive: PassiveIncomeCalculator,
    /// Boost count used when the caller leaves the boost field untouched.
    #[serde(default = "CalcConfig::default_boost_count")]
    pub default_boost_count: u32,
}

impl CalcConfig {
    const fn default_boost_exp_multiplier() -> u64 {
        BOOST_EXP_MULTIPLIER
    }

    const fn default_boost_count() -> u32 {
        DEFAULT_BOOST_COUNT
    }

    /// Parse and validate a JSON override.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value breaks an invariant.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Json(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.track_multipliers.validate()?;
        self.yield_bands.validate()?;
        if self.boost_exp_multiplier == 0 {
            return Err(ConfigError::ZeroBoostMultiplier);
        }
        self.boost_shard_multipliers.validate()
    }

    #[must_use]
    pub const fn yield_policy(&self) -> CandyYieldPolicy {
        CandyYieldPolicy::new(
            self.yield_bands,
            self.legacy_nature_factor,
            self.boost_exp_multiplier,
        )
    }
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            track_multipliers: TrackMultipliers::default(),
            yield_bands: YieldBands::default(),
            legacy_nature_factor: false,
            boost_exp_multiplier: Self::default_boost_exp_multiplier(),
            boost_shard_multipliers: BoostShardMultipliers::default(),
            passive: PassiveIncomeCalculator::default(),
            default_boost_count: Self::default_boost_count(),
        }
    }
}
