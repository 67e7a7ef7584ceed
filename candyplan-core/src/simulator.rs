//! Level-by-level candy simulation.
//!
//! Levels are walked upward one step at a time. Banked experience covers a
//! step first; otherwise candies are spent one by one until it is covered,
//! and any overshoot carries into the next step. Boosted candies are spent
//! first, on the lowest levels, until the boost count runs out.

use serde::{Deserialize, Serialize};

use crate::boost::{BoostKind, BoostSelection, BoostShardMultipliers};
use crate::constants::{DEBUG_ENV_VAR, LV_MAX, LV_MIN};
use crate::error::CalcError;
use crate::exp_table::{LevelRequirementTable, Track};
use crate::shard_table::ShardCostTable;
use crate::yield_policy::{CandyYieldPolicy, Nature};

#[cfg(debug_assertions)]
fn debug_log_enabled() -> bool {
    matches!(std::env::var(DEBUG_ENV_VAR), Ok(val) if val != "0")
}

#[cfg(not(debug_assertions))]
const fn debug_log_enabled() -> bool {
    false
}

/// One progression to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRequest {
    pub lv_now: u32,
    pub lv_target: u32,
    #[serde(default)]
    pub track: Track,
    #[serde(default)]
    pub nature: Nature,
    /// Experience already banked toward `lv_now + 1`.
    #[serde(default)]
    pub initial_progress: u64,
    /// Pre-capped passive experience added to the bank up front.
    #[serde(default)]
    pub passive_income: u64,
    #[serde(default)]
    pub boost: BoostSelection,
}

impl ProgressionRequest {
    #[must_use]
    pub fn new(lv_now: u32, lv_target: u32) -> Self {
        Self {
            lv_now,
            lv_target,
            track: Track::Normal,
            nature: Nature::Neutral,
            initial_progress: 0,
            passive_income: 0,
            boost: BoostSelection::NONE,
        }
    }

    #[must_use]
    pub const fn with_track(mut self, track: Track) -> Self {
        self.track = track;
        self
    }

    #[must_use]
    pub const fn with_nature(mut self, nature: Nature) -> Self {
        self.nature = nature;
        self
    }

    #[must_use]
    pub const fn with_progress(mut self, initial_progress: u64) -> Self {
        self.initial_progress = initial_progress;
        self
    }

    #[must_use]
    pub const fn with_passive(mut self, passive_income: u64) -> Self {
        self.passive_income = passive_income;
        self
    }

    #[must_use]
    pub const fn with_boost(mut self, kind: BoostKind, count: u32) -> Self {
        self.boost = BoostSelection::new(kind, count);
        self
    }
}

/// Candy and shard totals for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProgressionResult {
    pub candies_total: u64,
    pub shards_total: u64,
    /// Candies that received the boost.
    pub boosted_candies: u64,
}

/// What happened on a single level step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub to_level: u32,
    pub need: u64,
    /// Bank on entering the step.
    pub banked_in: u64,
    pub candies: u64,
    pub boosted: u64,
    pub shards: u64,
    /// Bank left over after the level-up.
    pub carry_out: u64,
}

/// Check the level bounds of a request.
///
/// # Errors
///
/// Returns [`CalcError::InvalidRange`] unless `1 <= now < target <= 65`.
pub fn validate_range(lv_now: u32, lv_target: u32) -> Result<(), CalcError> {
    if lv_now < LV_MIN || lv_target > LV_MAX || lv_target <= lv_now {
        return Err(CalcError::InvalidRange {
            now: lv_now,
            target: lv_target,
        });
    }
    Ok(())
}

/// Runs requests against a pair of loaded tables.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionSimulator<'a> {
    requirements: &'a LevelRequirementTable,
    shards: &'a ShardCostTable,
    yields: CandyYieldPolicy,
    boost_shards: BoostShardMultipliers,
}

impl<'a> ProgressionSimulator<'a> {
    #[must_use]
    pub const fn new(
        requirements: &'a LevelRequirementTable,
        shards: &'a ShardCostTable,
        yields: CandyYieldPolicy,
        boost_shards: BoostShardMultipliers,
    ) -> Self {
        Self {
            requirements,
            shards,
            yields,
            boost_shards,
        }
    }

    /// Simulate `request` and return its totals.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::InvalidRange`] for bad levels and
    /// [`CalcError::DataIntegrity`] if a requirement row in the span is missing.
    pub fn simulate(&self, request: &ProgressionRequest) -> Result<ProgressionResult, CalcError> {
        self.check(request)?;
        self.run(request, None)
    }

    /// Simulate `request`, also returning one record per level step.
    ///
    /// # Errors
    ///
    /// Same as [`Self::simulate`].
    pub fn simulate_detailed(
        &self,
        request: &ProgressionRequest,
    ) -> Result<(ProgressionResult, Vec<StepRecord>), CalcError> {
        self.check(request)?;
        let span = request.lv_target.saturating_sub(request.lv_now);
        let mut steps = Vec::with_capacity(usize::try_from(span).unwrap_or_default());
        let result = self.run(request, Some(&mut steps))?;
        Ok((result, steps))
    }

    fn check(&self, request: &ProgressionRequest) -> Result<(), CalcError> {
        validate_range(request.lv_now, request.lv_target)?;
        self.requirements
            .ensure_span(request.lv_now, request.lv_target, request.track)
    }

    /// Walk the levels of a request that already passed [`validate_range`]
    /// and [`LevelRequirementTable::ensure_span`].
    pub(crate) fn run(
        &self,
        request: &ProgressionRequest,
        mut steps: Option<&mut Vec<StepRecord>>,
    ) -> Result<ProgressionResult, CalcError> {
        let gaps = self.shards.gaps(request.lv_now, request.lv_target);
        if !gaps.is_empty() {
            log::warn!("shard table has no cost for levels {gaps:?}; counting them as free");
        }

        let boost_kind = request.boost.kind;
        let boosted_shard_mult = self.boost_shards.get(boost_kind);
        let mut boost_remaining = request.boost.effective_count();
        let mut banked = request
            .initial_progress
            .saturating_add(request.passive_income);
        let mut result = ProgressionResult::default();
        let mut level = request.lv_now;

        while level < request.lv_target {
            let target = level + 1;
            let need = self.requirements.requirement(target, request.track)?;
            let mut step = StepRecord {
                to_level: target,
                need,
                banked_in: banked,
                candies: 0,
                boosted: 0,
                shards: 0,
                carry_out: 0,
            };

            let shard_cost = self.shards.shard_cost(target);
            while banked < need {
                let use_boost = boost_remaining > 0;
                let gain = self.yields.candy_yield(level, request.nature, use_boost);
                let cost = if use_boost {
                    shard_cost.saturating_mul(boosted_shard_mult)
                } else {
                    shard_cost
                };

                step.candies += 1;
                step.shards = step.shards.saturating_add(cost);
                banked = banked.saturating_add(gain);
                if use_boost {
                    step.boosted += 1;
                    boost_remaining -= 1;
                }
                if debug_log_enabled() {
                    log::trace!(
                        "Lv{level}->Lv{target}: candy #{} +{gain} exp (boost {use_boost}), bank {banked}/{need}",
                        step.candies
                    );
                }
            }

            banked -= need;
            level = target;
            step.carry_out = banked;

            result.candies_total += step.candies;
            result.boosted_candies += step.boosted;
            result.shards_total = result.shards_total.saturating_add(step.shards);
            if let Some(records) = &mut steps {
                records.push(step);
            }
        }

        log::debug!(
            "Lv{}->Lv{} ({}, {}, boost {} x{}): {} candies, {} shards",
            request.lv_now,
            request.lv_target,
            request.track,
            request.nature,
            boost_kind,
            request.boost.effective_count(),
            result.candies_total,
            result.shards_total
        );
        Ok(result)
    }
}
