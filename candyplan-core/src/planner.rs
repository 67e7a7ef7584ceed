//! Caller-facing planner combining validation, tables and simulation.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::aggregate::LevelPlan;
use crate::boost::{BoostInput, BoostSelection};
use crate::config::CalcConfig;
use crate::error::CalcError;
use crate::exp_table::Track;
use crate::passive::PassiveInput;
use crate::simulator::{ProgressionRequest, ProgressionResult, validate_range};
use crate::store::{EmbeddedTables, TableSource, TableStore};
use crate::yield_policy::Nature;

/// Raw calculator inputs, already range-clamped by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanInput {
    pub lv_now: u32,
    pub lv_target: u32,
    #[serde(default)]
    pub track: Track,
    #[serde(default)]
    pub nature: Nature,
    /// Experience already earned toward the next level.
    #[serde(default)]
    pub progress_exp: u64,
    #[serde(default)]
    pub candy_owned: u64,
    #[serde(default)]
    pub boost: BoostInput,
    #[serde(default)]
    pub passive: PassiveInput,
    /// Keep the per-level breakdown in the plan.
    #[serde(default)]
    pub breakdown: bool,
}

impl PlanInput {
    #[must_use]
    pub fn new(lv_now: u32, lv_target: u32) -> Self {
        Self {
            lv_now,
            lv_target,
            track: Track::Normal,
            nature: Nature::Neutral,
            progress_exp: 0,
            candy_owned: 0,
            boost: BoostInput::default(),
            passive: PassiveInput::default(),
            breakdown: false,
        }
    }

    /// Check level bounds and resolve the boost fields.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::InvalidRange`] or [`CalcError::ConflictingBoost`].
    pub fn validate(&self, default_boost_count: u32) -> Result<BoostSelection, CalcError> {
        validate_range(self.lv_now, self.lv_target)?;
        self.boost.resolve(default_boost_count)
    }
}

/// Planner bound to a table source; tables load on first use.
pub struct Planner<S>
where
    S: TableSource,
{
    source: S,
    config: CalcConfig,
    tables: OnceCell<TableStore>,
}

impl Planner<EmbeddedTables> {
    /// Planner over the compiled-in tables with default tuning.
    #[must_use]
    pub fn embedded() -> Self {
        Self::new(EmbeddedTables, CalcConfig::default())
    }
}

impl<S> Planner<S>
where
    S: TableSource,
{
    #[must_use]
    pub const fn new(source: S, config: CalcConfig) -> Self {
        Self {
            source,
            config,
            tables: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CalcConfig {
        &self.config
    }

    /// Load and derive the tables once; later calls reuse them.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails or a table cannot be parsed.
    /// Nothing is cached on failure.
    pub fn load_tables(&self) -> Result<&TableStore, CalcError> {
        self.tables
            .get_or_try_init(|| TableStore::load(&self.source, self.config))
    }

    /// Run the simulator on a prepared request.
    ///
    /// # Errors
    ///
    /// Returns loading errors, [`CalcError::InvalidRange`] or
    /// [`CalcError::DataIntegrity`].
    pub fn simulate(&self, request: &ProgressionRequest) -> Result<ProgressionResult, CalcError> {
        validate_range(request.lv_now, request.lv_target)?;
        let tables = self.load_tables()?;
        tables
            .requirements()
            .ensure_span(request.lv_now, request.lv_target, request.track)?;
        tables.simulator().run(request, None)
    }

    /// Validate raw inputs and produce every displayed figure.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::InvalidRange`] or [`CalcError::ConflictingBoost`]
    /// before touching the tables, then any loading or data error.
    pub fn plan(&self, input: &PlanInput) -> Result<LevelPlan, CalcError> {
        let boost = input.validate(self.config.default_boost_count)?;
        plan_validated(self.load_tables()?, input, boost)
    }
}

/// Produce every displayed figure for `input` from an already loaded store.
///
/// # Errors
///
/// Returns validation errors or [`CalcError::DataIntegrity`].
pub fn plan_with_tables(tables: &TableStore, input: &PlanInput) -> Result<LevelPlan, CalcError> {
    let boost = input.validate(tables.config().default_boost_count)?;
    plan_validated(tables, input, boost)
}

fn plan_validated(
    tables: &TableStore,
    input: &PlanInput,
    boost: BoostSelection,
) -> Result<LevelPlan, CalcError> {
    let config = tables.config();

    let requirements = tables.requirements();
    requirements.ensure_span(input.lv_now, input.lv_target, input.track)?;
    let total_exp = requirements.total_requirement(input.lv_now, input.lv_target, input.track)?;
    let remaining_exp = total_exp.saturating_sub(input.progress_exp);
    let passive_exp = config.passive.passive_income(
        input.passive.days,
        input.passive.daily_bonus_tier,
        input.passive.booster_count,
        remaining_exp,
    );

    let request = ProgressionRequest {
        lv_now: input.lv_now,
        lv_target: input.lv_target,
        track: input.track,
        nature: input.nature,
        initial_progress: input.progress_exp,
        passive_income: passive_exp,
        boost,
    };
    let simulator = tables.simulator();
    let mut steps = Vec::new();
    let records = if input.breakdown { Some(&mut steps) } else { None };
    let result = simulator.run(&request, records)?;

    Ok(LevelPlan::assemble(
        total_exp,
        remaining_exp,
        passive_exp,
        &result,
        input.candy_owned,
        steps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boost::BoostKind;
    use crate::store::TextTables;
    use std::borrow::Cow;
    use std::cell::Cell;
    use std::convert::Infallible;

    #[derive(Default)]
    struct CountingSource {
        reads: Cell<u32>,
    }

    impl TableSource for CountingSource {
        type Error = Infallible;

        fn exp_table(&self) -> Result<Cow<'_, str>, Self::Error> {
            self.reads.set(self.reads.get() + 1);
            Ok(Cow::Borrowed("2 54\n3 71\n4 108\n"))
        }

        fn shard_table(&self) -> Result<Cow<'_, str>, Self::Error> {
            Ok(Cow::Borrowed("2 14\n3 18\n4 22\n"))
        }
    }

    #[test]
    fn tables_load_once() {
        let planner = Planner::new(CountingSource::default(), CalcConfig::default());
        planner.plan(&PlanInput::new(1, 3)).unwrap();
        planner.plan(&PlanInput::new(2, 4)).unwrap();
        planner.load_tables().unwrap();
        assert_eq!(planner.source.reads.get(), 1);
    }

    #[test]
    fn validation_runs_before_loading() {
        let planner = Planner::new(CountingSource::default(), CalcConfig::default());
        assert_eq!(
            planner.plan(&PlanInput::new(5, 5)),
            Err(CalcError::InvalidRange { now: 5, target: 5 })
        );
        let mut input = PlanInput::new(1, 3);
        input.boost = BoostInput {
            full: Some(1),
            mini: Some(1),
        };
        assert_eq!(
            planner.plan(&input),
            Err(CalcError::ConflictingBoost { full: 1, mini: 1 })
        );
        assert_eq!(planner.source.reads.get(), 0);
    }

    #[test]
    fn plan_reports_totals_and_owned_offset() {
        let planner = Planner::new(
            TextTables::new("2 54\n3 71\n4 108\n", "2 14\n3 18\n4 22\n"),
            CalcConfig::default(),
        );
        let mut input = PlanInput::new(1, 4);
        input.progress_exp = 10;
        input.candy_owned = 2;
        input.breakdown = true;
        let plan = planner.plan(&input).unwrap();
        assert_eq!(plan.total_exp, 233);
        assert_eq!(plan.remaining_exp, 223);
        assert_eq!(plan.passive_exp, 0);
        // Bank 10: Lv2 needs 2 candies (carry 26), Lv3 2 (carry 25), Lv4 3 (carry 22).
        assert_eq!(plan.candies_total, 7);
        assert_eq!(plan.candies_needed, 5);
        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.steps[2].carry_out, 22);
    }

    #[test]
    fn passive_income_is_capped_to_remaining_need() {
        let planner = Planner::new(
            TextTables::new("2 54\n3 71\n4 108\n", "2 14\n3 18\n4 22\n"),
            CalcConfig::default(),
        );
        let mut input = PlanInput::new(1, 4);
        input.passive.days = 30;
        let plan = planner.plan(&input).unwrap();
        assert_eq!(plan.passive_exp, 233);
        assert_eq!(plan.candies_total, 0);
        assert_eq!(plan.shards_total, 0);
    }

    #[test]
    fn default_boost_count_applies_to_untouched_fields() {
        let config = CalcConfig {
            default_boost_count: 100,
            ..CalcConfig::default()
        };
        let planner = Planner::new(
            TextTables::new("2 54\n3 71\n4 108\n", "2 14\n3 18\n4 22\n"),
            config,
        );
        let plan = planner.plan(&PlanInput::new(1, 4)).unwrap();
        assert_eq!(plan.boosted_candies, plan.candies_total);

        let mut explicit = PlanInput::new(1, 4);
        explicit.boost = BoostInput::full(0);
        let plain = planner.plan(&explicit).unwrap();
        assert_eq!(plain.boosted_candies, 0);
        assert!(plain.candies_total > plan.candies_total);
    }

    #[test]
    fn gap_below_the_span_is_reported_by_both_entry_points() {
        let planner = Planner::new(
            TextTables::new("2 54\n4 108\n5 128\n", "2 14\n4 22\n5 27\n"),
            CalcConfig::default(),
        );
        for track in [Track::Normal, Track::Legendary] {
            let gap = CalcError::DataIntegrity { level: 3, track };
            let request = ProgressionRequest::new(4, 5).with_track(track);
            assert_eq!(planner.simulate(&request), Err(gap.clone()));
            let mut input = PlanInput::new(4, 5);
            input.track = track;
            assert_eq!(planner.plan(&input), Err(gap));
        }
    }

    #[test]
    fn simulate_matches_store_simulator() {
        let planner = Planner::embedded();
        let request = ProgressionRequest::new(10, 30).with_boost(BoostKind::Mini, 20);
        let direct = TableStore::embedded()
            .unwrap()
            .simulator()
            .simulate(&request)
            .unwrap();
        assert_eq!(planner.simulate(&request).unwrap(), direct);
    }
}
