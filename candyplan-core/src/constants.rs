//! Centralized balance constants for candy planning.
//!
//! These values mirror the in-game numbers. The runtime copies live in
//! [`crate::config::CalcConfig`], whose defaults are sourced from here so a
//! JSON override can adjust them without touching the planner.

// Logging keys -------------------------------------------------------------
pub(crate) const DEBUG_ENV_VAR: &str = "CANDYPLAN_DEBUG_LOGS";

// Level bounds -------------------------------------------------------------
/// Lowest level a creature can be at.
pub const LV_MIN: u32 = 1;
/// Level cap.
pub const LV_MAX: u32 = 65;
/// First level that has a requirement row (the step 1 -> 2).
pub const FIRST_STEP_LEVEL: u32 = LV_MIN + 1;

/// Quick-pick target levels offered next to the target field.
pub const QUICK_TARGETS: [u32; 4] = [25, 30, 50, 60];

// Track multipliers --------------------------------------------------------
pub const TRACK_MULT_NORMAL: f64 = 1.0;
pub const TRACK_MULT_PSEUDO_LEGENDARY: f64 = 1.5;
pub const TRACK_MULT_SEMI_LEGENDARY: f64 = 1.8;
pub const TRACK_MULT_LEGENDARY: f64 = 2.2;

// Candy yield bands --------------------------------------------------------
/// Level at which the "mid" yield band starts.
pub const BAND_LOW_MID_BOUNDARY: u32 = 25;
/// Level at which the "high" yield band starts.
pub const BAND_MID_HIGH_BOUNDARY: u32 = 30;

pub const YIELD_LOW_NONE: u32 = 35;
pub const YIELD_LOW_UP: u32 = 41;
pub const YIELD_LOW_DOWN: u32 = 29;
pub const YIELD_MID_NONE: u32 = 30;
pub const YIELD_MID_UP: u32 = 35;
pub const YIELD_MID_DOWN: u32 = 25;
pub const YIELD_HIGH_NONE: u32 = 25;
pub const YIELD_HIGH_UP: u32 = 30;
pub const YIELD_HIGH_DOWN: u32 = 21;

/// Extra factors applied on top of the band constants by the older
/// calculator revision. Disabled unless `legacy_nature_factor` is set.
pub const LEGACY_NATURE_UP_FACTOR: f64 = 0.82;
pub const LEGACY_NATURE_DOWN_FACTOR: f64 = 1.18;

/// A candy never yields less than this.
pub const MIN_CANDY_YIELD: u64 = 1;

// Boosts -------------------------------------------------------------------
pub const BOOST_EXP_MULTIPLIER: u64 = 2;
pub const MINI_BOOST_SHARD_MULTIPLIER: u64 = 4;
pub const FULL_BOOST_SHARD_MULTIPLIER: u64 = 5;
/// Boost count assumed when the caller leaves the field untouched.
pub const DEFAULT_BOOST_COUNT: u32 = 0;

// Passive income -----------------------------------------------------------
pub const PASSIVE_BASE_PER_DAY: u64 = 100;
pub const PASSIVE_PER_TIER: u64 = 14;

// Caller-side input limits ---------------------------------------------------
pub const MAX_PROGRESS_EXP: u32 = 9_999;
pub const MAX_CANDY_OWNED: u32 = 9_999;
pub const MAX_BOOST_COUNT: u32 = 999;

/// Largest per-level value accepted from a data table.
pub const MAX_TABLE_VALUE: u64 = 1_000_000;
