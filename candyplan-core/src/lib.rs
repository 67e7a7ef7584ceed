//! Candyplan Core
//!
//! Platform-agnostic level-up planner. Given a creature's current and target
//! level, growth track, nature, banked progress, boosts and passive income,
//! it simulates candy use level by level and reports the candies and shards
//! required. This crate holds no UI or platform-specific dependencies.

pub mod aggregate;
pub mod boost;
pub mod config;
pub mod constants;
pub mod error;
pub mod exp_table;
pub mod numbers;
pub mod passive;
pub mod planner;
pub mod shard_table;
pub mod simulator;
pub mod store;
pub mod table_text;
pub mod yield_policy;

// Re-export commonly used types
pub use aggregate::{LevelPlan, needed};
pub use boost::{BoostInput, BoostKind, BoostSelection, BoostShardMultipliers};
pub use config::CalcConfig;
pub use error::{CalcError, ConfigError, TableParseError};
pub use exp_table::{LevelRequirementTable, Track, TrackMultipliers};
pub use passive::{PassiveIncomeCalculator, PassiveInput};
pub use planner::{PlanInput, Planner, plan_with_tables};
pub use shard_table::ShardCostTable;
pub use simulator::{
    ProgressionRequest, ProgressionResult, ProgressionSimulator, StepRecord, validate_range,
};
#[cfg(feature = "async")]
pub use store::AsyncTableCache;
pub use store::{EmbeddedTables, TableSource, TableStore, TextTables};
pub use yield_policy::{BandBoundary, CandyYieldPolicy, Nature, NatureYields, YieldBands};
