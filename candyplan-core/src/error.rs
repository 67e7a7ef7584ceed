//! Error types surfaced by the planner.

use thiserror::Error;

use crate::exp_table::Track;

/// Failures raised while parsing one of the text tables.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableParseError {
    #[error("{table} table line {line}: cannot parse `{text}` as a number")]
    BadNumber {
        table: &'static str,
        line: usize,
        text: String,
    },
    #[error("{table} table lists level {level} more than once")]
    DuplicateLevel { table: &'static str, level: u32 },
    #[error("{table} table level {level} is outside 1..=65")]
    LevelOutOfRange { table: &'static str, level: u32 },
    #[error("{table} table value {value} at level {level} is out of range")]
    ValueOutOfRange {
        table: &'static str,
        level: u32,
        value: u64,
    },
}

/// Errors raised when calculator configuration invariants are violated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("normal track multiplier must be exactly 1.0 (got {value:.2})")]
    NormalMultiplier { value: f64 },
    #[error("{track} multiplier must be at least 1.0 (got {value:.2})")]
    MultiplierBelowOne { track: Track, value: f64 },
    #[error("band boundaries out of order (low/mid {low_mid} >= mid/high {mid_high})")]
    BoundaryOrder { low_mid: u32, mid_high: u32 },
    #[error("{band} band yield for {nature} nature must be positive")]
    ZeroYield {
        band: &'static str,
        nature: &'static str,
    },
    #[error("boost multipliers must be at least 1")]
    ZeroBoostMultiplier,
    #[error("config JSON invalid: {0}")]
    Json(String),
}

/// Every failure the planner can report to its caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalcError {
    #[error("level range invalid: current {now}, target {target} (need 1 <= current < target <= 65)")]
    InvalidRange { now: u32, target: u32 },
    #[error("experience table has no usable row for level {level} on the {track} track")]
    DataIntegrity { level: u32, track: Track },
    #[error("full boost ({full}) and mini boost ({mini}) cannot both be used")]
    ConflictingBoost { full: u32, mini: u32 },
    #[error("table source unavailable: {0}")]
    Source(String),
    #[error(transparent)]
    Table(#[from] TableParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
