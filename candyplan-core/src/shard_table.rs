//! Shard cost per candy, keyed by the level being reached.

use crate::table_text::LevelColumn;

/// Sparse lookup of shards charged for each candy used on a step.
///
/// Gaps cost nothing: shards are a secondary figure and a missing row must
/// not block the candy calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardCostTable {
    column: LevelColumn,
}

impl ShardCostTable {
    #[must_use]
    pub fn new(column: LevelColumn) -> Self {
        Self { column }
    }

    /// Shards per candy while advancing into `level`; 0 when unlisted.
    #[must_use]
    pub fn shard_cost(&self, level: u32) -> u64 {
        self.column.get(level).unwrap_or(0)
    }

    /// Levels in `(now, target]` without a shard row.
    #[must_use]
    pub fn gaps(&self, now: u32, target: u32) -> Vec<u32> {
        (now + 1..=target)
            .filter(|lv| self.column.get(*lv).is_none())
            .collect()
    }
}
