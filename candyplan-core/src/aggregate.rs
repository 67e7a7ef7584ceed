//! Final figures shown to the player.

use serde::{Deserialize, Serialize};

use crate::simulator::{ProgressionResult, StepRecord};

/// Candies still to collect once owned candies are used.
#[must_use]
pub const fn needed(result: &ProgressionResult, candy_owned: u64) -> u64 {
    result.candies_total.saturating_sub(candy_owned)
}

/// Everything the result panel displays for one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPlan {
    /// Experience for the whole span on the selected track.
    pub total_exp: u64,
    /// `total_exp` minus progress already banked.
    pub remaining_exp: u64,
    /// Passive experience credited after capping.
    pub passive_exp: u64,
    pub candies_total: u64,
    pub candies_needed: u64,
    pub shards_total: u64,
    pub boosted_candies: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepRecord>,
}

impl LevelPlan {
    #[must_use]
    pub fn assemble(
        total_exp: u64,
        remaining_exp: u64,
        passive_exp: u64,
        result: &ProgressionResult,
        candy_owned: u64,
        steps: Vec<StepRecord>,
    ) -> Self {
        Self {
            total_exp,
            remaining_exp,
            passive_exp,
            candies_total: result.candies_total,
            candies_needed: needed(result, candy_owned),
            shards_total: result.shards_total,
            boosted_candies: result.boosted_candies,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_candies_never_push_below_zero() {
        let result = ProgressionResult {
            candies_total: 40,
            shards_total: 900,
            boosted_candies: 0,
        };
        assert_eq!(needed(&result, 15), 25);
        assert_eq!(needed(&result, 40), 0);
        assert_eq!(needed(&result, 400), 0);
    }

    #[test]
    fn plan_copies_result_fields() {
        let result = ProgressionResult {
            candies_total: 12,
            shards_total: 300,
            boosted_candies: 4,
        };
        let plan = LevelPlan::assemble(500, 450, 0, &result, 5, Vec::new());
        assert_eq!(plan.candies_needed, 7);
        assert_eq!(plan.shards_total, 300);
        assert_eq!(plan.boosted_candies, 4);
        let json = serde_json::to_value(&plan).unwrap();
        assert!(json.get("steps").is_none());
    }
}
