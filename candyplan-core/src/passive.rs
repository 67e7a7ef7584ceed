//! Experience earned without spending candies.

use serde::{Deserialize, Serialize};

use crate::constants::{PASSIVE_BASE_PER_DAY, PASSIVE_PER_TIER};

/// Settings for the daily passive experience grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveIncomeCalculator {
    #[serde(default = "PassiveIncomeCalculator::default_base_per_day")]
    pub base_per_day: u64,
    #[serde(default = "PassiveIncomeCalculator::default_per_tier")]
    pub per_tier: u64,
}

impl PassiveIncomeCalculator {
    const fn default_base_per_day() -> u64 {
        PASSIVE_BASE_PER_DAY
    }

    const fn default_per_tier() -> u64 {
        PASSIVE_PER_TIER
    }

    /// Experience granted on one day at the given bonus tier.
    #[must_use]
    pub fn per_day(&self, daily_bonus_tier: u32) -> u64 {
        self.base_per_day
            .saturating_add(self.per_tier.saturating_mul(u64::from(daily_bonus_tier)))
    }

    /// Total passive experience over `days`, before any cap.
    ///
    /// Each booster doubles one day's grant; boosters beyond `days` are unused.
    #[must_use]
    pub fn uncapped(&self, days: u32, daily_bonus_tier: u32, booster_count: u32) -> u64 {
        let per_day = self.per_day(daily_bonus_tier);
        let boosted_days = booster_count.min(days);
        per_day.saturating_mul(u64::from(days) + u64::from(boosted_days))
    }

    /// Passive experience clamped to what the requested span still needs.
    #[must_use]
    pub fn passive_income(
        &self,
        days: u32,
        daily_bonus_tier: u32,
        booster_count: u32,
        remaining_need: u64,
    ) -> u64 {
        let raw = self.uncapped(days, daily_bonus_tier, booster_count);
        if raw > remaining_need {
            log::debug!("passive income {raw} capped at remaining need {remaining_need}");
        }
        raw.min(remaining_need)
    }
}

impl Default for PassiveIncomeCalculator {
    fn default() -> Self {
        Self {
            base_per_day: Self::default_base_per_day(),
            per_tier: Self::default_per_tier(),
        }
    }
}

/// Caller-supplied passive income settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PassiveInput {
    #[serde(default)]
    pub days: u32,
    #[serde(default)]
    pub daily_bonus_tier: u32,
    #[serde(default)]
    pub booster_count: u32,
}
