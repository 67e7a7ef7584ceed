//! Experience granted by a single candy.
//!
//! The level axis splits into three bands, each with one yield per nature.
//! Where levels 25 and 30 fall is a [`BandBoundary`] setting so the
//! convention can be switched in one place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    BAND_LOW_MID_BOUNDARY, BAND_MID_HIGH_BOUNDARY, BOOST_EXP_MULTIPLIER,
    LEGACY_NATURE_DOWN_FACTOR, LEGACY_NATURE_UP_FACTOR, MIN_CANDY_YIELD, YIELD_HIGH_DOWN,
    YIELD_HIGH_NONE, YIELD_HIGH_UP, YIELD_LOW_DOWN, YIELD_LOW_NONE, YIELD_LOW_UP,
    YIELD_MID_DOWN, YIELD_MID_NONE, YIELD_MID_UP,
};
use crate::error::ConfigError;
use crate::numbers::{floor_f64_to_u64, u64_to_f64};

/// Nature modifier affecting candy experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    #[default]
    #[serde(rename = "none")]
    Neutral,
    Up,
    Down,
}

impl Nature {
    pub const ALL: [Self; 3] = [Self::Neutral, Self::Up, Self::Down];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "none",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Nature {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "neutral" => Ok(Self::Neutral),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(()),
        }
    }
}

/// Which side of a band edge the edge level itself belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BandBoundary {
    /// `[1,25) [25,30) [30,65]`: an edge level opens the higher band.
    #[default]
    LowerInclusive,
    /// `[1,25] (25,30] (30,65]`: an edge level closes the lower band.
    UpperInclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YieldBand {
    Low,
    Mid,
    High,
}

impl YieldBand {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mid => "mid",
            Self::High => "high",
        }
    }
}

/// Yield for each nature within one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatureYields {
    pub none: u32,
    pub up: u32,
    pub down: u32,
}

impl NatureYields {
    #[must_use]
    pub const fn get(&self, nature: Nature) -> u32 {
        match nature {
            Nature::Neutral => self.none,
            Nature::Up => self.up,
            Nature::Down => self.down,
        }
    }
}

/// Per-band yields plus the band edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldBands {
    #[serde(default)]
    pub boundary: BandBoundary,
    #[serde(default = "YieldBands::default_low_mid")]
    pub low_mid: u32,
    #[serde(default = "YieldBands::default_mid_high")]
    pub mid_high: u32,
    #[serde(default = "YieldBands::default_low")]
    pub low: NatureYields,
    #[serde(default = "YieldBands::default_mid")]
    pub mid: NatureYields,
    #[serde(default = "YieldBands::default_high")]
    pub high: NatureYields,
}

impl YieldBands {
    const fn default_low_mid() -> u32 {
        BAND_LOW_MID_BOUNDARY
    }

    const fn default_mid_high() -> u32 {
        BAND_MID_HIGH_BOUNDARY
    }

    const fn default_low() -> NatureYields {
        NatureYields {
            none: YIELD_LOW_NONE,
            up: YIELD_LOW_UP,
            down: YIELD_LOW_DOWN,
        }
    }

    const fn default_mid() -> NatureYields {
        NatureYields {
            none: YIELD_MID_NONE,
            up: YIELD_MID_UP,
            down: YIELD_MID_DOWN,
        }
    }

    const fn default_high() -> NatureYields {
        NatureYields {
            none: YIELD_HIGH_NONE,
            up: YIELD_HIGH_UP,
            down: YIELD_HIGH_DOWN,
        }
    }

    #[must_use]
    pub const fn band(&self, level: u32) -> YieldBand {
        let (in_low, in_mid) = match self.boundary {
            BandBoundary::LowerInclusive => (level < self.low_mid, level < self.mid_high),
            BandBoundary::UpperInclusive => (level <= self.low_mid, level <= self.mid_high),
        };
        if in_low {
            YieldBand::Low
        } else if in_mid {
            YieldBand::Mid
        } else {
            YieldBand::High
        }
    }

    #[must_use]
    pub const fn yields(&self, band: YieldBand) -> &NatureYields {
        match band {
            YieldBand::Low => &self.low,
            YieldBand::Mid => &self.mid,
            YieldBand::High => &self.high,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the edges are out of order or any yield is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_mid >= self.mid_high {
            return Err(ConfigError::BoundaryOrder {
                low_mid: self.low_mid,
                mid_high: self.mid_high,
            });
        }
        for band in [YieldBand::Low, YieldBand::Mid, YieldBand::High] {
            for nature in Nature::ALL {
                if self.yields(band).get(nature) == 0 {
                    return Err(ConfigError::ZeroYield {
                        band: band.as_str(),
                        nature: nature.as_str(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for YieldBands {
    fn default() -> Self {
        Self {
            boundary: BandBoundary::default(),
            low_mid: Self::default_low_mid(),
            mid_high: Self::default_mid_high(),
            low: Self::default_low(),
            mid: Self::default_mid(),
            high: Self::default_high(),
        }
    }
}

/// Candy yield lookup with boost and legacy nature handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandyYieldPolicy {
    bands: YieldBands,
    legacy_nature_factor: bool,
    boost_exp_multiplier: u64,
}

impl CandyYieldPolicy {
    #[must_use]
    pub const fn new(bands: YieldBands, legacy_nature_factor: bool, boost_exp_multiplier: u64) -> Self {
        Self {
            bands,
            legacy_nature_factor,
            boost_exp_multiplier,
        }
    }

    /// Experience from one ordinary candy used at `level`.
    #[must_use]
    pub fn base_yield(&self, level: u32, nature: Nature) -> u64 {
        let band = self.bands.band(level);
        let base = u64::from(self.bands.yields(band).get(nature));
        let adjusted = if self.legacy_nature_factor {
            let extra = match nature {
                Nature::Neutral => 1.0,
                Nature::Up => LEGACY_NATURE_UP_FACTOR,
                Nature::Down => LEGACY_NATURE_DOWN_FACTOR,
            };
            floor_f64_to_u64(u64_to_f64(base) * extra)
        } else {
            base
        };
        adjusted.max(MIN_CANDY_YIELD)
    }

    /// Experience from one candy, doubled when a boost applies to it.
    #[must_use]
    pub fn candy_yield(&self, level: u32, nature: Nature, boosted: bool) -> u64 {
        let base = self.base_yield(level, nature);
        let gained = if boosted {
            base.saturating_mul(self.boost_exp_multiplier)
        } else {
            base
        };
        gained.max(MIN_CANDY_YIELD)
    }
}

impl Default for CandyYieldPolicy {
    fn default() -> Self {
        Self::new(YieldBands::default(), false, BOOST_EXP_MULTIPLIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_inclusive_bands_open_at_edges() {
        let policy = CandyYieldPolicy::default();
        assert_eq!(policy.base_yield(1, Nature::Neutral), 35);
        assert_eq!(policy.base_yield(24, Nature::Up), 41);
        assert_eq!(policy.base_yield(25, Nature::Neutral), 30);
        assert_eq!(policy.base_yield(29, Nature::Down), 25);
        assert_eq!(policy.base_yield(30, Nature::Neutral), 25);
        assert_eq!(policy.base_yield(64, Nature::Up), 30);
    }

    #[test]
    fn upper_inclusive_bands_close_at_edges() {
        let bands = YieldBands {
            boundary: BandBoundary::UpperInclusive,
            ..YieldBands::default()
        };
        let policy = CandyYieldPolicy::new(bands, false, BOOST_EXP_MULTIPLIER);
        assert_eq!(policy.base_yield(25, Nature::Neutral), 35);
        assert_eq!(policy.base_yield(26, Nature::Neutral), 30);
        assert_eq!(policy.base_yield(30, Nature::Neutral), 30);
        assert_eq!(policy.base_yield(31, Nature::Down), 21);
    }

    #[test]
    fn boost_doubles_yield() {
        let policy = CandyYieldPolicy::default();
        assert_eq!(policy.candy_yield(10, Nature::Neutral, true), 70);
        assert_eq!(policy.candy_yield(10, Nature::Neutral, false), 35);
    }

    #[test]
    fn legacy_nature_factor_applies_and_floors() {
        let policy = CandyYieldPolicy::new(YieldBands::default(), true, BOOST_EXP_MULTIPLIER);
        // 41 * 0.82 = 33.62, 29 * 1.18 = 34.22
        assert_eq!(policy.base_yield(1, Nature::Up), 33);
        assert_eq!(policy.base_yield(1, Nature::Down), 34);
        assert_eq!(policy.base_yield(1, Nature::Neutral), 35);
    }

    #[test]
    fn yield_never_drops_below_one() {
        let tiny = NatureYields {
            none: 1,
            up: 1,
            down: 1,
        };
        let bands = YieldBands {
            low: tiny,
            ..YieldBands::default()
        };
        let policy = CandyYieldPolicy::new(bands, true, 0);
        // 1 * 0.82 floors to 0 and is lifted back to 1.
        assert_eq!(policy.base_yield(1, Nature::Up), 1);
        assert_eq!(policy.candy_yield(1, Nature::Up, true), 1);
    }

    #[test]
    fn validation_rejects_bad_bands() {
        assert!(YieldBands::default().validate().is_ok());
        let swapped = YieldBands {
            low_mid: 30,
            mid_high: 25,
            ..YieldBands::default()
        };
        assert!(matches!(
            swapped.validate(),
            Err(ConfigError::BoundaryOrder { .. })
        ));
        let zero = YieldBands {
            mid: NatureYields {
                none: 30,
                up: 0,
                down: 25,
            },
            ..YieldBands::default()
        };
        assert_eq!(
            zero.validate(),
            Err(ConfigError::ZeroYield {
                band: "mid",
                nature: "up"
            })
        );
    }

    #[test]
    fn nature_parses() {
        assert_eq!("none".parse::<Nature>(), Ok(Nature::Neutral));
        assert_eq!("up".parse::<Nature>(), Ok(Nature::Up));
        assert_eq!(serde_json::to_string(&Nature::Neutral).unwrap(), "\"none\"");
    }
}
