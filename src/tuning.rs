//! Data-driven game balance
//!
//! Everything the session machine treats as a number lives here, so
//! variants (timed vs. untimed, fixed vs. time-based bonus) are data, not
//! code paths.

use serde::{Deserialize, Serialize};

use crate::consts::HEAT_INTERVAL_TICKS;
use crate::settings::DifficultyPreset;

/// How the completion bonus is computed when the egg lands.
/// Both variants exist in the wild; the preset picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreRule {
    /// Flat bonus on completion
    FixedBonus(u64),
    /// `seconds left * per_second` at the moment of completion
    TimeBonus { per_second: u64 },
}

/// Balance values for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuning {
    /// Shrimp to devein before the sauce station opens
    pub required_prep: u8,
    /// Scallion sprinkles to finish plating
    pub required_garnish: u8,
    /// Overall time limit; `None` is the untimed variant
    pub time_limit_secs: Option<u32>,
    /// Sim ticks between heat timer firings
    pub heat_interval_ticks: u32,
    /// Progress added per heat firing
    pub heat_step: u8,
    /// Completion scoring strategy
    pub score_rule: ScoreRule,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            required_prep: 6,
            required_garnish: 3,
            time_limit_secs: Some(120),
            heat_interval_ticks: HEAT_INTERVAL_TICKS,
            heat_step: 1,
            score_rule: ScoreRule::FixedBonus(500),
        }
    }
}

impl Tuning {
    /// Balance for a difficulty preset
    pub fn for_preset(preset: DifficultyPreset) -> Self {
        Self {
            time_limit_secs: preset.time_limit_secs(),
            score_rule: preset.score_rule(),
            ..Self::default()
        }
    }

    /// Points for cracking the egg, given the seconds left on the clock
    pub fn completion_bonus(&self, time_remaining: Option<u32>) -> u64 {
        match self.score_rule {
            ScoreRule::FixedBonus(bonus) => bonus,
            ScoreRule::TimeBonus { per_second } => {
                per_second * u64::from(time_remaining.unwrap_or(0))
            }
        }
    }
}
