//! Kitchen Lab - a drag-and-drop wok cooking mini-game
//!
//! Core modules:
//! - `sim`: Deterministic session logic (stages, guards, timers)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `highscores`: LocalStorage leaderboard

pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::{DifficultyPreset, Settings};
pub use tuning::{ScoreRule, Tuning};

/// Game timing constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz; the game is UI-paced, not physics-paced)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Sim ticks per wall-clock second
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Heat timer cadence: progress advances every N sim ticks (20 Hz)
    pub const HEAT_INTERVAL_TICKS: u32 = 3;
    /// Cook progress where the shrimp is done
    pub const COOK_PROGRESS_MAX: u8 = 100;

    /// Feedback popup lifetime (1.5 s)
    pub const FEEDBACK_TICKS: u32 = 90;
    /// Delay between cracking the egg and moving to plating (2 s)
    pub const FINISH_DELAY_TICKS: u32 = 120;
    /// Delay between the last scallion sprinkle and the final screen (1 s)
    pub const PLATE_DELAY_TICKS: u32 = 60;
}

/// Format whole seconds as a M:SS countdown clock
#[inline]
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(125), "2:05");
    }
}
