//! Game settings and preferences
//!
//! Persisted separately from the leaderboard in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::tuning::ScoreRule;

/// Difficulty presets. The preset decides whether the session is timed and
/// how the completion bonus is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    /// No countdown, flat bonus
    Relaxed,
    /// Two minutes on the clock, flat bonus
    #[default]
    Classic,
    /// One minute on the clock, bonus scales with time left
    Rush,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Relaxed => "Relaxed",
            DifficultyPreset::Classic => "Classic",
            DifficultyPreset::Rush => "Rush",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" => Some(DifficultyPreset::Relaxed),
            "classic" => Some(DifficultyPreset::Classic),
            "rush" => Some(DifficultyPreset::Rush),
            _ => None,
        }
    }

    /// Overall time limit for this preset
    pub fn time_limit_secs(&self) -> Option<u32> {
        match self {
            DifficultyPreset::Relaxed => None,
            DifficultyPreset::Classic => Some(120),
            DifficultyPreset::Rush => Some(60),
        }
    }

    /// Completion scoring strategy for this preset
    pub fn score_rule(&self) -> ScoreRule {
        match self {
            DifficultyPreset::Relaxed | DifficultyPreset::Classic => ScoreRule::FixedBonus(500),
            DifficultyPreset::Rush => ScoreRule::TimeBonus { per_second: 10 },
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Selected difficulty preset
    pub difficulty: DifficultyPreset,

    // === HUD ===
    /// Show the countdown clock (timed presets only)
    pub show_timer: bool,
    /// Show per-station hint text
    pub show_hints: bool,

    // === Audio (prep for later) ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no bouncing feedback popups)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyPreset::Classic,

            show_timer: true,
            show_hints: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Whether the HUD clock should render at all
    pub fn effective_show_timer(&self) -> bool {
        self.show_timer && self.difficulty.time_limit_secs().is_some()
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "kitchen_lab_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
