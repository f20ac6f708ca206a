//! Session state and core types
//!
//! All state that must be persisted for determinism lives here.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::FEEDBACK_TICKS;
use crate::tuning::Tuning;

use super::timer::{Countdown, HeatTimer};

/// Top-level phase of a cooking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Title screen, nothing running
    Menu,
    /// Devein the shrimp, strictly left to right
    Prep,
    /// Mix the four sauce ingredients
    Sauce,
    /// Wok work: shrimp, sauce, egg
    Cooking,
    /// Sprinkle scallions on the plated dish
    Plating,
    /// Order up - session complete
    Final,
    /// Countdown ran out
    Lost,
}

impl Stage {
    /// Stages where timers run and drops can land
    pub fn is_active(&self) -> bool {
        !matches!(self, Stage::Menu | Stage::Final | Stage::Lost)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Menu => "menu",
            Stage::Prep => "prep",
            Stage::Sauce => "sauce",
            Stage::Cooking => "cooking",
            Stage::Plating => "plating",
            Stage::Final => "final",
            Stage::Lost => "lost",
        }
    }
}

/// Sub-state machine of the Cooking stage. Strictly linear: derives `Ord`
/// so "never moves backward" is checkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum CookStage {
    #[default]
    Empty,
    HeatingShrimp,
    ShrimpReady,
    SauceAdded,
    Finished,
}

/// The closed set of sauce ingredients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SauceIngredient {
    Seasonings,
    BlackBeans,
    Garlic,
    Wine,
}

impl SauceIngredient {
    pub const ALL: [SauceIngredient; 4] = [
        SauceIngredient::Seasonings,
        SauceIngredient::BlackBeans,
        SauceIngredient::Garlic,
        SauceIngredient::Wine,
    ];

    /// Display name for feedback text
    pub fn label(&self) -> &'static str {
        match self {
            SauceIngredient::Seasonings => "seasonings",
            SauceIngredient::BlackBeans => "black beans",
            SauceIngredient::Garlic => "garlic",
            SauceIngredient::Wine => "wine",
        }
    }

    fn index(&self) -> usize {
        match self {
            SauceIngredient::Seasonings => 0,
            SauceIngredient::BlackBeans => 1,
            SauceIngredient::Garlic => 2,
            SauceIngredient::Wine => 3,
        }
    }
}

/// Mixing bowl contents. Each ingredient lands at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SauceBowl {
    added: [bool; 4],
}

impl SauceBowl {
    /// Add an ingredient; returns false if it was already in the bowl
    pub fn add(&mut self, ing: SauceIngredient) -> bool {
        let slot = &mut self.added[ing.index()];
        if *slot {
            false
        } else {
            *slot = true;
            true
        }
    }

    pub fn contains(&self, ing: SauceIngredient) -> bool {
        self.added[ing.index()]
    }

    pub fn len(&self) -> usize {
        self.added.iter().filter(|a| **a).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.added.iter().all(|a| *a)
    }

    pub fn clear(&mut self) {
        self.added = [false; 4];
    }
}

/// Scatter placement for one sprinkled scallion. Render hint only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GarnishSpot {
    /// Horizontal position as percent of the plate
    pub x_pct: f32,
    /// Vertical position as percent of the plate
    pub y_pct: f32,
    /// Rotation in degrees
    pub rot_deg: f32,
}

/// Transient feedback popup. Cosmetic only - guards never consult it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub text: String,
    pub ticks_left: u32,
}

/// Events emitted by `apply`/`tick`, drained by the shell each frame
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StageEntered(Stage),
    PrepAdvanced { index: u8 },
    SauceMixed(SauceIngredient),
    CookAdvanced(CookStage),
    ScoreAwarded(u64),
    CountdownTicked(u32),
    SessionLost,
    SessionComplete { score: u64 },
}

/// Pending stage transition, counted down by the tick loop
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PendingStage {
    pub ticks: u32,
    pub to: Stage,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Derive a fresh RNG; each call advances the stream so consecutive
    /// draws differ while staying reproducible from the seed
    pub fn next_rng(&mut self) -> Pcg32 {
        self.stream = self.stream.wrapping_add(1);
        Pcg32::seed_from_u64(
            self.seed
                .wrapping_add(self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        )
    }
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG state (garnish scatter)
    pub rng_state: RngState,
    /// Balance values for this run
    pub tuning: Tuning,
    /// Current stage
    pub stage: Stage,
    /// Score accumulator; add-only
    pub score: u64,
    /// Shrimp deveined so far, in [0, tuning.required_prep]
    pub prep_count: u8,
    /// Mixing bowl contents
    pub bowl: SauceBowl,
    /// Cooking sub-state
    pub cook: CookStage,
    /// Scatter placements for sprinkled scallions; len is the garnish count
    pub garnish_spots: Vec<GarnishSpot>,
    /// Overall countdown (timed variants)
    pub countdown: Countdown,
    /// Heat progress timer
    pub heat: HeatTimer,
    /// Pending delayed stage transition (egg -> plating, plated -> final)
    pub stage_delay: Option<PendingStage>,
    /// Active feedback popup
    pub feedback: Option<Feedback>,
    /// Sim tick counter for the current run
    pub time_ticks: u64,
    /// Event queue for the shell (not part of game state)
    #[serde(skip)]
    events: Vec<SessionEvent>,
}

impl SessionState {
    /// Create a new session sitting on the menu
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let countdown = Countdown::new(tuning.time_limit_secs);
        let heat = HeatTimer::new(tuning.heat_interval_ticks, tuning.heat_step);
        Self {
            seed,
            rng_state: RngState::new(seed),
            tuning,
            stage: Stage::Menu,
            score: 0,
            prep_count: 0,
            bowl: SauceBowl::default(),
            cook: CookStage::Empty,
            garnish_spots: Vec::new(),
            countdown,
            heat,
            stage_delay: None,
            feedback: None,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Reset to the identical run baseline and enter Prep.
    /// Used by both `start` and `restart`.
    pub fn reset_run(&mut self) {
        self.score = 0;
        self.prep_count = 0;
        self.bowl.clear();
        self.cook = CookStage::Empty;
        self.garnish_spots.clear();
        self.countdown = Countdown::new(self.tuning.time_limit_secs);
        self.heat = HeatTimer::new(self.tuning.heat_interval_ticks, self.tuning.heat_step);
        self.stage_delay = None;
        self.feedback = None;
        self.time_ticks = 0;
        self.rng_state = RngState::new(self.seed);
        self.countdown.arm();
        self.enter_stage(Stage::Prep);
    }

    /// Cook progress in [0, 100]
    pub fn cook_progress(&self) -> u8 {
        self.heat.progress()
    }

    /// Seconds left, `None` for untimed runs
    pub fn time_remaining(&self) -> Option<u32> {
        self.countdown.remaining()
    }

    pub fn garnish_count(&self) -> u8 {
        self.garnish_spots.len() as u8
    }

    pub fn is_active(&self) -> bool {
        self.stage.is_active()
    }

    /// Move to a stage immediately. Leaving the active stages cancels both
    /// timers so no tick outlives the run.
    pub fn enter_stage(&mut self, to: Stage) {
        log::info!("stage {} -> {}", self.stage.as_str(), to.as_str());
        self.stage = to;
        if !to.is_active() {
            self.countdown.cancel();
            self.heat.cancel();
            self.stage_delay = None;
        }
        self.push_event(SessionEvent::StageEntered(to));
        if to == Stage::Final {
            self.push_event(SessionEvent::SessionComplete { score: self.score });
        }
    }

    /// Schedule a stage transition after a tick delay
    pub fn schedule_stage(&mut self, to: Stage, ticks: u32) {
        self.stage_delay = Some(PendingStage { ticks, to });
    }

    /// Advance the cook sub-state
    pub fn set_cook(&mut self, to: CookStage) {
        log::debug!("cook {:?} -> {:?}", self.cook, to);
        self.cook = to;
        self.push_event(SessionEvent::CookAdvanced(to));
    }

    /// Add milestone points. Score only ever grows.
    pub fn award(&mut self, points: u64) {
        self.score += points;
        self.push_event(SessionEvent::ScoreAwarded(points));
    }

    /// Show a feedback popup with the fixed expiry
    pub fn trigger_feedback(&mut self, text: impl Into<String>) {
        self.feedback = Some(Feedback {
            text: text.into(),
            ticks_left: FEEDBACK_TICKS,
        });
    }

    /// Countdown ran out: force the Lost screen. Timers are cancelled by the
    /// stage change, so this fires at most once per run.
    pub fn force_lose(&mut self) {
        self.feedback = None;
        self.enter_stage(Stage::Lost);
        self.push_event(SessionEvent::SessionLost);
    }

    /// Drop a scallion at a deterministic scatter position
    pub fn sprinkle_garnish(&mut self) {
        use rand::Rng;
        let mut rng = self.rng_state.next_rng();
        let spot = GarnishSpot {
            x_pct: 30.0 + rng.random_range(0.0..40.0),
            y_pct: 40.0 + rng.random_range(0.0..20.0),
            rot_deg: rng.random_range(0.0..360.0),
        };
        self.garnish_spots.push(spot);
    }

    pub fn push_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> SessionState {
        let mut state = SessionState::new(7, Tuning::default());
        state.reset_run();
        state
    }

    #[test]
    fn test_reset_baseline() {
        let mut state = baseline();
        state.award(300);
        state.prep_count = 4;
        state.bowl.add(SauceIngredient::Wine);
        state.set_cook(CookStage::SauceAdded);
        state.sprinkle_garnish();

        state.reset_run();
        assert_eq!(state.stage, Stage::Prep);
        assert_eq!(state.score, 0);
        assert_eq!(state.prep_count, 0);
        assert!(state.bowl.is_empty());
        assert_eq!(state.cook, CookStage::Empty);
        assert_eq!(state.cook_progress(), 0);
        assert!(state.garnish_spots.is_empty());
        assert!(state.stage_delay.is_none());
        assert!(state.feedback.is_none());
    }

    #[test]
    fn test_bowl_rejects_duplicates() {
        let mut bowl = SauceBowl::default();
        assert!(bowl.add(SauceIngredient::BlackBeans));
        assert!(!bowl.add(SauceIngredient::BlackBeans));
        assert_eq!(bowl.len(), 1);

        for ing in SauceIngredient::ALL {
            bowl.add(ing);
        }
        assert!(bowl.is_complete());
        assert_eq!(bowl.len(), 4);
    }

    #[test]
    fn test_garnish_scatter_deterministic() {
        let mut a = baseline();
        let mut b = baseline();
        for _ in 0..3 {
            a.sprinkle_garnish();
            b.sprinkle_garnish();
        }
        assert_eq!(a.garnish_spots, b.garnish_spots);
        // Consecutive spots differ (the stream advances)
        assert_ne!(a.garnish_spots[0], a.garnish_spots[1]);
    }

    #[test]
    fn test_leaving_active_stage_cancels_timers() {
        let mut state = baseline();
        state.heat.arm();
        state.schedule_stage(Stage::Final, 10);
        state.enter_stage(Stage::Lost);
        assert!(!state.heat.is_armed());
        assert!(!state.countdown.is_armed());
        assert!(state.stage_delay.is_none());
    }
}
