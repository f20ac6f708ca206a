//! Fixed timestep session tick
//!
//! One call advances the session by a single sim step. The shell runs this
//! from an accumulator loop; tests call it directly.

use super::state::{CookStage, SessionEvent, SessionState, Stage};
use super::timer::{CountdownTick, HeatTick};

/// Advance the session by one fixed timestep
pub fn tick(state: &mut SessionState) {
    // Menu, Final and Lost are quiescent: nothing mutates until
    // Start/Restart comes through `apply`
    if !state.stage.is_active() {
        return;
    }

    state.time_ticks += 1;

    // Feedback expiry
    if let Some(feedback) = &mut state.feedback {
        feedback.ticks_left = feedback.ticks_left.saturating_sub(1);
        if feedback.ticks_left == 0 {
            state.feedback = None;
        }
    }

    // Overall countdown (timed variants only). Expiry ends the run
    // immediately - the pending transition below must not land afterwards.
    match state.countdown.tick() {
        CountdownTick::Second(secs) => {
            state.push_event(SessionEvent::CountdownTicked(secs));
        }
        CountdownTick::Expired => {
            state.force_lose();
            return;
        }
        CountdownTick::Idle => {}
    }

    // Heat progress while the shrimp is on the wok
    if state.stage == Stage::Cooking
        && state.cook == CookStage::HeatingShrimp
        && state.heat.tick() == HeatTick::Done
    {
        state.set_cook(CookStage::ShrimpReady);
        state.trigger_feedback("Shrimp ready! Add the sauce!");
    }

    // Pending delayed stage transition (egg -> plating, plated -> final)
    if let Some(pending) = &mut state.stage_delay {
        pending.ticks = pending.ticks.saturating_sub(1);
        if pending.ticks == 0 {
            let to = pending.to;
            state.stage_delay = None;
            state.enter_stage(to);
        }
    }
}
