//! Discrete session actions and the transition function
//!
//! The drop targets forgive stray drags: any action whose guard fails is a
//! silent no-op. `apply` never errors and never mutates on an invalid
//! action, so every transition is total.

use serde::{Deserialize, Serialize};

use crate::consts::{FINISH_DELAY_TICKS, PLATE_DELAY_TICKS};

use super::state::{CookStage, SauceIngredient, SessionEvent, SessionState, Stage};

/// Draggable tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    Knife,
}

/// Intermediate products produced by earlier stations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Product {
    PreppedShrimp,
    MixedSauce,
}

/// Finishing ingredients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Garnish {
    Egg,
    Scallions,
}

/// Everything the player can pick up, as a closed union.
/// Unknown drops fall out of the match instead of out of a string compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragItem {
    Tool(Tool),
    Sauce(SauceIngredient),
    Product(Product),
    Garnish(Garnish),
}

impl DragItem {
    /// Stable token for the DOM DataTransfer boundary
    pub fn token(&self) -> &'static str {
        match self {
            DragItem::Tool(Tool::Knife) => "knife",
            DragItem::Sauce(SauceIngredient::Seasonings) => "seasonings",
            DragItem::Sauce(SauceIngredient::BlackBeans) => "black-beans",
            DragItem::Sauce(SauceIngredient::Garlic) => "garlic",
            DragItem::Sauce(SauceIngredient::Wine) => "wine",
            DragItem::Product(Product::PreppedShrimp) => "prepped-shrimp",
            DragItem::Product(Product::MixedSauce) => "mixed-sauce",
            DragItem::Garnish(Garnish::Egg) => "egg",
            DragItem::Garnish(Garnish::Scallions) => "scallions",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "knife" => Some(DragItem::Tool(Tool::Knife)),
            "seasonings" => Some(DragItem::Sauce(SauceIngredient::Seasonings)),
            "black-beans" => Some(DragItem::Sauce(SauceIngredient::BlackBeans)),
            "garlic" => Some(DragItem::Sauce(SauceIngredient::Garlic)),
            "wine" => Some(DragItem::Sauce(SauceIngredient::Wine)),
            "prepped-shrimp" => Some(DragItem::Product(Product::PreppedShrimp)),
            "mixed-sauce" => Some(DragItem::Product(Product::MixedSauce)),
            "egg" => Some(DragItem::Garnish(Garnish::Egg)),
            "scallions" => Some(DragItem::Garnish(Garnish::Scallions)),
            _ => None,
        }
    }
}

/// Where a drag can land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropZone {
    /// One of the prep board slots, left to right
    PrepSlot(u8),
    SauceBowl,
    Wok,
    Plate,
}

impl DropZone {
    /// Parse a zone token ("prep-3", "bowl", "wok", "plate")
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "bowl" => Some(DropZone::SauceBowl),
            "wok" => Some(DropZone::Wok),
            "plate" => Some(DropZone::Plate),
            _ => token
                .strip_prefix("prep-")
                .and_then(|i| i.parse().ok())
                .map(DropZone::PrepSlot),
        }
    }
}

/// A discrete player action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Restart,
    /// Move to the next station (gated on the current one being complete)
    Advance,
    Drop { item: DragItem, zone: DropZone },
}

/// Apply one action to the session. Guard failures leave the state
/// untouched.
pub fn apply(state: &mut SessionState, action: Action) {
    match action {
        Action::Start => {
            if state.stage == Stage::Menu {
                state.reset_run();
            }
        }
        Action::Restart => {
            if matches!(state.stage, Stage::Final | Stage::Lost) {
                state.reset_run();
            }
        }
        Action::Advance => advance(state),
        Action::Drop { item, zone } => drop_item(state, item, zone),
    }
}

fn advance(state: &mut SessionState) {
    match state.stage {
        Stage::Prep if state.prep_count >= state.tuning.required_prep => {
            state.enter_stage(Stage::Sauce);
        }
        Stage::Sauce if state.bowl.is_complete() => {
            state.enter_stage(Stage::Cooking);
        }
        _ => log::debug!("advance ignored in {}", state.stage.as_str()),
    }
}

fn drop_item(state: &mut SessionState, item: DragItem, zone: DropZone) {
    match (state.stage, zone, item) {
        // Devein the next shrimp; any other slot stays inert
        (Stage::Prep, DropZone::PrepSlot(i), DragItem::Tool(Tool::Knife))
            if i == state.prep_count && state.prep_count < state.tuning.required_prep =>
        {
            state.prep_count += 1;
            state.push_event(SessionEvent::PrepAdvanced { index: i });
            state.trigger_feedback("Deveined!");
        }

        (Stage::Sauce, DropZone::SauceBowl, DragItem::Sauce(ing))
            if !state.bowl.contains(ing) =>
        {
            state.bowl.add(ing);
            state.push_event(SessionEvent::SauceMixed(ing));
            state.trigger_feedback(format!("Added {}!", ing.label()));
        }

        (Stage::Cooking, DropZone::Wok, DragItem::Product(Product::PreppedShrimp))
            if state.cook == CookStage::Empty =>
        {
            state.set_cook(CookStage::HeatingShrimp);
            state.heat.arm();
            state.trigger_feedback("Cooking starts!");
        }

        (Stage::Cooking, DropZone::Wok, DragItem::Product(Product::MixedSauce))
            if state.cook == CookStage::ShrimpReady =>
        {
            state.set_cook(CookStage::SauceAdded);
            state.trigger_feedback("Sauce sizzle!");
        }

        (Stage::Cooking, DropZone::Wok, DragItem::Garnish(Garnish::Egg))
            if state.cook == CookStage::SauceAdded =>
        {
            state.set_cook(CookStage::Finished);
            let bonus = state.tuning.completion_bonus(state.time_remaining());
            state.award(bonus);
            state.trigger_feedback("The golden egg!");
            state.schedule_stage(Stage::Plating, FINISH_DELAY_TICKS);
        }

        (Stage::Plating, DropZone::Plate, DragItem::Garnish(Garnish::Scallions))
            if state.garnish_count() < state.tuning.required_garnish =>
        {
            state.sprinkle_garnish();
            state.trigger_feedback("Sprinkle!");
            if state.garnish_count() >= state.tuning.required_garnish {
                state.schedule_stage(Stage::Final, PLATE_DELAY_TICKS);
            }
        }

        (stage, zone, item) => {
            log::debug!(
                "ignored drop of {} on {:?} during {}",
                item.token(),
                zone,
                stage.as_str()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::tick;
    use crate::tuning::Tuning;

    fn session() -> SessionState {
        let mut state = SessionState::new(42, Tuning::default());
        apply(&mut state, Action::Start);
        state
    }

    fn knife_on(slot: u8) -> Action {
        Action::Drop {
            item: DragItem::Tool(Tool::Knife),
            zone: DropZone::PrepSlot(slot),
        }
    }

    fn to_sauce(state: &mut SessionState) {
        for i in 0..state.tuning.required_prep {
            apply(state, knife_on(i));
        }
        apply(state, Action::Advance);
    }

    fn to_cooking(state: &mut SessionState) {
        to_sauce(state);
        for ing in SauceIngredient::ALL {
            apply(
                state,
                Action::Drop {
                    item: DragItem::Sauce(ing),
                    zone: DropZone::SauceBowl,
                },
            );
        }
        apply(state, Action::Advance);
    }

    fn to_plating(state: &mut SessionState) {
        to_cooking(state);
        apply(
            state,
            Action::Drop {
                item: DragItem::Product(Product::PreppedShrimp),
                zone: DropZone::Wok,
            },
        );
        while state.cook == CookStage::HeatingShrimp {
            tick(state);
        }
        apply(
            state,
            Action::Drop {
                item: DragItem::Product(Product::MixedSauce),
                zone: DropZone::Wok,
            },
        );
        apply(
            state,
            Action::Drop {
                item: DragItem::Garnish(Garnish::Egg),
                zone: DropZone::Wok,
            },
        );
        while state.stage == Stage::Cooking {
            tick(state);
        }
    }

    #[test]
    fn test_start_only_from_menu() {
        let mut state = session();
        assert_eq!(state.stage, Stage::Prep);
        state.prep_count = 3;
        // Start mid-run is a no-op, not a reset
        apply(&mut state, Action::Start);
        assert_eq!(state.prep_count, 3);
    }

    #[test]
    fn test_prep_in_order() {
        let mut state = session();
        for i in 0..6 {
            apply(&mut state, knife_on(i));
        }
        assert_eq!(state.prep_count, 6);
        apply(&mut state, Action::Advance);
        assert_eq!(state.stage, Stage::Sauce);
    }

    #[test]
    fn test_prep_out_of_order_is_noop() {
        let mut state = session();
        apply(&mut state, knife_on(3));
        apply(&mut state, knife_on(3));
        apply(&mut state, knife_on(1));
        assert_eq!(state.prep_count, 0);
        assert!(state.feedback.is_none());
    }

    #[test]
    fn test_prep_wrong_item_is_noop() {
        let mut state = session();
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Garnish(Garnish::Scallions),
                zone: DropZone::PrepSlot(0),
            },
        );
        assert_eq!(state.prep_count, 0);
    }

    #[test]
    fn test_advance_gated_on_completion() {
        let mut state = session();
        apply(&mut state, Action::Advance);
        assert_eq!(state.stage, Stage::Prep);

        to_sauce(&mut state);
        assert_eq!(state.stage, Stage::Sauce);
        apply(&mut state, Action::Advance);
        assert_eq!(state.stage, Stage::Sauce);
    }

    #[test]
    fn test_sauce_duplicate_is_noop() {
        let mut state = session();
        to_sauce(&mut state);
        let beans = Action::Drop {
            item: DragItem::Sauce(SauceIngredient::BlackBeans),
            zone: DropZone::SauceBowl,
        };
        apply(&mut state, beans);
        apply(&mut state, beans);
        assert_eq!(state.bowl.len(), 1);
    }

    #[test]
    fn test_sauce_rejects_non_sauce_items() {
        let mut state = session();
        to_sauce(&mut state);
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Garnish(Garnish::Egg),
                zone: DropZone::SauceBowl,
            },
        );
        assert!(state.bowl.is_empty());
    }

    #[test]
    fn test_wok_sequence_cannot_skip() {
        let mut state = session();
        to_cooking(&mut state);
        assert_eq!(state.cook, CookStage::Empty);

        // Sauce and egg before the shrimp: inert
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Product(Product::MixedSauce),
                zone: DropZone::Wok,
            },
        );
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Garnish(Garnish::Egg),
                zone: DropZone::Wok,
            },
        );
        assert_eq!(state.cook, CookStage::Empty);

        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Product(Product::PreppedShrimp),
                zone: DropZone::Wok,
            },
        );
        assert_eq!(state.cook, CookStage::HeatingShrimp);
        while state.cook == CookStage::HeatingShrimp {
            tick(&mut state);
        }
        assert_eq!(state.cook, CookStage::ShrimpReady);

        // Egg while the sauce is missing: inert (guard needs SauceAdded)
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Garnish(Garnish::Egg),
                zone: DropZone::Wok,
            },
        );
        assert_eq!(state.cook, CookStage::ShrimpReady);
    }

    #[test]
    fn test_egg_awards_bonus_and_schedules_plating() {
        let mut state = session();
        to_cooking(&mut state);
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Product(Product::PreppedShrimp),
                zone: DropZone::Wok,
            },
        );
        while state.cook == CookStage::HeatingShrimp {
            tick(&mut state);
        }
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Product(Product::MixedSauce),
                zone: DropZone::Wok,
            },
        );
        assert_eq!(state.score, 0);
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Garnish(Garnish::Egg),
                zone: DropZone::Wok,
            },
        );
        assert_eq!(state.cook, CookStage::Finished);
        assert_eq!(state.score, 500);
        assert!(state.stage_delay.is_some());
    }

    #[test]
    fn test_plating_three_sprinkles_then_final() {
        let mut state = session();
        to_plating(&mut state);
        assert_eq!(state.stage, Stage::Plating);

        let sprinkle = Action::Drop {
            item: DragItem::Garnish(Garnish::Scallions),
            zone: DropZone::Plate,
        };
        for _ in 0..5 {
            apply(&mut state, sprinkle);
        }
        // Extra sprinkles past the target are inert
        assert_eq!(state.garnish_count(), 3);
        while state.stage == Stage::Plating {
            tick(&mut state);
        }
        assert_eq!(state.stage, Stage::Final);
    }

    #[test]
    fn test_restart_only_from_terminal_stages() {
        let mut state = session();
        to_sauce(&mut state);
        apply(&mut state, Action::Restart);
        assert_eq!(state.stage, Stage::Sauce);

        to_plating(&mut state);
        let sprinkle = Action::Drop {
            item: DragItem::Garnish(Garnish::Scallions),
            zone: DropZone::Plate,
        };
        for _ in 0..3 {
            apply(&mut state, sprinkle);
        }
        while state.stage == Stage::Plating {
            tick(&mut state);
        }
        apply(&mut state, Action::Restart);
        assert_eq!(state.stage, Stage::Prep);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_item_tokens_round_trip() {
        let items = [
            DragItem::Tool(Tool::Knife),
            DragItem::Sauce(SauceIngredient::Seasonings),
            DragItem::Sauce(SauceIngredient::BlackBeans),
            DragItem::Sauce(SauceIngredient::Garlic),
            DragItem::Sauce(SauceIngredient::Wine),
            DragItem::Product(Product::PreppedShrimp),
            DragItem::Product(Product::MixedSauce),
            DragItem::Garnish(Garnish::Egg),
            DragItem::Garnish(Garnish::Scallions),
        ];
        for item in items {
            assert_eq!(DragItem::from_token(item.token()), Some(item));
        }
        assert_eq!(DragItem::from_token("wok"), None);
        assert_eq!(DropZone::from_token("prep-4"), Some(DropZone::PrepSlot(4)));
        assert_eq!(DropZone::from_token("prep-x"), None);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn arb_item() -> impl Strategy<Value = DragItem> {
            prop_oneof![
                Just(DragItem::Tool(Tool::Knife)),
                prop_oneof![
                    Just(SauceIngredient::Seasonings),
                    Just(SauceIngredient::BlackBeans),
                    Just(SauceIngredient::Garlic),
                    Just(SauceIngredient::Wine),
                ]
                .prop_map(DragItem::Sauce),
                prop_oneof![Just(Product::PreppedShrimp), Just(Product::MixedSauce)]
                    .prop_map(DragItem::Product),
                prop_oneof![Just(Garnish::Egg), Just(Garnish::Scallions)]
                    .prop_map(DragItem::Garnish),
            ]
        }

        fn arb_zone() -> impl Strategy<Value = DropZone> {
            prop_oneof![
                (0u8..8).prop_map(DropZone::PrepSlot),
                Just(DropZone::SauceBowl),
                Just(DropZone::Wok),
                Just(DropZone::Plate),
            ]
        }

        fn arb_action() -> impl Strategy<Value = Action> {
            prop_oneof![
                Just(Action::Start),
                Just(Action::Restart),
                Just(Action::Advance),
                (arb_item(), arb_zone()).prop_map(|(item, zone)| Action::Drop { item, zone }),
            ]
        }

        proptest! {
            /// prep_count equals the number of drops that targeted the
            /// next slot at the time they landed, capped at the target
            #[test]
            fn prop_prep_order_enforced(slots in proptest::collection::vec(0u8..8, 0..40)) {
                let mut state = session();
                let mut expected = 0u8;
                for slot in slots {
                    apply(&mut state, knife_on(slot));
                    if slot == expected && expected < state.tuning.required_prep {
                        expected += 1;
                    }
                }
                prop_assert_eq!(state.prep_count, expected);
                prop_assert!(state.prep_count <= state.tuning.required_prep);
            }

            /// The bowl never holds duplicates no matter how drops repeat
            #[test]
            fn prop_bowl_no_duplicates(picks in proptest::collection::vec(0usize..4, 0..32)) {
                let mut state = session();
                to_sauce(&mut state);
                let mut distinct = [false; 4];
                for pick in picks {
                    distinct[pick] = true;
                    apply(&mut state, Action::Drop {
                        item: DragItem::Sauce(SauceIngredient::ALL[pick]),
                        zone: DropZone::SauceBowl,
                    });
                }
                let expected = distinct.iter().filter(|d| **d).count();
                prop_assert_eq!(state.bowl.len(), expected);
            }

            /// Across arbitrary action/tick interleavings: the score only
            /// grows (except resets to zero), the cook sub-state only moves
            /// forward (except resets to Empty), counters stay in range
            #[test]
            fn prop_invariants_hold_for_any_sequence(
                steps in proptest::collection::vec(
                    prop_oneof![arb_action().prop_map(Some), Just(None)],
                    0..300,
                )
            ) {
                let mut tuning = Tuning::default();
                tuning.time_limit_secs = Some(2);
                let mut state = SessionState::new(9, tuning);
                apply(&mut state, Action::Start);

                let mut prev_score = state.score;
                let mut prev_cook = state.cook;
                for step in steps {
                    match step {
                        Some(action) => apply(&mut state, action),
                        None => tick(&mut state),
                    }
                    prop_assert!(state.score >= prev_score || state.score == 0);
                    prop_assert!(state.cook >= prev_cook || state.cook == CookStage::Empty);
                    prop_assert!(state.prep_count <= state.tuning.required_prep);
                    prop_assert!(state.bowl.len() <= 4);
                    prop_assert!(state.cook_progress() <= 100);
                    prop_assert!(state.garnish_count() <= state.tuning.required_garnish);
                    prev_score = state.score;
                    prev_cook = state.cook;
                }
            }
        }
    }
}
