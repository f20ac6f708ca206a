//! Kitchen Lab entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, DragEvent, Element, MouseEvent};

    use kitchen_lab::consts::*;
    use kitchen_lab::sim::{
        Action, CookStage, DragItem, DropZone, SessionEvent, SessionState, Stage, apply, tick,
    };
    use kitchen_lab::{HighScores, Settings, Tuning, format_clock};

    /// Game instance holding all state
    struct Game {
        state: SessionState,
        settings: Settings,
        highscores: HighScores,
        accumulator: f32,
        last_time: f64,
        /// Actions queued by DOM handlers, applied once per frame
        queued: Vec<Action>,
        /// Item picked up by the in-flight drag
        dragged: Option<DragItem>,
    }

    impl Game {
        fn new(seed: u64, settings: Settings, highscores: HighScores) -> Self {
            let tuning = Tuning::for_preset(settings.difficulty);
            Self {
                state: SessionState::new(seed, tuning),
                settings,
                highscores,
                accumulator: 0.0,
                last_time: 0.0,
                queued: Vec::new(),
                dragged: None,
            }
        }

        fn queue(&mut self, action: Action) {
            self.queued.push(action);
        }

        /// Apply queued actions, then run fixed-timestep sim ticks
        fn update(&mut self, time: f64) {
            let dt = (((time - self.last_time) / 1000.0) as f32).min(0.1);
            self.last_time = time;

            for action in self.queued.drain(..) {
                apply(&mut self.state, action);
            }

            self.accumulator += dt;
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            self.handle_events();
        }

        /// React to session events
        fn handle_events(&mut self) {
            for event in self.state.drain_events() {
                if let SessionEvent::SessionComplete { score } = event {
                    let secs_left = self.state.time_remaining().unwrap_or(0);
                    if let Some(rank) = self.highscores.add_score(
                        score,
                        self.settings.difficulty,
                        secs_left,
                        js_sys::Date::now(),
                    ) {
                        log::info!("New high score: {} (rank {})", score, rank);
                        self.highscores.save();
                    }
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();
            let state = &self.state;

            // Score
            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&state.score.to_string()));
            }

            // Countdown clock
            if let Some(el) = document.get_element_by_id("hud-clock") {
                match (self.settings.effective_show_timer(), state.time_remaining()) {
                    (true, Some(secs)) if state.is_active() => {
                        let _ = el.set_attribute("class", "hud-item");
                        if let Some(value) =
                            document.query_selector("#hud-clock .hud-value").ok().flatten()
                        {
                            value.set_text_content(Some(&format_clock(secs)));
                        }
                    }
                    _ => {
                        let _ = el.set_attribute("class", "hud-item hidden");
                    }
                }
            }

            // Station panels: exactly one visible
            for stage in ["menu", "prep", "sauce", "cooking", "plating", "final", "lost"] {
                if let Some(el) = document.get_element_by_id(&format!("panel-{stage}")) {
                    let class = if state.stage.as_str() == stage {
                        "panel"
                    } else {
                        "panel hidden"
                    };
                    let _ = el.set_attribute("class", class);
                }
            }

            // Prep board: done slots dim, the next one glows
            if let Ok(slots) = document.query_selector_all("[data-zone^='prep-']") {
                for i in 0..slots.length() {
                    let Some(el) = slots.item(i).and_then(|n| n.dyn_into::<Element>().ok())
                    else {
                        continue;
                    };
                    let index = el
                        .get_attribute("data-zone")
                        .as_deref()
                        .and_then(DropZone::from_token);
                    let class = match index {
                        Some(DropZone::PrepSlot(i)) if i < state.prep_count => "prep-slot done",
                        Some(DropZone::PrepSlot(i)) if i == state.prep_count => "prep-slot active",
                        _ => "prep-slot",
                    };
                    let _ = el.set_attribute("class", class);
                }
            }

            // Bowl fill grows with each ingredient
            if let Some(el) = document.get_element_by_id("bowl-fill") {
                let pct = state.bowl.len() * 25;
                let _ = el.set_attribute("style", &format!("width:{pct}%;height:{pct}%"));
            }

            // Sauce shelf: added ingredients gray out
            if let Ok(items) = document.query_selector_all("#panel-sauce [data-item]") {
                for i in 0..items.length() {
                    let Some(el) = items.item(i).and_then(|n| n.dyn_into::<Element>().ok())
                    else {
                        continue;
                    };
                    let added = el
                        .get_attribute("data-item")
                        .as_deref()
                        .and_then(DragItem::from_token)
                        .is_some_and(|item| match item {
                            DragItem::Sauce(ing) => state.bowl.contains(ing),
                            _ => false,
                        });
                    let class = if added {
                        "shelf-item spent"
                    } else {
                        "shelf-item"
                    };
                    let _ = el.set_attribute("class", class);
                }
            }

            // Heat progress bar
            if let Some(el) = document.get_element_by_id("heat-bar") {
                let _ = el.set_attribute("style", &format!("width:{}%", state.cook_progress()));
            }

            // Wok contents follow the cook sub-state
            if let Some(el) = document.get_element_by_id("wok") {
                let class = match state.cook {
                    CookStage::Empty => "wok",
                    CookStage::HeatingShrimp => "wok heating",
                    CookStage::ShrimpReady => "wok ready",
                    CookStage::SauceAdded => "wok sauced",
                    CookStage::Finished => "wok finished",
                };
                let _ = el.set_attribute("class", class);
            }

            // Cooking dock: only the item for the current step is offered
            for (id, visible) in [
                ("dock-shrimp", state.cook == CookStage::Empty),
                ("dock-sauce", state.cook == CookStage::ShrimpReady),
                ("dock-egg", state.cook == CookStage::SauceAdded),
            ] {
                if let Some(el) = document.get_element_by_id(id) {
                    let class = if visible { "dock-item" } else { "dock-item hidden" };
                    let _ = el.set_attribute("class", class);
                }
            }

            // Garnish scatter on the plate
            for (i, spot) in state.garnish_spots.iter().enumerate() {
                if let Some(el) = document.get_element_by_id(&format!("garnish-{i}")) {
                    let _ = el.set_attribute(
                        "style",
                        &format!(
                            "top:{}%;left:{}%;transform:rotate({}deg)",
                            spot.y_pct, spot.x_pct, spot.rot_deg
                        ),
                    );
                    let _ = el.set_attribute("class", "garnish");
                }
            }

            // Order ticket checklist
            for (id, done) in [
                ("ticket-prep", state.prep_count >= state.tuning.required_prep),
                ("ticket-sauce", state.bowl.is_complete()),
                ("ticket-wok", state.cook == CookStage::Finished),
                (
                    "ticket-garnish",
                    state.garnish_count() >= state.tuning.required_garnish,
                ),
            ] {
                if let Some(el) = document.get_element_by_id(id) {
                    let class = if done { "ticket-line done" } else { "ticket-line" };
                    let _ = el.set_attribute("class", class);
                }
            }

            // Feedback popup
            if let Some(el) = document.get_element_by_id("feedback") {
                match &state.feedback {
                    Some(feedback) => {
                        el.set_text_content(Some(&feedback.text));
                        let class = if self.settings.reduced_motion {
                            "feedback"
                        } else {
                            "feedback bounce"
                        };
                        let _ = el.set_attribute("class", class);
                    }
                    None => {
                        let _ = el.set_attribute("class", "feedback hidden");
                    }
                }
            }

            // Advance button appears when the station is complete
            if let Some(el) = document.get_element_by_id("advance-btn") {
                let show = match state.stage {
                    Stage::Prep => state.prep_count >= state.tuning.required_prep,
                    Stage::Sauce => state.bowl.is_complete(),
                    _ => false,
                };
                let class = if show { "next-btn" } else { "next-btn hidden" };
                let _ = el.set_attribute("class", class);
            }

            // Final screen stats
            if let Some(el) = document.get_element_by_id("final-score") {
                el.set_text_content(Some(&state.score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("final-best") {
                let best = self.highscores.top_score().unwrap_or(0);
                el.set_text_content(Some(&best.to_string()));
            }
        }
    }

    fn setup_drag_sources(game: Rc<RefCell<Game>>, document: &Document) {
        let Ok(sources) = document.query_selector_all("[data-item]") else {
            return;
        };
        for i in 0..sources.length() {
            let Some(el) = sources.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let token = el.get_attribute("data-item").unwrap_or_default();
            let game = game.clone();
            let closure = Closure::<dyn FnMut(DragEvent)>::new(move |event: DragEvent| {
                let Some(item) = DragItem::from_token(&token) else {
                    return;
                };
                // Some browsers need a payload for the drag to be valid
                if let Some(dt) = event.data_transfer() {
                    let _ = dt.set_data("text/plain", item.token());
                }
                game.borrow_mut().dragged = Some(item);
            });
            let _ =
                el.add_event_listener_with_callback("dragstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_drop_zones(game: Rc<RefCell<Game>>, document: &Document) {
        let Ok(zones) = document.query_selector_all("[data-zone]") else {
            return;
        };
        for i in 0..zones.length() {
            let Some(el) = zones.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let token = el.get_attribute("data-zone").unwrap_or_default();

            // dragover must be cancelled or the drop never fires
            {
                let closure = Closure::<dyn FnMut(DragEvent)>::new(move |event: DragEvent| {
                    event.prevent_default();
                });
                let _ = el
                    .add_event_listener_with_callback("dragover", closure.as_ref().unchecked_ref());
                closure.forget();
            }

            {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(DragEvent)>::new(move |event: DragEvent| {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    let item = g.dragged.take().or_else(|| {
                        event
                            .data_transfer()
                            .and_then(|dt| dt.get_data("text/plain").ok())
                            .as_deref()
                            .and_then(DragItem::from_token)
                    });
                    if let (Some(item), Some(zone)) = (item, DropZone::from_token(&token)) {
                        g.queue(Action::Drop { item, zone });
                    }
                });
                let _ =
                    el.add_event_listener_with_callback("drop", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>, document: &Document) {
        let buttons = [
            ("start-btn", Action::Start),
            ("advance-btn", Action::Advance),
            ("restart-btn", Action::Restart),
            ("retry-btn", Action::Restart),
        ];
        for (id, action) in buttons {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
                game.borrow_mut().queue(action);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(closure: &Closure<dyn FnMut(f64)>) {
        web_sys::window()
            .expect("no window")
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .expect("requestAnimationFrame failed");
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Kitchen Lab starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let settings = Settings::load();
        let highscores = HighScores::load();
        let seed = js_sys::Date::now() as u64;
        log::info!(
            "Session seed: {} (difficulty {})",
            seed,
            settings.difficulty.as_str()
        );

        let game = Rc::new(RefCell::new(Game::new(seed, settings, highscores)));

        setup_drag_sources(game.clone(), &document);
        setup_drop_zones(game.clone(), &document);
        setup_buttons(game.clone(), &document);

        // requestAnimationFrame loop
        let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let g = f.clone();
        let loop_game = game.clone();
        *g.borrow_mut() = Some(Closure::new(move |time: f64| {
            {
                let mut game = loop_game.borrow_mut();
                if game.last_time == 0.0 {
                    game.last_time = time;
                }
                game.update(time);
                game.update_hud();
            }
            request_animation_frame(f.borrow().as_ref().unwrap());
        }));
        request_animation_frame(g.borrow().as_ref().unwrap());
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Kitchen Lab (native) starting...");
    log::info!("Native mode runs a scripted demo; serve the web build for the real game");

    demo_playthrough();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive a full session through every station and dump the final state
#[cfg(not(target_arch = "wasm32"))]
fn demo_playthrough() {
    use kitchen_lab::sim::{
        Action, CookStage, DragItem, DropZone, Garnish, Product, SauceIngredient, SessionState,
        Stage, Tool, apply,
    };
    use kitchen_lab::{Settings, Tuning};

    let settings = Settings::load();
    let mut state = SessionState::new(0xC0C0A, Tuning::for_preset(settings.difficulty));
    apply(&mut state, Action::Start);

    for i in 0..state.tuning.required_prep {
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Tool(Tool::Knife),
                zone: DropZone::PrepSlot(i),
            },
        );
    }
    apply(&mut state, Action::Advance);

    for ing in SauceIngredient::ALL {
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Sauce(ing),
                zone: DropZone::SauceBowl,
            },
        );
    }
    apply(&mut state, Action::Advance);

    apply(
        &mut state,
        Action::Drop {
            item: DragItem::Product(Product::PreppedShrimp),
            zone: DropZone::Wok,
        },
    );
    run_until(&mut state, |s| s.cook != CookStage::HeatingShrimp);
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
    run_until(&mut state, |s| s.stage != Stage::Cooking);

    for _ in 0..state.tuning.required_garnish {
        apply(
            &mut state,
            Action::Drop {
                item: DragItem::Garnish(Garnish::Scallions),
                zone: DropZone::Plate,
            },
        );
    }
    run_until(&mut state, |s| s.stage != Stage::Plating);

    log::info!(
        "demo finished: stage={} score={}",
        state.stage.as_str(),
        state.score
    );
    match serde_json::to_string_pretty(&state) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("failed to serialize final state: {e}"),
    }
}

/// Tick until `done` holds, with a stall guard
#[cfg(not(target_arch = "wasm32"))]
fn run_until(
    state: &mut kitchen_lab::sim::SessionState,
    done: impl Fn(&kitchen_lab::sim::SessionState) -> bool,
) {
    use kitchen_lab::sim::tick;
    for _ in 0..100_000 {
        if done(state) {
            return;
        }
        tick(state);
    }
    log::warn!("demo stalled waiting for a transition");
}
