//! Astro Dodge entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, EventTarget, HtmlAudioElement, HtmlCanvasElement, HtmlElement};

    use astro_dodge::platform::browser::{BrowserScheduler, Dispatch};
    use astro_dodge::platform::{
        InputAction, TOUCH_BUTTONS, TimerId, TimerKind, action_for_key_down, action_for_key_up,
    };
    use astro_dodge::renderer::{CanvasRenderer, END_MESSAGE};
    use astro_dodge::sim::{Arena, GameEvent, GamePhase};
    use astro_dodge::{Game, Settings, Tuning};

    /// DOM text and visibility sinks
    struct Hud {
        document: Document,
    }

    impl Hud {
        fn set_text(&self, id: &str, text: &str) {
            match self.document.get_element_by_id(id) {
                Some(el) => el.set_text_content(Some(text)),
                None => log::warn!("HUD element #{} not found", id),
            }
        }

        fn set_display(&self, id: &str, display: &str) {
            let Some(el) = self
                .document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                log::warn!("HUD element #{} not found", id);
                return;
            };
            let _ = el.style().set_property("display", display);
        }

        fn show_phase(&self, phase: GamePhase) {
            let (intro, countdown, game_over) = match phase {
                GamePhase::Intro => ("flex", "none", "none"),
                GamePhase::Countdown => ("none", "flex", "none"),
                GamePhase::Playing => ("none", "none", "none"),
                GamePhase::GameOver => ("none", "none", "block"),
            };
            self.set_display("introMessage", intro);
            self.set_display("countdownMessage", countdown);
            self.set_display("gameOverMessage", game_over);
        }
    }

    /// Everything the browser callbacks share
    struct Shell {
        game: Game,
        sched: BrowserScheduler,
        renderer: CanvasRenderer,
        hud: Hud,
        settings: Settings,
    }

    impl Shell {
        fn boot(&mut self) {
            self.show_toggles();
            self.hud
                .set_text("lives", &format!("Vidas: {}", self.game.state.lives));
            self.hud
                .set_text("level", &format!("Nivel: {}", self.game.state.level));
            self.hud.show_phase(self.game.state.phase);
            self.game.boot(&mut self.sched);
            self.flush_events();
        }

        /// Frames are drawn from the state after the whole tick, so an object
        /// that hits the player is never shown overlapping it and the player
        /// appears at its moved position. Hits still use the pre-move position.
        fn on_timer(&mut self, id: TimerId, kind: TimerKind) {
            self.sched.reap();
            self.sched.fired(id);
            self.game.handle_timer(id, kind, &mut self.sched);
            if kind == TimerKind::Frame && self.game.is_running() {
                if let Err(e) = self.renderer.render(&self.game.state) {
                    log::warn!("Render error: {:?}", e);
                }
            }
            self.flush_events();
        }

        fn apply(&mut self, action: InputAction) {
            self.sched.reap();
            self.game.apply(action, &mut self.sched);
            self.flush_events();
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            if muted {
                if let Some(audio) = self.end_music() {
                    let _ = audio.pause();
                }
            }
            self.show_toggles();
            self.persist();
        }

        fn toggle_breathing(&mut self) {
            let breathing = self.settings.toggle_breathing();
            self.game.set_breathing(breathing);
            self.show_toggles();
            self.persist();
        }

        fn show_toggles(&self) {
            let yes_no = |on: bool| if on { "sí" } else { "no" };
            self.hud.set_text(
                "muteButton",
                &format!("Sonido: {}", yes_no(!self.settings.muted)),
            );
            self.hud.set_text(
                "breathingButton",
                &format!("Respirar: {}", yes_no(self.settings.effective_breathing())),
            );
        }

        fn persist(&self) {
            if let Err(e) = self.settings.save() {
                log::warn!("Settings not saved: {e}");
            }
        }

        fn end_music(&self) -> Option<HtmlAudioElement> {
            self.hud
                .document
                .get_element_by_id("endMusic")
                .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok())
        }

        fn resize(&mut self, width: f64, height: f64) {
            self.renderer.resize(width as u32, height as u32);
            self.game.resize(width as f32, height as f32);
        }

        fn flush_events(&mut self) {
            for event in self.game.drain_events() {
                match event {
                    GameEvent::LivesChanged(lives) => {
                        self.hud.set_text("lives", &format!("Vidas: {}", lives));
                    }
                    GameEvent::LevelChanged(level) => {
                        self.hud.set_text("level", &format!("Nivel: {}", level));
                    }
                    GameEvent::PhaseChanged(phase) => {
                        if phase == GamePhase::Countdown || phase == GamePhase::Intro {
                            self.renderer.clear();
                        }
                        self.hud.show_phase(phase);
                    }
                    GameEvent::CountdownChanged(value) => {
                        self.hud.set_text("countdown", &value.to_string());
                    }
                    GameEvent::Paused | GameEvent::Resumed => {}
                    GameEvent::GameOver { end_screen, .. } => {
                        self.hud.set_display("gameOverMessage", "block");
                        if end_screen {
                            self.show_end_screen();
                        }
                    }
                }
            }
        }

        fn show_end_screen(&self) {
            if let Err(e) = self.renderer.end_screen(END_MESSAGE) {
                log::warn!("End screen error: {:?}", e);
            }

            let volume = self.settings.effective_music_volume();
            if volume <= 0.0 {
                return;
            }
            match self.end_music() {
                Some(audio) => {
                    audio.set_volume(volume);
                    if let Err(e) = audio.play() {
                        log::warn!("End music failed: {:?}", e);
                    }
                }
                None => log::warn!("No #endMusic audio element"),
            }
        }
    }

    fn listen(
        target: &EventTarget,
        event: &str,
        shell: &Rc<RefCell<Shell>>,
        action: InputAction,
    ) -> Result<(), JsValue> {
        let shell = shell.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            shell.borrow_mut().apply(action);
        });
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn element(document: &Document, id: &str) -> Result<EventTarget, JsValue> {
        document
            .get_element_by_id(id)
            .map(EventTarget::from)
            .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Astro Dodge starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let width = window.inner_width()?.as_f64().unwrap_or(800.0);
        let height = window.inner_height()?.as_f64().unwrap_or(600.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let settings = Settings::load();
        let tuning = Tuning::load();
        let renderer = CanvasRenderer::new(&document, canvas)?;
        let seed = js_sys::Date::now() as u64;

        let shell = Rc::new_cyclic(|weak: &Weak<RefCell<Shell>>| {
            let weak = weak.clone();
            let dispatch: Dispatch = Rc::new(move |id, kind| {
                if let Some(shell) = weak.upgrade() {
                    shell.borrow_mut().on_timer(id, kind);
                }
            });
            let mut game = Game::new(seed, Arena::new(width as f32, height as f32), tuning);
            game.set_breathing(settings.effective_breathing());
            RefCell::new(Shell {
                game,
                sched: BrowserScheduler::new(window.clone(), dispatch),
                renderer,
                hud: Hud {
                    document: document.clone(),
                },
                settings,
            })
        });

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&document, &shell)?;
        setup_buttons(&document, &shell)?;
        setup_resize(&shell)?;
        setup_auto_pause(&document, &shell)?;

        shell.borrow_mut().boot();

        log::info!("Astro Dodge running!");
        Ok(())
    }

    fn setup_input_handlers(document: &Document, shell: &Rc<RefCell<Shell>>) -> Result<(), JsValue> {
        // Keyboard
        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if let Some(action) = action_for_key_down(&event.key()) {
                    shell.borrow_mut().apply(action);
                }
            });
            document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if let Some(action) = action_for_key_up(&event.key()) {
                    shell.borrow_mut().apply(action);
                }
            });
            document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch buttons: press moves, release stops both axes
        for (id, direction) in TOUCH_BUTTONS {
            let button = element(document, id)?;
            listen(&button, "touchstart", shell, InputAction::Move(direction))?;
            listen(&button, "touchend", shell, InputAction::Stop)?;
        }
        Ok(())
    }

    fn setup_buttons(document: &Document, shell: &Rc<RefCell<Shell>>) -> Result<(), JsValue> {
        listen(&element(document, "pauseButton")?, "click", shell, InputAction::Pause)?;
        listen(&element(document, "resumeButton")?, "click", shell, InputAction::Resume)?;
        listen(&element(document, "retryButton")?, "click", shell, InputAction::Retry)?;

        let toggles: [(&str, fn(&mut Shell)); 2] = [
            ("muteButton", Shell::toggle_mute),
            ("breathingButton", Shell::toggle_breathing),
        ];
        for (id, toggle) in toggles {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                toggle(&mut *shell.borrow_mut());
            });
            element(document, id)?
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_resize(shell: &Rc<RefCell<Shell>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let shell = shell.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let w = window.inner_width().ok().and_then(|v| v.as_f64());
            let h = window.inner_height().ok().and_then(|v| v.as_f64());
            if let (Some(w), Some(h)) = (w, h) {
                shell.borrow_mut().resize(w, h);
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_auto_pause(document: &Document, shell: &Rc<RefCell<Shell>>) -> Result<(), JsValue> {
        let shell = shell.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() != web_sys::VisibilityState::Hidden {
                return;
            }
            let mut s = shell.borrow_mut();
            if s.settings.pause_on_hide && s.game.is_running() {
                s.apply(InputAction::Pause);
                log::info!("Auto-paused (tab hidden)");
            }
        });
        document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        )?;
        closure.forget();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().inspect_err(|e| log::error!("Startup failed: {:?}", e))
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use astro_dodge::platform::{InputAction, VirtualClock};
    use astro_dodge::sim::{Arena, Direction, GameEvent, GameState};
    use astro_dodge::{Game, Settings, Tuning};

    /// How often the bot re-decides
    const DECISION_MS: f64 = 100.0;
    /// Give up after half an hour of game time
    const LIMIT_MS: f64 = 30.0 * 60.0 * 1000.0;

    /// Steer away from the nearest object that is above the player and
    /// overlaps it horizontally
    fn dodge(state: &GameState) -> InputAction {
        let player = state.player.bounds();
        let threat = state
            .objects
            .iter()
            .filter(|o| o.pos.y < player.max().y)
            .filter(|o| o.pos.x < player.max().x && o.pos.x + state.object_size.x > player.min.x)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

        let Some(threat) = threat else {
            return InputAction::Stop;
        };
        let room_left = threat.pos.x;
        let room_right = state.arena.width - (threat.pos.x + state.object_size.x);
        if room_left > room_right {
            InputAction::Move(Direction::Left)
        } else {
            InputAction::Move(Direction::Right)
        }
    }

    pub fn run(tuning: Tuning, seed: u64) {
        let mut clock = VirtualClock::new();
        let mut game = Game::new(seed, Arena::new(1280.0, 720.0), tuning);
        game.set_breathing(Settings::load().effective_breathing());
        log::info!(
            "Headless run: {} lives, levels up to {}, a level every {:.0}s",
            game.tuning().initial_lives,
            game.tuning().max_level,
            game.tuning().level_up_interval_ms / 1000.0
        );
        game.boot(&mut clock);

        while !game.state.game_over && clock.now_ms() < LIMIT_MS {
            let action = dodge(&game.state);
            game.apply(action, &mut clock);
            game.run_for(&mut clock, DECISION_MS);
            for event in game.drain_events() {
                match event {
                    GameEvent::LevelChanged(level) => {
                        log::info!("{:>8.1}s level {}", clock.now_ms() / 1000.0, level);
                    }
                    GameEvent::GameOver { level, end_screen } => {
                        log::info!(
                            "{:>8.1}s game over on level {}{}",
                            clock.now_ms() / 1000.0,
                            level,
                            if end_screen { " - end screen" } else { "" }
                        );
                    }
                    _ => {}
                }
            }
        }

        println!(
            "Session ended after {:.1}s: level {}, lives {}, {} frames",
            clock.now_ms() / 1000.0,
            game.state.level,
            game.state.lives,
            game.state.time_ticks
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use astro_dodge::Tuning;

    env_logger::init();
    log::info!("Astro Dodge (native) starting...");
    log::info!("The playable build is the web version - run with `trunk serve`");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match Tuning::load_from_file(&path) {
            Ok(tuning) => {
                for warning in tuning.validate() {
                    log::warn!("tuning: {warning}");
                }
                tuning
            }
            Err(e) => {
                log::warn!("{e}; using default tuning");
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    headless::run(tuning, 2024);
}
