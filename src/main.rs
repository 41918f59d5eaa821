//! Snowfall Dodge entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        AddEventListenerOptions, Document, Event, EventTarget, HtmlCanvasElement, KeyboardEvent,
        MouseEvent, TouchEvent,
    };

    use snowfall_dodge::achievements::AchievementTracker;
    use snowfall_dodge::audio::AudioManager;
    use snowfall_dodge::hud::{HudSnapshot, format_number, format_time};
    use snowfall_dodge::persistence;
    use snowfall_dodge::platform::{InputState, Key, Viewport, is_mobile_user_agent};
    use snowfall_dodge::renderer::{CanvasSurface, Scene};
    use snowfall_dodge::services::Services;
    use snowfall_dodge::sim::GamePhase;
    use snowfall_dodge::{Leaderboard, Session, Settings};

    /// Wait before looking for the canvas again
    const INIT_RETRY_MS: i32 = 100;

    struct Game {
        session: Session,
        scene: Scene,
        surface: CanvasSurface,
        input: InputState,
        viewport: Viewport,
        audio: AudioManager,
        mobile: bool,
        last_time: f64,
        last_phase: GamePhase,
        last_hud: Option<HudSnapshot>,
    }

    impl Game {
        /// Run one frame: simulate, draw, sync the DOM
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            let input = self.input.take_frame();
            self.session.frame(&input, dt, js_sys::Date::now());

            let seconds = (time / 1000.0) as f32;
            self.scene
                .draw(&mut self.surface, &self.session.state, seconds);

            self.update_hud();
            let phase = self.session.phase();
            if phase != self.last_phase {
                self.on_phase_change(phase);
                self.last_phase = phase;
            }
        }

        fn resize(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let size = Vec2::new(
                window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
                window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
            );
            let viewport = Viewport::fit(size, self.mobile);
            if !viewport.is_usable() {
                log::warn!("Ignoring resize to {}x{}", size.x, size.y);
                return;
            }
            self.viewport = viewport;
            self.surface.resize(viewport.canvas, viewport.css);
            self.session.resize(viewport.canvas);
            log::debug!("Canvas resized to {}x{}", viewport.canvas.x, viewport.canvas.y);
        }

        /// Pause when the page loses focus
        fn auto_pause(&mut self, reason: &str) {
            self.input.release_all();
            if self.session.phase() == GamePhase::Playing {
                self.input.request_pause();
                log::info!("Auto-paused ({})", reason);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let wallet = self.session.wallet();
            let snapshot = HudSnapshot::from_state(&self.session.state, wallet.coins(), wallet.stars());
            if self.last_hud.as_ref() == Some(&snapshot) {
                return;
            }
            let Some(document) = document() else {
                return;
            };

            set_text(&document, "hud-score", &snapshot.score);
            set_text(&document, "hud-level", &snapshot.level.to_string());
            set_text(&document, "hud-coins", &snapshot.coins);
            set_text(&document, "hud-stars", &snapshot.stars);
            set_text(&document, "hud-time", &snapshot.time);

            if let Some(el) = document.get_element_by_id("hud-combo") {
                el.set_text_content(Some(&snapshot.combo));
                let _ = el.set_attribute("style", &snapshot.combo_tier.style());
            }

            if let Some(el) = document.get_element_by_id("hud-powerups") {
                let bars: String = snapshot
                    .power_ups
                    .iter()
                    .map(|bar| {
                        format!(
                            "<div class=\"powerup-bar\"><span style=\"width:{};background:{}\"></span></div>",
                            bar.width_percent(),
                            bar.color()
                        )
                    })
                    .collect();
                el.set_inner_html(&bars);
            }

            self.last_hud = Some(snapshot);
        }

        /// Show or hide overlays when the phase changes
        fn on_phase_change(&mut self, phase: GamePhase) {
            let Some(document) = document() else {
                return;
            };
            set_visible(&document, "menu", phase == GamePhase::Menu);
            set_visible(&document, "pause-menu", phase == GamePhase::Paused);
            set_visible(&document, "game-over", phase == GamePhase::GameOver);
            set_visible(&document, "hud", phase != GamePhase::Menu);

            if phase != GamePhase::GameOver {
                return;
            }
            if let Some(result) = self.session.last_result() {
                set_text(&document, "final-score", &format_number(result.summary.score));
                set_text(&document, "final-time", &format_time(result.summary.duration_secs));
                let rank = result.rank.map(|r| format!("#{}", r)).unwrap_or_else(|| "-".to_string());
                set_text(&document, "final-rank", &rank);
            }
            let unlocked: String = self
                .session
                .take_unlocked()
                .iter()
                .map(|a| format!("<li>{} {}</li>", a.icon(), a.name()))
                .collect();
            if let Some(el) = document.get_element_by_id("final-achievements") {
                el.set_inner_html(&unlocked);
            }
            set_visible(&document, "final-achievements", !unlocked.is_empty());
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    /// Attach an event listener for the page lifetime
    fn listen(target: &EventTarget, name: &str, handler: impl FnMut(Event) + 'static) {
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Same as [`listen`] but allows `preventDefault` on touch events
    fn listen_active(target: &EventTarget, name: &str, handler: impl FnMut(Event) + 'static) {
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            name,
            closure.as_ref().unchecked_ref(),
            &options,
        );
        closure.forget();
    }

    /// First changed touch relative to the canvas' top-left (CSS px)
    fn touch_point(event: &TouchEvent, canvas: &HtmlCanvasElement) -> Option<Vec2> {
        let touch = event.changed_touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some(Vec2::new(
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        ))
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Snowfall Dodge starting...");
        start();
    }

    /// Look up the canvas and start the loop, retrying until the DOM is ready
    fn start() {
        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let canvas = document()
            .and_then(|d| d.get_element_by_id("gameCanvas"))
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());
        let surface = canvas.map(CanvasSurface::new);

        let surface = match surface {
            Some(Ok(surface)) => surface,
            other => {
                if let Some(Err(e)) = other {
                    log::error!("Canvas 2D context unavailable: {:?}", e);
                } else {
                    log::error!("Canvas not found, retrying");
                }
                let retry = Closure::once(start);
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    retry.as_ref().unchecked_ref(),
                    INIT_RETRY_MS,
                );
                retry.forget();
                return;
            }
        };

        let mobile = window
            .navigator()
            .user_agent()
            .map(|ua| is_mobile_user_agent(&ua))
            .unwrap_or(false);

        let storage = persistence::open();
        let settings = Settings::load(&*storage);

        let mut audio = AudioManager::new();
        audio.set_enabled(settings.sfx_enabled);
        audio.set_sfx_volume(settings.effective_sfx_volume());

        let services = Services::none()
            .with_achievements(AchievementTracker::load(storage.clone()))
            .with_leaderboard(Leaderboard::load(storage.clone()))
            .with_sound(audio.clone());

        let seed = js_sys::Date::now() as u64;
        let viewport = Viewport::fit(Vec2::new(500.0, 800.0), false);
        let mut session = Session::new(seed, viewport.canvas, storage, services);
        session.apply_settings(&settings);

        let mut scene = Scene::new();
        scene.select(&settings.skin, &settings.theme);

        let game = Rc::new(RefCell::new(Game {
            session,
            scene,
            surface,
            input: InputState::new(mobile),
            viewport,
            audio,
            mobile,
            last_time: 0.0,
            last_phase: GamePhase::Menu,
            last_hud: None,
        }));
        game.borrow_mut().resize();

        log::info!("Game initialized with seed: {} (mobile: {})", seed, mobile);

        if let Some(document) = document() {
            set_visible(&document, "loading", false);
            set_visible(&document, "menu", true);
            set_visible(&document, "hud", false);
        }

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_lifecycle(game.clone());

        request_animation_frame(game);
        log::info!("Snowfall Dodge running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = game.borrow().surface.element().clone();

        // Keyboard
        {
            let game = game.clone();
            listen(&window, "keydown", move |event: Event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let Some(key) = Key::from_dom(&event.key()) else {
                    return;
                };
                event.prevent_default();
                if event.repeat() && matches!(key, Key::Pause | Key::Start) {
                    return;
                }
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.key_down(key);
            });
        }
        {
            let game = game.clone();
            listen(&window, "keyup", move |event: Event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if let Some(key) = Key::from_dom(&event.key()) {
                    game.borrow_mut().input.key_up(key);
                }
            });
        }

        // Mouse click - tap to move
        {
            let game = game.clone();
            listen(&canvas, "click", move |event: Event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let mut g = game.borrow_mut();
                g.audio.resume();
                let point = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                let viewport = g.viewport;
                g.input.click(point, &viewport);
            });
        }

        // Touch: drag to steer, quick still touch to tap
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            listen_active(&canvas, "touchstart", move |event: Event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                if let Some(point) = touch_point(event, &canvas_clone) {
                    let mut g = game.borrow_mut();
                    g.audio.resume();
                    g.input.touch_start(point, js_sys::Date::now());
                }
            });
        }
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            listen_active(&canvas, "touchmove", move |event: Event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                if let Some(point) = touch_point(event, &canvas_clone) {
                    let mut g = game.borrow_mut();
                    let viewport = g.viewport;
                    g.input.touch_move(point, &viewport);
                }
            });
        }
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            listen_active(&canvas, "touchend", move |event: Event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                if let Some(point) = touch_point(event, &canvas_clone) {
                    let mut g = game.borrow_mut();
                    let viewport = g.viewport;
                    g.input.touch_end(point, js_sys::Date::now(), &viewport);
                }
            });
        }
        {
            let game = game.clone();
            listen(&canvas, "touchcancel", move |_event: Event| {
                game.borrow_mut().input.touch_cancel();
            });
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };

        // On-screen direction buttons, held while pressed
        for (id, key) in [("leftBtn", Key::Left), ("rightBtn", Key::Right)] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            for (name, held) in [
                ("pointerdown", true),
                ("pointerup", false),
                ("pointerleave", false),
                ("pointercancel", false),
            ] {
                let game = game.clone();
                listen(&btn, name, move |event: Event| {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    if held {
                        g.audio.resume();
                    }
                    g.input.set_button(key, held);
                });
            }
        }

        for id in ["start-btn", "restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                listen(&btn, "click", move |_event: Event| {
                    let mut g = game.borrow_mut();
                    g.audio.resume();
                    g.input.request_start();
                });
            }
        }

        for id in ["pause-btn", "resume-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                listen(&btn, "click", move |_event: Event| {
                    game.borrow_mut().input.request_pause();
                });
            }
        }
    }

    fn setup_lifecycle(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            listen(&document, "visibilitychange", move |_event: Event| {
                if document_clone.hidden() {
                    let mut g = game.borrow_mut();
                    g.auto_pause("tab hidden");
                    g.session.teardown();
                }
            });
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            listen(&window, "blur", move |_event: Event| {
                game.borrow_mut().auto_pause("window blur");
            });
        }

        {
            let game = game.clone();
            listen(&window, "resize", move |_event: Event| {
                game.borrow_mut().resize();
            });
        }

        for name in ["pagehide", "beforeunload"] {
            let game = game.clone();
            listen(&window, name, move |_event: Event| {
                game.borrow_mut().session.teardown();
                log::info!("Progress flushed ({})", name);
            });
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Snowfall Dodge (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    headless_demo(seed);
}

/// Play one run with a simple weaving bot and log the result
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo(seed: u64) {
    use snowfall_dodge::achievements::AchievementTracker;
    use snowfall_dodge::persistence;
    use snowfall_dodge::services::Services;
    use snowfall_dodge::sim::{GamePhase, GameState, TickInput};
    use snowfall_dodge::{Leaderboard, Session};

    const DT: f32 = 1.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 600;

    let storage = persistence::open();
    let services = Services::none()
        .with_achievements(AchievementTracker::load(storage.clone()))
        .with_leaderboard(Leaderboard::load(storage.clone()));
    let mut session = Session::new(seed, GameState::default_canvas(), storage, services);

    let mut now_ms = 0.0;
    session.frame(
        &TickInput {
            start: true,
            ..Default::default()
        },
        DT,
        now_ms,
    );

    let mut frames = 0;
    while session.phase() == GamePhase::Playing && frames < MAX_FRAMES {
        // Sweep back and forth across the field every four seconds
        let phase = (frames / 120) % 2 == 0;
        let input = TickInput {
            left: phase,
            right: !phase,
            ..Default::default()
        };
        now_ms += (DT * 1000.0) as f64;
        session.frame(&input, DT, now_ms);
        frames += 1;
    }

    match session.last_result() {
        Some(result) => {
            log::info!(
                "Run over after {} frames: score {}, level {}, {} coins, rank {:?}",
                frames,
                result.summary.score,
                result.summary.level,
                result.summary.coins,
                result.rank
            );
            for achievement in &result.unlocked {
                log::info!("Unlocked {}", achievement.name());
            }
        }
        None => log::info!(
            "Bot survived {} frames with score {}",
            frames,
            session.state.stats.score
        ),
    }
    session.teardown();
}
