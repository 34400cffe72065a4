//! Suika Cats entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, PointerEvent};

    use suika_cats::{ConfigError, GameConfig};
    use suika_cats::consts::*;
    use suika_cats::persistence::LocalStorageStore;
    use suika_cats::sim::{CircleWorld, GameEvent, GameSession, Rank};

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        world: CircleWorld,
        ctx: CanvasRenderingContext2d,
        canvas: HtmlCanvasElement,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        fn new(
            canvas: HtmlCanvasElement,
            ctx: CanvasRenderingContext2d,
        ) -> Result<Self, ConfigError> {
            let config = GameConfig::load();
            let seed = js_sys::Date::now() as u64;
            let store = Box::new(LocalStorageStore::default());
            let mut session = GameSession::with_seed(config.clone(), seed, store)?;
            session.init();
            let world = CircleWorld::new(*session.ranks(), config.width, config.height);
            Ok(Self {
                session,
                world,
                ctx,
                canvas,
                accumulator: 0.0,
                last_time: 0.0,
            })
        }

        /// Convert a pointer offset to field coordinates (canvas may be CSS-scaled)
        fn field_x(&self, offset_x: i32) -> f32 {
            let client_w = self.canvas.client_width().max(1) as f32;
            offset_x as f32 * self.session.config().width / client_w
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.world.step(SIM_DT);
                let events = self.session.tick(&mut self.world, SIM_DT);
                for event in &events {
                    if let GameEvent::GameOver { final_score } = event {
                        log::info!("Final score: {}", final_score);
                    }
                }
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        fn draw(&self) {
            let ctx = &self.ctx;
            let config = self.session.config();
            let snap = self.session.snapshot();
            let ranks = self.session.ranks();

            ctx.clear_rect(0.0, 0.0, config.width as f64, config.height as f64);

            // Drop zone line
            ctx.save();
            ctx.set_stroke_style_str("rgba(255, 255, 255, 0.3)");
            let _ = ctx.set_line_dash(&dash(5.0));
            ctx.begin_path();
            ctx.move_to(0.0, config.drop_zone_height as f64);
            ctx.line_to(config.width as f64, config.drop_zone_height as f64);
            ctx.stroke();
            ctx.restore();

            // Preview of the cat about to drop
            if snap.drop_allowed && !snap.is_over {
                let rank = ranks.rank(snap.current_rank);
                let x = self.session.preview_x() as f64;
                let y = config.drop_y() as f64;

                ctx.save();
                ctx.set_stroke_style_str("rgba(255, 255, 255, 0.4)");
                let _ = ctx.set_line_dash(&dash(3.0));
                ctx.begin_path();
                ctx.move_to(x, y + rank.radius as f64);
                ctx.line_to(x, config.height as f64);
                ctx.stroke();
                ctx.set_global_alpha(0.6);
                draw_cat(ctx, x, y, rank, rank.plain_emoji());
                ctx.restore();
            }

            for cat in self.session.entities(&self.world) {
                let rank = ranks.rank(cat.rank);
                let (x, y) = (cat.position.x as f64, cat.position.y as f64);
                draw_cat(ctx, x, y, rank, rank.emoji);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let snap = self.session.snapshot();
            let ranks = self.session.ranks();

            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&snap.score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("best-score") {
                el.set_text_content(Some(&snap.best_score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("next-cat-display") {
                if let Some(rank) = ranks.get(snap.next_rank) {
                    el.set_text_content(Some(rank.plain_emoji()));
                }
            }
            if let Some(el) = document.get_element_by_id("game-over-overlay") {
                if snap.is_over {
                    let _ = el.class_list().remove_1("hidden");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&snap.score.to_string()));
                    }
                } else {
                    let _ = el.class_list().add_1("hidden");
                }
            }
        }
    }

    fn dash(len: f64) -> JsValue {
        js_sys::Array::of2(&JsValue::from_f64(len), &JsValue::from_f64(len)).into()
    }

    /// Coloured disc with an emoji on top
    fn draw_cat(ctx: &CanvasRenderingContext2d, x: f64, y: f64, rank: &Rank, emoji: &str) {
        let r = rank.radius as f64;

        ctx.begin_path();
        let _ = ctx.arc(x, y, r, 0.0, TAU);
        ctx.set_fill_style_str(rank.color);
        ctx.fill();
        ctx.set_stroke_style_str("rgba(0, 0, 0, 0.2)");
        ctx.set_line_width(2.0);
        ctx.stroke();

        ctx.set_font(&format!("{}px sans-serif", (r * 1.1).round()));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text(emoji, x, y);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Suika Cats starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let game = match Game::new(canvas.clone(), ctx) {
            Ok(game) => Rc::new(RefCell::new(game)),
            Err(e) => {
                log::error!("Cannot start: {}", e);
                return;
            }
        };
        {
            let g = game.borrow();
            canvas.set_width(g.session.config().width as u32);
            canvas.set_height(g.session.config().height as u32);
        }

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());

        request_animation_frame(game);

        log::info!("Suika Cats running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer move - aim only
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let x = g.field_x(event.offset_x());
                g.session.on_pointer_move(x);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer down (mouse, touch, pen) - drop
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let x = g.field_x(event.offset_x());
                let Game { session, world, .. } = &mut *g;
                session.on_pointer_down(x, world);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                let Game { session, world, .. } = &mut *g;
                session.on_restart_requested(world);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
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
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.draw();
            g.update_hud();
        }

        request_animation_frame(game);
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
    log::info!("Suika Cats (native) starting...");
    log::info!("Native mode runs a headless autoplay round");
    log::info!("Run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(7);
    let summary = match autoplay::run(seed, 600.0) {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("Cannot start: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "seed {}: score {} after {} drops and {} merges ({:.0}s, {})",
        seed,
        summary.score,
        summary.drops,
        summary.merges,
        summary.seconds,
        if summary.game_over { "game over" } else { "time up" }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless round driven by a random aimer
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use suika_cats::consts::SIM_DT;
    use suika_cats::sim::{CircleWorld, GameEvent, GameSession};
    use suika_cats::{ConfigError, GameConfig, MemoryStore};

    pub struct Summary {
        pub score: u64,
        pub drops: u32,
        pub merges: u32,
        pub seconds: f32,
        pub game_over: bool,
    }

    pub fn run(seed: u64, max_seconds: f32) -> Result<Summary, ConfigError> {
        let config = GameConfig::load();
        let store = Box::new(MemoryStore::new());
        let mut session = GameSession::with_seed(config.clone(), seed, store)?;
        session.init();
        let mut world = CircleWorld::new(*session.ranks(), config.width, config.height);
        let mut aimer = Pcg32::seed_from_u64(seed ^ 0x5EED);

        let mut summary = Summary {
            score: 0,
            drops: 0,
            merges: 0,
            seconds: 0.0,
            game_over: false,
        };

        while summary.seconds < max_seconds && !session.is_over() {
            if session.snapshot().drop_allowed {
                let x = aimer.random_range(0.0..config.width);
                if session.on_pointer_down(x, &mut world).is_some() {
                    summary.drops += 1;
                }
            }

            world.step(SIM_DT);
            for event in session.tick(&mut world, SIM_DT) {
                match event {
                    GameEvent::Merged { .. } => summary.merges += 1,
                    GameEvent::GameOver { .. } => summary.game_over = true,
                    _ => {}
                }
            }
            summary.seconds += SIM_DT;
        }

        summary.score = session.score();
        Ok(summary)
    }
}
