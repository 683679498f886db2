//! Spike Sim entry point
//!
//! Handles platform-specific initialization and wires the DOM to the
//! simulator core.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use gloo_timers::callback::Interval;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{AddEventListenerOptions, Document, HtmlElement, HtmlInputElement};

    use spike_sim::audio::{AudioManager, SoundCue};
    use spike_sim::consts::*;
    use spike_sim::sim::{Phase, SimEvent, SimState, countdown_tick, hold_tick};
    use spike_sim::{Settings, adfit, format_seconds};

    /// App instance holding the simulator and its sampler handles.
    ///
    /// The two `Interval` handles are the only cancellation mechanism:
    /// dropping one clears the scheduled repetition.
    struct App {
        sim: SimState,
        audio: AudioManager,
        settings: Settings,
        countdown_timer: Option<Interval>,
        hold_timer: Option<Interval>,
    }

    impl App {
        fn new(settings: Settings) -> Self {
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            Self {
                sim: SimState::new(),
                audio,
                settings,
                countdown_timer: None,
                hold_timer: None,
            }
        }

        /// Drop both sampler handles, cancelling the periodic work
        fn stop_samplers(&mut self) {
            self.countdown_timer = None;
            self.hold_timer = None;
        }
    }

    /// Single authoritative clock read (seconds)
    fn now_secs() -> f64 {
        js_sys::Date::now() / 1000.0
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Spike Sim starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let app = Rc::new(RefCell::new(App::new(settings)));

        // Ad slots are independent of the simulator
        adfit::inject("ad-top");
        adfit::inject("ad-bottom");

        // Reflect loaded volume in the slider
        if let Some(slider) = document.get_element_by_id("volume-slider") {
            if let Ok(slider) = slider.dyn_into::<HtmlInputElement>() {
                slider.set_value(&app.borrow().settings.master_volume.to_string());
            }
        }

        setup_controls(&document, app.clone());
        setup_spike_handlers(&document, app.clone());

        // HUD refresh and event drain run on the frame loop
        request_animation_frame(app);

        log::info!("Spike Sim running!");
    }

    /// Start the countdown, resetting first when restarting from a terminal
    /// phase. The core itself only defines Idle -> Planted.
    fn handle_start(app: &Rc<RefCell<App>>) {
        {
            let mut g = app.borrow_mut();
            if g.sim.phase.is_terminal() {
                g.stop_samplers();
                g.audio.stop_all();
                g.sim.reset();
            }
            if g.sim.phase != Phase::Idle {
                return;
            }
            g.sim.start();
        }
        spawn_countdown_sampler(app);
    }

    fn handle_reset(app: &Rc<RefCell<App>>) {
        let mut g = app.borrow_mut();
        g.stop_samplers();
        g.audio.stop_all();
        g.sim.reset();
        log::info!("Simulator reset");
    }

    fn handle_begin_hold(app: &Rc<RefCell<App>>) {
        let already_holding = {
            let mut g = app.borrow_mut();
            let holding = g.sim.is_holding;
            g.sim.begin_hold(now_secs());
            holding
        };
        if !already_holding && app.borrow().sim.is_holding {
            spawn_hold_sampler(app);
        }
    }

    fn handle_end_hold(app: &Rc<RefCell<App>>) {
        let mut g = app.borrow_mut();
        g.hold_timer = None;
        g.sim.end_hold(now_secs());
    }

    fn spawn_countdown_sampler(app: &Rc<RefCell<App>>) {
        let handle = {
            let app = app.clone();
            Interval::new(SAMPLE_INTERVAL_MS, move || {
                let mut g = app.borrow_mut();
                let now = now_secs();
                countdown_tick(&mut g.sim, now);
            })
        };
        app.borrow_mut().countdown_timer = Some(handle);
    }

    fn spawn_hold_sampler(app: &Rc<RefCell<App>>) {
        let handle = {
            let app = app.clone();
            Interval::new(SAMPLE_INTERVAL_MS, move || {
                let mut g = app.borrow_mut();
                let now = now_secs();
                hold_tick(&mut g.sim, now);
            })
        };
        app.borrow_mut().hold_timer = Some(handle);
    }

    /// Map drained transition events to audio cues and log breadcrumbs
    fn process_events(g: &mut App) {
        for event in g.sim.drain_events() {
            match event {
                SimEvent::Planted => {
                    g.audio.play(SoundCue::Plant);
                    log::info!("Spike planted, {BOMB_TIMER}s on the clock");
                }
                SimEvent::HoldStarted { from_checkpoint } => {
                    let cue = if from_checkpoint {
                        SoundCue::HalfDefuse
                    } else {
                        SoundCue::Defuse
                    };
                    g.audio.play(cue);
                }
                SimEvent::HoldReleased { committed } => {
                    log::debug!("Hold released, {committed}s committed");
                }
                SimEvent::Defused => {
                    g.audio.stop_all();
                    log::info!("Spike defused with {:.2}s left", g.sim.time_left);
                }
                SimEvent::Exploded { deficit } => {
                    g.audio.play(SoundCue::Explode);
                    match deficit {
                        Some(d) => log::info!("Spike exploded, {d:.2}s short of a defuse"),
                        None => log::info!("Spike exploded"),
                    }
                }
            }
        }
    }

    fn setup_controls(document: &Document, app: Rc<RefCell<App>>) {
        // Start button
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                handle_start(&app);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Reset button
        if let Some(btn) = document.get_element_by_id("reset-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                handle_reset(&app);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Countdown skip buttons
        for (id, seconds) in [("skip-20-btn", 20.0), ("skip-5-btn", 5.0)] {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    app.borrow_mut().sim.skip_time(seconds);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Countdown banner toggle
        if let Some(btn) = document.get_element_by_id("toggle-countdown-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = app.borrow_mut();
                g.settings.show_countdown = !g.settings.show_countdown;
                g.settings.save();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Volume slider
        if let Some(slider) = document.get_element_by_id("volume-slider") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(input) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                if let Ok(vol) = input.value().parse::<f32>() {
                    let mut g = app.borrow_mut();
                    g.audio.set_master_volume(vol);
                    g.settings.master_volume = vol;
                    g.settings.save();
                }
            });
            let _ =
                slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Wire the press target: mouse press/release/leave plus native touch
    /// listeners registered non-passive so preventDefault is honored.
    fn setup_spike_handlers(document: &Document, app: Rc<RefCell<App>>) {
        let Some(spike) = document.get_element_by_id("spike") else {
            log::warn!("Spike element not found");
            return;
        };

        // Mouse down begins the hold
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                event.prevent_default();
                handle_begin_hold(&app);
            });
            let _ =
                spike.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up or leaving the element releases it
        for event_name in ["mouseup", "mouseleave"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                event.prevent_default();
                handle_end_hold(&app);
            });
            let _ =
                spike.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Suppress the long-press context menu
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
            });
            let _ = spike
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start (passive: false so preventDefault works)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                event.prevent_default();
                handle_begin_hold(&app);
            });
            let opts = AddEventListenerOptions::new();
            opts.set_passive(false);
            let _ = spike.add_event_listener_with_callback_and_add_event_listener_options(
                "touchstart",
                closure.as_ref().unchecked_ref(),
                &opts,
            );
            closure.forget();
        }

        // Touch end/cancel release the hold
        for event_name in ["touchend", "touchcancel"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                event.prevent_default();
                handle_end_hold(&app);
            });
            let _ =
                spike.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            frame_loop(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>) {
        {
            let mut g = app.borrow_mut();
            process_events(&mut g);

            // Sampler handles are dropped here, outside their own callbacks
            if g.sim.phase.is_terminal() {
                g.stop_samplers();
            }

            update_hud(&g);
        }

        request_animation_frame(app);
    }

    /// Push current state into the DOM
    fn update_hud(g: &App) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        let phase = g.sim.phase;
        let active = matches!(phase, Phase::Planted | Phase::Defusing);

        set_text(&document, "status-value", &phase.label().to_uppercase());
        set_text(&document, "countdown-value", &format_seconds(g.sim.time_left));
        set_text(
            &document,
            "progress-seconds",
            &format_seconds(g.sim.visible_seconds()),
        );

        set_hidden(&document, "spike-wrap", !active);
        set_hidden(&document, "idle-hint", phase != Phase::Idle);
        set_hidden(&document, "success-banner", phase != Phase::Defused);
        set_hidden(&document, "explode-panel", phase != Phase::Exploded);
        set_hidden(
            &document,
            "countdown-banner",
            !(active && g.settings.show_countdown),
        );
        set_hidden(&document, "toggle-countdown-btn", !active);

        set_text(
            &document,
            "toggle-countdown-btn",
            if g.settings.show_countdown {
                "Hide timer"
            } else {
                "Show timer"
            },
        );

        if phase == Phase::Defused {
            set_text(&document, "success-time", &format_seconds(g.sim.time_left));
        }

        match g.sim.fail_deficit {
            Some(deficit) => {
                set_hidden(&document, "fail-deficit", false);
                set_text(
                    &document,
                    "fail-deficit",
                    &format!("{}s short of a defuse", format_seconds(deficit)),
                );
            }
            None => set_hidden(&document, "fail-deficit", true),
        }

        // Progress bar width follows the derived percentage
        if let Some(el) = document
            .get_element_by_id("progress-bar")
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        {
            let _ = el
                .style()
                .set_property("width", &format!("{:.2}%", g.sim.visible_percent()));
        }

        // Start is a no-op while the countdown runs; show it that way
        if let Some(btn) = document.get_element_by_id("start-btn") {
            if active {
                let _ = btn.set_attribute("disabled", "disabled");
            } else {
                let _ = btn.remove_attribute("disabled");
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Spike Sim (native) starting...");
    log::info!("Native mode has no UI - run with `trunk serve` for the web version");

    println!("\nRunning defuse sequence smoke check...");
    smoke_check();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn smoke_check() {
    use spike_sim::sim::{Phase, SimState, countdown_tick, hold_tick};

    let mut sim = SimState::new();
    sim.start();
    sim.begin_hold(0.0);

    let mut clock = 0.0;
    while !sim.phase.is_terminal() {
        clock += 0.01;
        countdown_tick(&mut sim, clock);
        hold_tick(&mut sim, clock);
    }

    assert_eq!(sim.phase, Phase::Defused, "continuous hold should defuse");
    println!(
        "✓ Held {:.2}s, defused with {:.2}s left on the bomb",
        sim.saved_progress, sim.time_left
    );
}
