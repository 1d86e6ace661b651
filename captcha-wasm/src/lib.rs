//! Browser binding of the slide-to-verify captcha.
//!
//! `new SliderCaptcha({ root, ... })` mounts a stage and a slider bar under
//! `root`; every instance owns its own state, listeners and async tasks.

use std::cell::RefCell;
use std::rc::Rc;

use captcha_core::{Challenge, Error, Phase, Result};
use gloo::events::EventListener;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::prelude::*;

mod canvas;
mod constants;
mod dom;
mod input;
mod lifecycle;
mod loader;
mod options;
mod state;
mod utils;

use dom::Dom;
use options::{Hooks, read_config, resolve_root};
use state::{Mode, Shared, State};
use utils::{dom_err, log, now_ms, to_js};

#[wasm_bindgen]
pub struct SliderCaptcha {
    state: Shared,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl SliderCaptcha {
    /// Mount a captcha. Throws when `root` is missing or an option is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> std::result::Result<SliderCaptcha, JsValue> {
        mount(&options).map_err(to_js)
    }

    /// Start a new round with a fresh target and background.
    pub fn refresh(&self) {
        lifecycle::refresh(&self.state);
    }

    /// Remove the widget from the page and detach all of its listeners.
    /// Calling it again does nothing.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        lifecycle::teardown(&self.state);
    }

    #[wasm_bindgen(getter)]
    pub fn solved(&self) -> bool {
        self.state.borrow().challenge.solved()
    }

    /// Failed attempts in the current round.
    #[wasm_bindgen(getter)]
    pub fn retries(&self) -> u32 {
        self.state.borrow().challenge.retries()
    }

    /// True while a background is loading or a verdict is pending.
    #[wasm_bindgen(getter)]
    pub fn loading(&self) -> bool {
        matches!(
            self.state.borrow().challenge.phase(),
            Phase::Loading | Phase::Verifying
        )
    }
}

fn mount(options: &JsValue) -> Result<SliderCaptcha> {
    let window = web_sys::window().ok_or_else(|| Error::Dom("no window".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| Error::Dom("no document".to_string()))?;
    let root = resolve_root(&document, options)?;
    let config = read_config(options)?;
    let hooks = Hooks::read(options);
    let dom = Dom::build(&document, &root, &config).map_err(dom_err)?;

    let seed = (((js_sys::Math::random() * u32::MAX as f64) as u64) << 32) ^ now_ms() as u64;
    let state = Rc::new(RefCell::new(State {
        window,
        dom,
        challenge: Challenge::new(config.settings()),
        config,
        hooks,
        rng: SmallRng::seed_from_u64(seed),
        mode: Mode::Canvas,
        destroyed: false,
    }));
    let listeners = input::bind(&state);
    log("mounted");
    lifecycle::refresh(&state);
    Ok(SliderCaptcha { state, listeners })
}
