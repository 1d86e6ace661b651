use captcha_core::config::placeholder_url;
use captcha_core::{Check, RoundId, Settlement};
use js_sys::Function;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

use crate::loader::{load_image, request_pair, run_verifier};
use crate::state::{Background, Mode, Shared};
use crate::utils::{describe, error, log, now_ms, warn};

/// Call a host callback, logging instead of propagating anything it throws.
fn call_hook(hook: Option<&Function>, name: &str) {
    if let Some(f) = hook
        && let Err(e) = f.call0(&JsValue::NULL)
    {
        error(&format!("{name} threw: {}", describe(&e)));
    }
}

/// Start a new round. Returns immediately; the background loads in a task.
pub fn refresh(state: &Shared) {
    let Some(round) = begin(state) else {
        return;
    };
    let st = state.clone();
    spawn_local(async move {
        let background = fetch_background(&st, round).await;
        complete(&st, round, background);
    });
}

/// Synchronous half of a refresh: new target, sized layers, loading shown.
fn begin(state: &Shared) -> Option<RoundId> {
    let Ok(mut guard) = state.try_borrow_mut() else {
        warn("refresh requested while the captcha is busy");
        return None;
    };
    let s = &mut *guard;
    if s.destroyed {
        return None;
    }
    let size = s.measure();
    let target = s.seed(size);
    let round = s.challenge.begin_round(size, target);
    if let Err(e) = s.sync_layers(size) {
        error(&format!("resizing canvases failed: {}", describe(&e)));
    }
    if s.hooks.request.is_none() {
        s.mode = Mode::Canvas;
        if let Err(e) = s.dom.show_canvas_layers() {
            error(&format!("mounting canvases failed: {}", describe(&e)));
        }
    }
    s.dom.show_loading(true);
    s.reset_visuals();
    Some(round)
}

async fn fetch_background(state: &Shared, round: RoundId) -> Background {
    let (request, src, cross_origin) = {
        let s = state.borrow();
        let size = s.challenge.size();
        let (src, cross_origin) = match s.config.image_url() {
            Some(url) => (url.to_string(), s.config.cross_origin.clone()),
            None => {
                let token = (now_ms() as u64).wrapping_add(round.0);
                (
                    placeholder_url(size.width, size.height, token),
                    Some("anonymous".to_string()),
                )
            }
        };
        (s.hooks.request.clone(), src, cross_origin)
    };

    if let Some(request) = request {
        return match request_pair(&request).await {
            Ok(pair) => Background::Pair(pair),
            Err(e) => {
                warn(&format!("{e}; falling back to the gradient"));
                Background::Gradient
            }
        };
    }
    match load_image(&src, cross_origin.as_deref()).await {
        Ok(img) => Background::Image(img),
        Err(e) => {
            warn(&format!("{e}; falling back to the gradient"));
            Background::Gradient
        }
    }
}

fn complete(state: &Shared, round: RoundId, background: Background) {
    let on_refresh = {
        let mut s = state.borrow_mut();
        if s.destroyed || !s.challenge.is_current(round) {
            log(&format!("dropping background of stale round {}", round.0));
            return;
        }
        if let Err(e) = s.present(background) {
            error(&format!("presenting the round failed: {}", describe(&e)));
        }
        s.challenge.finish_loading(round);
        s.dom.show_loading(false);
        s.reset_visuals();
        s.hooks.on_refresh.clone()
    };
    call_hook(on_refresh.as_ref(), "onRefresh");
}

/// Judge the gesture that just ended, locally or through the host verifier.
pub fn release(state: &Shared) {
    let (pending, on_verify) = {
        let mut s = state.borrow_mut();
        let on_verify = s.hooks.on_verify.clone();
        let Some(pending) = s.challenge.pointer_up(now_ms(), on_verify.is_some()) else {
            return;
        };
        s.dom.set_grabbing(false);
        (pending, on_verify)
    };
    let round = pending.round;
    match (pending.check, on_verify) {
        (Check::Local(passed), _) => conclude(state, round, passed),
        (Check::Remote(param), Some(on_verify)) => {
            state.borrow().dom.show_loading(true);
            let st = state.clone();
            spawn_local(async move {
                let passed = match run_verifier(&on_verify, &param).await {
                    Ok(()) => true,
                    Err(e) => {
                        log(&e.to_string());
                        false
                    }
                };
                conclude(&st, round, passed);
            });
        }
        (Check::Remote(_), None) => conclude(state, round, false),
    }
}

/// Apply a verdict: status, slider reset, host callback and, once the retry
/// limit is hit, a fresh round.
fn conclude(state: &Shared, round: RoundId, passed: bool) {
    let (hook, name, refresh_after) = {
        let mut s = state.borrow_mut();
        if s.destroyed {
            return;
        }
        let Some(outcome) = s.challenge.settle(round, passed) else {
            log(&format!("dropping verdict for stale round {}", round.0));
            return;
        };
        s.dom.show_loading(false);
        s.dom.apply_status(&s.challenge.status());
        match outcome {
            Settlement::Passed => (s.hooks.on_success.clone(), "onSuccess", false),
            Settlement::Failed { refresh } => {
                s.reset_position();
                s.dom.schedule_unshake();
                (s.hooks.on_fail.clone(), "onFail", refresh)
            }
        }
    };
    call_hook(hook.as_ref(), name);
    if refresh_after {
        refresh(state);
    }
}

/// Detach the widget and make every pending completion stale.
pub fn teardown(state: &Shared) {
    let Ok(mut s) = state.try_borrow_mut() else {
        return;
    };
    if s.destroyed {
        return;
    }
    s.destroyed = true;
    s.challenge.retire();
    s.dom.detach();
}
