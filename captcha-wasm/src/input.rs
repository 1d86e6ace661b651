use captcha_core::DragSource;
use gloo::events::{EventListener, EventListenerOptions};
use web_sys::{Event, EventTarget};

use crate::constants::THUMB_WIDTH;
use crate::lifecycle;
use crate::state::Shared;
use crate::utils::{now_ms, pointer_position, suppress_default};

/// Wire one captcha's pointer handling. Move and release are watched on the
/// window so a drag keeps tracking outside the widget. Dropping the returned
/// listeners detaches everything.
pub fn bind(state: &Shared) -> Vec<EventListener> {
    let (window, grips, refresh): (EventTarget, Vec<(EventTarget, DragSource)>, EventTarget) = {
        let s = state.borrow();
        (
            s.window.clone().into(),
            vec![
                (s.dom.thumb.clone().into(), DragSource::Thumb),
                (s.dom.piece.canvas.clone().into(), DragSource::Piece),
                (s.dom.piece_img.clone().into(), DragSource::Piece),
            ],
            s.dom.refresh.clone().into(),
        )
    };
    // touch handlers must stay non-passive to cancel scrolling
    let opts = EventListenerOptions::enable_prevent_default();
    let mut listeners = Vec::new();

    for (target, source) in grips {
        for ty in ["mousedown", "touchstart"] {
            let st = state.clone();
            listeners.push(EventListener::new_with_options(&target, ty, opts, move |e| {
                on_down(&st, e, source)
            }));
        }
    }
    for ty in ["mousemove", "touchmove"] {
        let st = state.clone();
        listeners.push(EventListener::new_with_options(&window, ty, opts, move |e| {
            on_move(&st, e)
        }));
    }
    for ty in ["mouseup", "touchend", "touchcancel"] {
        let st = state.clone();
        listeners.push(EventListener::new(&window, ty, move |_e| on_up(&st)));
    }
    let st = state.clone();
    listeners.push(EventListener::new(&refresh, "click", move |_e| {
        lifecycle::refresh(&st)
    }));
    listeners
}

fn on_down(state: &Shared, e: &Event, source: DragSource) {
    let Some(pos) = pointer_position(e) else {
        return;
    };
    let Ok(mut s) = state.try_borrow_mut() else {
        return;
    };
    if source == DragSource::Piece && !s.hits_piece(pos) {
        return;
    }
    if s.challenge.pointer_down(pos, now_ms(), source) {
        s.dom.set_grabbing(true);
        drop(s);
        suppress_default(e);
    }
}

fn on_move(state: &Shared, e: &Event) {
    let Some(pos) = pointer_position(e) else {
        return;
    };
    let Ok(mut s) = state.try_borrow_mut() else {
        return;
    };
    if !s.challenge.is_dragging() {
        return;
    }
    let max = s.challenge.size().width - THUMB_WIDTH;
    if let Some(offset) = s.challenge.pointer_move(pos, max) {
        s.apply_offset(offset);
    }
    drop(s);
    suppress_default(e);
}

fn on_up(state: &Shared) {
    let dragging = state
        .try_borrow()
        .map(|s| s.challenge.is_dragging())
        .unwrap_or(false);
    if dragging {
        lifecycle::release(state);
    }
}
