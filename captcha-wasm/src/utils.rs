use captcha_core::{Error, Point};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, MouseEvent, TouchEvent};

const TAG: &str = "[slider-captcha]";

/// Log a message to the browser console.
pub fn log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(&format!("{TAG} {s}")));
}

pub fn warn(s: &str) {
    web_sys::console::warn_1(&JsValue::from_str(&format!("{TAG} {s}")));
}

pub fn error(s: &str) {
    web_sys::console::error_1(&JsValue::from_str(&format!("{TAG} {s}")));
}

/// Milliseconds since the epoch, from the host clock.
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Render a JS exception for the console.
pub fn describe(v: &JsValue) -> String {
    if let Some(e) = v.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    v.as_string().unwrap_or_else(|| format!("{v:?}"))
}

pub fn dom_err(v: JsValue) -> Error {
    Error::Dom(describe(&v))
}

/// Errors cross into JS as real `Error` objects.
pub fn to_js(e: Error) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

/// Viewport position of a mouse or touch event. Touch releases carry their
/// last position in `changedTouches`.
pub fn pointer_position(e: &Event) -> Option<Point> {
    if let Some(m) = e.dyn_ref::<MouseEvent>() {
        return Some(Point::new(m.client_x() as f64, m.client_y() as f64));
    }
    let t = e.dyn_ref::<TouchEvent>()?;
    let touch = t.touches().get(0).or_else(|| t.changed_touches().get(0))?;
    Some(Point::new(touch.client_x() as f64, touch.client_y() as f64))
}

/// Stop the browser from turning the gesture into a native drag or scroll.
pub fn suppress_default(e: &Event) {
    if e.cancelable() {
        e.prevent_default();
    }
}
