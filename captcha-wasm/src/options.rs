use captcha_core::{CaptchaConfig, Error, Result};
use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

use crate::utils::describe;

/// Host-supplied functions. Absent or non-callable entries are `None`.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_success: Option<Function>,
    pub on_fail: Option<Function>,
    pub on_refresh: Option<Function>,
    /// `(param) => Promise`; resolving passes the attempt, rejecting fails it.
    pub on_verify: Option<Function>,
    /// `() => Promise<{ bgUrl, puzzleUrl }>`; switches to the image pair.
    pub request: Option<Function>,
}

impl Hooks {
    pub fn read(opts: &JsValue) -> Self {
        Hooks {
            on_success: function(opts, "onSuccess"),
            on_fail: function(opts, "onFail"),
            on_refresh: function(opts, "onRefresh"),
            on_verify: function(opts, "onVerify"),
            request: function(opts, "request"),
        }
    }
}

fn function(opts: &JsValue, key: &str) -> Option<Function> {
    if !opts.is_object() {
        return None;
    }
    Reflect::get(opts, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.dyn_into::<Function>().ok())
}

/// Scalar options, read through `JSON.stringify` (which drops functions and
/// turns elements into empty objects).
pub fn read_config(opts: &JsValue) -> Result<CaptchaConfig> {
    if opts.is_undefined() || opts.is_null() {
        return Ok(CaptchaConfig::default());
    }
    let text = js_sys::JSON::stringify(opts)
        .map_err(|e| Error::InvalidConfig(describe(&e)))?
        .as_string()
        .ok_or_else(|| Error::InvalidConfig("options are not a JSON object".to_string()))?;
    CaptchaConfig::from_json(&text)
}

/// Resolve the `root` option: an element, or a selector looked up in `document`.
pub fn resolve_root(document: &Document, opts: &JsValue) -> Result<Element> {
    let root = if opts.is_object() {
        Reflect::get(opts, &JsValue::from_str("root")).unwrap_or(JsValue::UNDEFINED)
    } else {
        JsValue::UNDEFINED
    };
    if let Some(selector) = root.as_string() {
        return match document.query_selector(&selector) {
            Ok(Some(el)) => Ok(el),
            Ok(None) => Err(Error::MissingRoot(selector)),
            Err(e) => Err(Error::MissingRoot(format!("{selector}: {}", describe(&e)))),
        };
    }
    root.dyn_into::<Element>()
        .map_err(|_| Error::MissingRoot("`root` must be an element or a selector".to_string()))
}
