use captcha_core::{Error, ImagePair, Result, VerifyParam};
use js_sys::{Function, Promise};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use crate::utils::{describe, dom_err};

/// Fetch and decode an image. Resolves once `onload` fired; network and
/// decode failures both come back as [`Error::ImageLoad`].
pub async fn load_image(src: &str, cross_origin: Option<&str>) -> Result<HtmlImageElement> {
    let img = HtmlImageElement::new().map_err(dom_err)?;
    if let Some(co) = cross_origin {
        img.set_cross_origin(Some(co));
    }
    let done = Promise::new(&mut |resolve, reject| {
        img.set_onload(Some(&resolve));
        img.set_onerror(Some(&reject));
    });
    img.set_src(src);
    let res = JsFuture::from(done).await;
    img.set_onload(None);
    img.set_onerror(None);
    res.map_err(|_| Error::ImageLoad(src.to_string()))?;
    Ok(img)
}

/// Call a host function and settle on its result; plain values count as
/// resolved, a synchronous throw as rejected.
async fn settle(f: &Function, arg: Option<&JsValue>) -> std::result::Result<JsValue, JsValue> {
    let ret = match arg {
        Some(a) => f.call1(&JsValue::NULL, a)?,
        None => f.call0(&JsValue::NULL)?,
    };
    JsFuture::from(Promise::resolve(&ret)).await
}

/// Ask the host `request()` function for a background/piece pair.
pub async fn request_pair(request: &Function) -> Result<ImagePair> {
    let value = settle(request, None)
        .await
        .map_err(|e| Error::Request(describe(&e)))?;
    let json = js_sys::JSON::stringify(&value)
        .map_err(|e| Error::Request(describe(&e)))?
        .as_string()
        .ok_or_else(|| Error::Request("request() resolved to a non-JSON value".to_string()))?;
    ImagePair::from_json(&json)
}

/// Hand a finished gesture to the host verifier.
pub async fn run_verifier(on_verify: &Function, param: &VerifyParam) -> Result<()> {
    let text = serde_json::to_string(param).map_err(|e| Error::Verifier(e.to_string()))?;
    let arg = js_sys::JSON::parse(&text).map_err(|e| Error::Verifier(describe(&e)))?;
    settle(on_verify, Some(&arg))
        .await
        .map(|_| ())
        .map_err(|e| Error::Verifier(describe(&e)))
}
