use gloo_timers::callback::Timeout;
use js_sys::Date;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, DomException, HtmlAnchorElement};

use common::CameraError;

/// Delay before a download's object URL is revoked.
const REVOKE_DELAY_MS: u32 = 1000;

pub fn current_timestamp_utc() -> String {
    Date::new_0()
        .to_iso_string()
        .as_string()
        .unwrap_or_default()
}

/// Human-readable text for a thrown JS value.
pub fn js_error_message(err: &JsValue) -> String {
    if let Some(dom) = err.dyn_ref::<DomException>() {
        return format!("{}: {}", dom.name(), dom.message());
    }
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

pub fn platform_error(err: JsValue) -> CameraError {
    CameraError::Platform(js_error_message(&err))
}

pub fn to_js(err: CameraError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Offers `blob` as a file download through a temporary anchor.
pub fn download_blob(blob: &Blob, file_name: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let url = web_sys::Url::create_object_url_with_blob(blob)?;

    let a: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    a.set_href(&url);
    a.set_download(file_name);
    a.click();

    Timeout::new(REVOKE_DELAY_MS, move || {
        let _ = web_sys::Url::revoke_object_url(&url);
    })
    .forget();

    Ok(())
}
