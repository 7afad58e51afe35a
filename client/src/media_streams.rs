use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    DomException, MediaDeviceInfo, MediaDeviceKind, MediaDevices, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

use common::{CameraDevice, CameraError, StreamRequest};

use crate::utils::js_error_message;

fn media_devices() -> Result<MediaDevices, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    window.navigator().media_devices()
}

pub async fn get_camera_stream(request: &StreamRequest) -> Result<MediaStream, JsValue> {
    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::from_bool(request.audio));
    constraints.set_video(&create_camera_constraints(request)?);

    let promise = media_devices()?.get_user_media_with_constraints(&constraints)?;
    let stream_js = JsFuture::from(promise).await?;
    Ok(MediaStream::from(stream_js))
}

fn create_camera_constraints(request: &StreamRequest) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();

    // width: { ideal: N }
    let width_obj = js_sys::Object::new();
    js_sys::Reflect::set(&width_obj, &"ideal".into(), &request.ideal_width.into())?;
    js_sys::Reflect::set(&obj, &"width".into(), &width_obj)?;

    // height: { ideal: N }
    let height_obj = js_sys::Object::new();
    js_sys::Reflect::set(&height_obj, &"ideal".into(), &request.ideal_height.into())?;
    js_sys::Reflect::set(&obj, &"height".into(), &height_obj)?;

    // deviceId: { exact: id }
    if let Some(device_id) = &request.device_id {
        let device_obj = js_sys::Object::new();
        js_sys::Reflect::set(&device_obj, &"exact".into(), &device_id.as_str().into())?;
        js_sys::Reflect::set(&obj, &"deviceId".into(), &device_obj)?;
    }

    Ok(obj.into())
}

/// Video inputs in browser order. Labels stay empty until permission is granted.
pub async fn list_video_inputs() -> Result<Vec<CameraDevice>, JsValue> {
    let promise = media_devices()?.enumerate_devices()?;
    let list: js_sys::Array = JsFuture::from(promise).await?.dyn_into()?;

    let cameras = list
        .iter()
        .filter_map(|item| item.dyn_into::<MediaDeviceInfo>().ok())
        .filter(|info| info.kind() == MediaDeviceKind::Videoinput)
        .map(|info| CameraDevice::new(info.device_id(), info.label()))
        .collect();

    Ok(cameras)
}

pub fn stop_stream(stream: &MediaStream) {
    let tracks = stream.get_tracks();
    for i in 0..tracks.length() {
        let track = MediaStreamTrack::from(tracks.get(i));
        track.stop();
    }
}

/// Stops only the video tracks; audio tracks borrowed from the camera stream stay live.
pub fn stop_video_tracks(stream: &MediaStream) {
    let tracks = stream.get_video_tracks();
    for i in 0..tracks.length() {
        MediaStreamTrack::from(tracks.get(i)).stop();
    }
}

/// Device id of the camera actually feeding `stream`, from the first video track's settings.
pub fn stream_device_id(stream: &MediaStream) -> Option<String> {
    let tracks = stream.get_video_tracks();
    if tracks.length() == 0 {
        return None;
    }
    let settings = MediaStreamTrack::from(tracks.get(0)).get_settings();
    js_sys::Reflect::get(&settings, &"deviceId".into())
        .ok()
        .and_then(|id| id.as_string())
        .filter(|id| !id.is_empty())
}

/// Maps a getUserMedia rejection onto the error taxonomy.
pub fn classify_error(err: &JsValue) -> CameraError {
    match err.dyn_ref::<DomException>() {
        Some(dom) => classify_error_name(&dom.name(), &dom.message()),
        None => CameraError::Platform(js_error_message(err)),
    }
}

pub fn classify_error_name(name: &str, message: &str) -> CameraError {
    let detail = if message.is_empty() {
        name.to_string()
    } else {
        format!("{}: {}", name, message)
    };

    match name {
        "NotAllowedError" | "SecurityError" | "PermissionDeniedError" => {
            CameraError::AccessDenied(detail)
        }
        "NotReadableError" | "AbortError" | "TrackStartError" => CameraError::DeviceBusy(detail),
        "NotFoundError" | "OverconstrainedError" | "DevicesNotFoundError" => CameraError::NoDevice,
        _ => CameraError::Platform(detail),
    }
}
