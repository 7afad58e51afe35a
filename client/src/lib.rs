use wasm_bindgen::prelude::*;

use common::CameraConfig;

mod app;
mod canvas_renderer;
mod media_recorder;
mod media_streams;
mod platform;
mod ui;
mod utils;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("SnapZoom client initialized");
}

/// Handle returned to page scripts once the camera page is wired up.
#[wasm_bindgen]
pub struct CameraHandle {
    app: app::SharedApp,
}

#[wasm_bindgen]
impl CameraHandle {
    /// `{ kind, mime_type, size_bytes }` of the current photo or clip, or `null`.
    pub fn artifact_info(&self) -> Result<JsValue, JsValue> {
        match app::artifact_summary(&self.app) {
            Some(summary) => Ok(serde_wasm_bindgen::to_value(&summary)?),
            None => Ok(JsValue::NULL),
        }
    }

    /// Releases the camera. Also runs automatically on `pagehide`.
    pub fn shutdown(&self) {
        app::shutdown(&self.app);
    }
}

/// Starts the camera page. `config` may be omitted; missing fields take defaults.
#[wasm_bindgen]
pub async fn start(config: JsValue) -> Result<CameraHandle, JsValue> {
    let config = parse_config(config)?;
    log::info!(
        "Starting camera (ideal {}x{}, display {}x{}, recording {})",
        config.capture.ideal_width,
        config.capture.ideal_height,
        config.display.width,
        config.display.height,
        config.recording.mime_type
    );

    let app = app::boot(config).await?;
    Ok(CameraHandle { app })
}

fn parse_config(value: JsValue) -> Result<CameraConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(CameraConfig::default());
    }
    let config: CameraConfig = serde_wasm_bindgen::from_value(value)?;
    config.validate().map_err(utils::to_js)?;
    Ok(config)
}
