use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use common::{ArtifactSummary, CameraApp, CameraConfig, CameraError};

use crate::canvas_renderer::CanvasRenderer;
use crate::platform::BrowserPlatform;
use crate::ui::UiController;
use crate::utils::to_js;

pub type CameraState = CameraApp<BrowserPlatform>;
pub type SharedApp = Rc<RefCell<CameraState>>;

/// Builds the app state, wires the page and opens the first camera.
///
/// Camera failures are reported in the status region and do not fail startup.
pub async fn boot(config: CameraConfig) -> Result<SharedApp, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let ui = UiController::new(&document)?;
    let display = common::FrameSize::new(config.display.width, config.display.height);
    let renderer = CanvasRenderer::new(ui.preview_canvas.clone(), display)?;
    let platform = BrowserPlatform::new(document, ui.camera_video.clone(), renderer);

    let app: SharedApp = Rc::new(RefCell::new(CameraApp::new(platform, config).map_err(to_js)?));

    {
        let state = app.borrow();
        ui.configure_zoom(state.zoom());
        ui.sync(&state);
    }
    ui.register_event_listeners(app.clone())?;
    register_teardown(&window, app.clone())?;

    ui.set_status("Looking for cameras...");
    let result = app.borrow_mut().initialize().await;
    after_acquire(&app, &ui, result, "Camera ready");

    Ok(app)
}

fn report(ui: &UiController, state: &CameraState, result: common::Result<()>, success: &str) {
    match result {
        Ok(()) => ui.set_status(success),
        Err(e) => {
            if e.is_device_failure() {
                log::warn!("Camera unavailable: {}", e);
            } else {
                log::info!("{}", e);
            }
            ui.set_status(&e.user_message());
        }
    }
    ui.sync(state);
}

/// Reports an acquisition and starts the render loop on the first stream.
fn after_acquire(app: &SharedApp, ui: &UiController, result: common::Result<()>, success: &str) {
    let start_loop = match app.try_borrow_mut() {
        Ok(mut state) => {
            report(ui, &state, result, success);
            state.mark_render_started()
        }
        Err(_) => {
            log::warn!("State busy; acquisition result not reported: {:?}", result.err());
            false
        }
    };

    if start_loop {
        if let Err(e) = start_render_loop(app.clone()) {
            log::error!("Render loop failed to start: {:?}", e);
            ui.set_status("Could not start the camera preview");
        }
    }
}

fn busy(ui: &UiController) {
    log::debug!("Ignoring input while another camera operation is in flight");
    ui.set_status("Please wait...");
}

pub async fn switch_camera(app: SharedApp, ui: UiController) {
    let result = {
        let Ok(mut state) = app.try_borrow_mut() else {
            return busy(&ui);
        };
        ui.set_status("Switching camera...");
        state.switch_to_next().await
    };
    after_acquire(&app, &ui, result, "Camera ready");
}

pub async fn select_camera(app: SharedApp, ui: UiController, index: usize) {
    let result = {
        let Ok(mut state) = app.try_borrow_mut() else {
            return busy(&ui);
        };
        if index == state.devices().active_index() && state.has_stream() {
            return;
        }
        ui.set_status("Switching camera...");
        state.select_device(index).await
    };
    after_acquire(&app, &ui, result, "Camera ready");
}

pub async fn capture_photo(app: SharedApp, ui: UiController) {
    let Ok(mut state) = app.try_borrow_mut() else {
        return busy(&ui);
    };
    let result = state.capture_photo().await;
    report(&ui, &state, result, "Photo captured");
}

pub async fn toggle_recording(app: SharedApp, ui: UiController) {
    let Ok(mut state) = app.try_borrow_mut() else {
        return busy(&ui);
    };

    if state.recording_state().is_recording() {
        ui.set_status("Finishing clip...");
        let result = state.stop_recording().await;
        report(&ui, &state, result, "Clip ready");
    } else {
        let result = state.start_recording();
        report(&ui, &state, result, "Recording...");
    }
}

pub fn set_zoom(app: &SharedApp, ui: &UiController, value: f64) {
    match app.try_borrow_mut() {
        Ok(mut state) => {
            state.set_zoom(value);
            ui.show_zoom(state.zoom());
        }
        Err(_) => log::debug!("Zoom input dropped while busy"),
    }
}

pub fn save_artifact(app: &SharedApp, ui: &UiController) {
    let Ok(state) = app.try_borrow() else {
        return busy(ui);
    };

    match state.save() {
        Ok(file_name) => ui.set_status(&format!("Saved {}", file_name)),
        Err(CameraError::NothingToExport) => {
            log::info!("Save requested with no photo or clip");
            ui.set_status(&CameraError::NothingToExport.user_message());
        }
        Err(e) => {
            log::warn!("Save failed: {}", e);
            ui.set_status(&e.user_message());
        }
    }
}

pub fn artifact_summary(app: &SharedApp) -> Option<ArtifactSummary> {
    app.try_borrow().ok().and_then(|state| state.artifact_summary())
}

/// Draws one frame per display refresh for the lifetime of the page.
fn start_render_loop(app: SharedApp) -> Result<(), JsValue> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        // skipped while a handler holds the state across an await
        if let Ok(state) = app.try_borrow() {
            if let Err(e) = state.render_frame() {
                log::debug!("Frame skipped: {}", e);
            }
        }

        if let Some(cb) = next.borrow().as_ref() {
            if let Err(e) = request_animation_frame(cb) {
                log::error!("requestAnimationFrame failed: {:?}", e);
            }
        }
    }) as Box<dyn FnMut()>));

    let first = callback.borrow();
    let cb = first.as_ref().ok_or("Render callback missing")?;
    request_animation_frame(cb)?;
    log::info!("Render loop started");
    Ok(())
}

fn request_animation_frame(callback: &Closure<dyn FnMut()>) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or("No window")?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

fn register_teardown(window: &web_sys::Window, app: SharedApp) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move || {
        shutdown(&app);
    }) as Box<dyn Fn()>);
    window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub fn shutdown(app: &SharedApp) {
    match app.try_borrow_mut() {
        Ok(mut state) => state.shutdown(),
        // the browser stops the tracks itself when the page goes away
        Err(_) => log::warn!("Teardown while busy; leaving streams to the browser"),
    }
}
