use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, HtmlButtonElement, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlOptionElement, HtmlSelectElement, HtmlVideoElement,
};

use common::{ControlState, DeviceList, ZoomLevel};

use crate::app::{self, SharedApp};

#[derive(Clone)]
pub struct UiController {
    pub status_el: HtmlElement,
    pub camera_video: HtmlVideoElement,
    pub preview_canvas: HtmlCanvasElement,
    pub capture_btn: HtmlButtonElement,
    pub record_btn: HtmlButtonElement,
    pub switch_btn: HtmlButtonElement,
    pub camera_select: HtmlSelectElement,
    pub zoom_slider: HtmlInputElement,
    pub zoom_label_el: HtmlElement,
    pub save_btn: HtmlButtonElement,
}

impl UiController {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            status_el: get_element_by_id(document, "status")?,
            camera_video: get_element_by_id(document, "cameraVideo")?,
            preview_canvas: get_element_by_id(document, "preview")?,
            capture_btn: get_element_by_id(document, "captureBtn")?,
            record_btn: get_element_by_id(document, "recordBtn")?,
            switch_btn: get_element_by_id(document, "switchBtn")?,
            camera_select: get_element_by_id(document, "cameraSelect")?,
            zoom_slider: get_element_by_id(document, "zoomSlider")?,
            zoom_label_el: get_element_by_id(document, "zoomLabel")?,
            save_btn: get_element_by_id(document, "saveBtn")?,
        })
    }

    /// Messages stay visible until the next one replaces them.
    pub fn set_status(&self, text: &str) {
        self.status_el.set_text_content(Some(text));
    }

    pub fn configure_zoom(&self, zoom: &ZoomLevel) {
        self.zoom_slider.set_min(&zoom.min().to_string());
        self.zoom_slider.set_max(&zoom.max().to_string());
        self.zoom_slider.set_step(&zoom.step().to_string());
        self.show_zoom(zoom);
    }

    pub fn show_zoom(&self, zoom: &ZoomLevel) {
        self.zoom_slider.set_value_as_number(zoom.factor());
        self.zoom_label_el.set_text_content(Some(&zoom.label()));
    }

    pub fn apply_controls(&self, controls: &ControlState) -> Result<(), JsValue> {
        self.capture_btn.set_disabled(!controls.capture_enabled);
        self.record_btn.set_disabled(!controls.record_enabled);
        self.record_btn.set_text_content(Some(controls.record_label));
        self.switch_btn.set_disabled(!controls.switch_enabled);
        self.camera_select.set_disabled(!controls.select_enabled);
        self.zoom_slider.set_disabled(!controls.zoom_enabled);
        self.save_btn.set_disabled(!controls.save_enabled);

        set_visible(&self.switch_btn, controls.switch_visible)?;
        set_visible(&self.camera_select, controls.select_visible)?;
        Ok(())
    }

    pub fn render_devices(&self, devices: &DeviceList) -> Result<(), JsValue> {
        self.camera_select.set_inner_html("");
        for index in 0..devices.len() {
            let option = HtmlOptionElement::new_with_text_and_value(
                &devices.display_label(index),
                &index.to_string(),
            )?;
            self.camera_select.add_with_html_option_element(&option)?;
        }
        if !devices.is_empty() {
            self.camera_select
                .set_selected_index(devices.active_index() as i32);
        }
        Ok(())
    }

    /// Brings every control in line with the app state.
    pub fn sync(&self, state: &app::CameraState) {
        if let Err(e) = self
            .render_devices(state.devices())
            .and_then(|_| self.apply_controls(&state.controls()))
        {
            log::warn!("Failed to update controls: {:?}", e);
        }
        self.show_zoom(state.zoom());
    }

    pub fn register_event_listeners(&self, app_state: SharedApp) -> Result<(), JsValue> {
        // Capture button
        {
            let app = app_state.clone();
            let ui = self.clone();
            let closure = Closure::wrap(Box::new(move || {
                let app = app.clone();
                let ui = ui.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    app::capture_photo(app, ui).await;
                });
            }) as Box<dyn Fn()>);
            self.capture_btn
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Record / stop toggle
        {
            let app = app_state.clone();
            let ui = self.clone();
            let closure = Closure::wrap(Box::new(move || {
                let app = app.clone();
                let ui = ui.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    app::toggle_recording(app, ui).await;
                });
            }) as Box<dyn Fn()>);
            self.record_btn
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Switch camera button
        {
            let app = app_state.clone();
            let ui = self.clone();
            let closure = Closure::wrap(Box::new(move || {
                let app = app.clone();
                let ui = ui.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    app::switch_camera(app, ui).await;
                });
            }) as Box<dyn Fn()>);
            self.switch_btn
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Camera dropdown
        {
            let app = app_state.clone();
            let ui = self.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let Some(select) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
                else {
                    return;
                };
                let Ok(index) = select.value().parse::<usize>() else {
                    return;
                };
                let app = app.clone();
                let ui = ui.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    app::select_camera(app, ui, index).await;
                });
            }) as Box<dyn Fn(web_sys::Event)>);
            self.camera_select
                .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Zoom slider stays live while recording
        {
            let app = app_state.clone();
            let ui = self.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                if let Some(target) = event.target() {
                    if let Ok(input) = target.dyn_into::<HtmlInputElement>() {
                        app::set_zoom(&app, &ui, input.value_as_number());
                    }
                }
            }) as Box<dyn Fn(web_sys::Event)>);
            self.zoom_slider
                .add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Save button
        {
            let app = app_state.clone();
            let ui = self.clone();
            let closure = Closure::wrap(Box::new(move || {
                app::save_artifact(&app, &ui);
            }) as Box<dyn Fn()>);
            self.save_btn
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

fn set_visible(element: &HtmlElement, visible: bool) -> Result<(), JsValue> {
    if visible {
        element.style().remove_property("display")?;
    } else {
        element.style().set_property("display", "none")?;
    }
    Ok(())
}

fn get_element_by_id<T: wasm_bindgen::JsCast>(
    document: &Document,
    id: &str,
) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| format!("Element #{} not found", id).into())
        .and_then(|el| el.dyn_into::<T>().map_err(|_| format!("Element #{} has wrong type", id).into()))
}
