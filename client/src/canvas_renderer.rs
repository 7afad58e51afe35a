use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlVideoElement, MediaStream};

use common::{CropRect, FrameSize};

/// HTMLMediaElement.HAVE_CURRENT_DATA
const HAVE_CURRENT_DATA: u16 = 2;

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    display: FrameSize,
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or("No 2d context")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("Context is not 2d"))
}

impl CanvasRenderer {
    /// Wraps the display canvas and fixes its size.
    pub fn new(canvas: HtmlCanvasElement, display: FrameSize) -> Result<Self, JsValue> {
        canvas.set_width(display.width);
        canvas.set_height(display.height);
        let ctx = context_2d(&canvas)?;

        Ok(Self { canvas, ctx, display })
    }

    /// Live frame size, or `None` while the video has no current frame or is paused.
    pub fn video_frame_size(video: &HtmlVideoElement) -> Option<FrameSize> {
        if video.ready_state() < HAVE_CURRENT_DATA || video.paused() {
            return None;
        }
        let size = FrameSize::new(video.video_width(), video.video_height());
        if size.is_empty() {
            None
        } else {
            Some(size)
        }
    }

    /// Draws `crop` of the video stretched over the whole display canvas.
    pub fn draw_crop(&self, video: &HtmlVideoElement, crop: &CropRect) -> Result<(), JsValue> {
        self.ctx
            .draw_image_with_html_video_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                video,
                crop.x,
                crop.y,
                crop.width,
                crop.height,
                0.0,
                0.0,
                self.display.width as f64,
                self.display.height as f64,
            )
    }

    pub fn get_canvas_stream(&self, frame_rate: f64) -> Result<MediaStream, JsValue> {
        self.canvas.capture_stream_with_frame_request_rate(frame_rate)
    }

    /// Encodes `crop` of the video at its native resolution on an off-screen canvas.
    pub async fn encode_crop(
        document: &Document,
        video: &HtmlVideoElement,
        crop: &CropRect,
        mime_type: &str,
        quality: f64,
    ) -> Result<Blob, JsValue> {
        let size = crop.surface_size();
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(size.width);
        canvas.set_height(size.height);

        context_2d(&canvas)?
            .draw_image_with_html_video_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                video,
                crop.x,
                crop.y,
                crop.width,
                crop.height,
                0.0,
                0.0,
                size.width as f64,
                size.height as f64,
            )?;

        let mime_type = mime_type.to_string();
        let promise = js_sys::Promise::new(&mut |resolve: js_sys::Function, reject: js_sys::Function| {
            let callback = Closure::once_into_js(move |blob: JsValue| {
                let _ = resolve.call1(&JsValue::NULL, &blob);
            });
            if let Err(e) = canvas.to_blob_with_type_and_encoder_options(
                callback.unchecked_ref(),
                &mime_type,
                &JsValue::from_f64(quality),
            ) {
                let _ = reject.call1(&JsValue::NULL, &e);
            }
        });

        let blob = JsFuture::from(promise).await?;
        if blob.is_null() {
            return Err(JsValue::from_str("Canvas produced no image"));
        }
        blob.dyn_into::<Blob>()
    }
}
