use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{BlobEvent, DomException, MediaRecorder, MediaRecorderOptions, MediaStream, RecordingState};

use common::{CameraError, SharedChunks};

use crate::media_streams::stop_video_tracks;
use crate::platform::MediaFile;
use crate::utils::js_error_message;

pub struct Recorder {
    recorder: MediaRecorder,
    stream: MediaStream,
    mime_type: String,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
}

impl Recorder {
    /// Creates an encoder for `stream` that appends every chunk to `chunks`.
    pub fn new(stream: MediaStream, mime_type: &str, chunks: SharedChunks<MediaFile>) -> Result<Self, CameraError> {
        if !MediaRecorder::is_type_supported(mime_type) {
            return Err(CameraError::UnsupportedFormat(mime_type.to_string()));
        }

        let options = MediaRecorderOptions::new();
        options.set_mime_type(mime_type);
        let recorder = MediaRecorder::new_with_media_stream_and_media_recorder_options(&stream, &options)
            .map_err(|e| {
                log::warn!("MediaRecorder rejected {}: {}", mime_type, js_error_message(&e));
                CameraError::UnsupportedFormat(mime_type.to_string())
            })?;

        let on_data = Closure::wrap(Box::new(move |event: BlobEvent| {
            if let Some(blob) = event.data() {
                if blob.size() > 0.0 {
                    chunks.borrow_mut().push(MediaFile(blob));
                }
            }
        }) as Box<dyn FnMut(BlobEvent)>);
        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));

        Ok(Self {
            recorder,
            stream,
            mime_type: mime_type.to_string(),
            _on_data: on_data,
        })
    }

    pub fn start(&self, timeslice_ms: Option<u32>) -> Result<(), CameraError> {
        let started = match timeslice_ms {
            Some(ms) => self.recorder.start_with_time_slice(ms.min(i32::MAX as u32) as i32),
            None => self.recorder.start(),
        };
        started.map_err(|e| {
            log::warn!("MediaRecorder.start failed: {}", js_error_message(&e));
            classify_start_error(&e, &self.mime_type)
        })
    }

    /// Stops encoding and waits for the final `stop` event, after which every
    /// chunk has been delivered.
    pub async fn stop(self) -> Result<(), JsValue> {
        if self.recorder.state() != RecordingState::Inactive {
            let recorder = self.recorder.clone();
            let stopped = js_sys::Promise::new(&mut |resolve: js_sys::Function, _reject| {
                let on_stop = Closure::once_into_js(move || {
                    let _ = resolve.call0(&JsValue::NULL);
                });
                recorder.set_onstop(Some(on_stop.unchecked_ref()));
            });

            self.recorder.stop()?;
            JsFuture::from(stopped).await?;
        }

        self.recorder.set_onstop(None);
        log::debug!("Encoder for {} finalized", self.mime_type);
        Ok(())
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        // the data closure is freed with us
        self.recorder.set_ondataavailable(None);
        stop_video_tracks(&self.stream);
    }
}

fn classify_start_error(err: &JsValue, mime_type: &str) -> CameraError {
    match err.dyn_ref::<DomException>() {
        Some(dom) => classify_start_error_name(&dom.name(), &dom.message(), mime_type),
        None => CameraError::Platform(js_error_message(err)),
    }
}

/// Only a codec rejection means the format is unusable; anything else is a
/// recorder or track failure.
pub fn classify_start_error_name(name: &str, message: &str, mime_type: &str) -> CameraError {
    match name {
        "NotSupportedError" => CameraError::UnsupportedFormat(mime_type.to_string()),
        _ if message.is_empty() => CameraError::Platform(name.to_string()),
        _ => CameraError::Platform(format!("{}: {}", name, message)),
    }
}
