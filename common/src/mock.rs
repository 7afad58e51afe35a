//! In-memory platform used by the unit tests.

use std::cell::{Cell, RefCell};

use crate::crop::{CropRect, FrameSize};
use crate::device::CameraDevice;
use crate::error::{CameraError, Result};
use crate::platform::{MediaBlob, MediaPlatform, StreamRequest};
use crate::recording::SharedChunks;

impl MediaBlob for Vec<u8> {
    fn size_bytes(&self) -> u64 {
        self.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockStream {
    pub id: usize,
    pub device_id: Option<String>,
}

pub struct MockEncoder {
    chunks: SharedChunks<Vec<u8>>,
    pending: Vec<Vec<u8>>,
}

#[derive(Default)]
pub struct MockPlatform {
    pub cameras: RefCell<Vec<CameraDevice>>,
    /// List returned once permission has been granted, if it differs.
    pub granted_cameras: RefCell<Option<Vec<CameraDevice>>>,
    pub enumerate_calls: Cell<usize>,
    pub open_error: RefCell<Option<CameraError>>,
    /// Device the browser picks when the request names none.
    pub default_device: RefCell<Option<String>>,
    pub attach_error: RefCell<Option<CameraError>>,
    pub finish_error: RefCell<Option<CameraError>>,
    pub encoders_started: Cell<usize>,
    pub opened: RefCell<Vec<StreamRequest>>,
    pub closed: RefCell<Vec<usize>>,
    pub frame: Cell<Option<FrameSize>>,
    pub drawn: RefCell<Vec<CropRect>>,
    pub stills: RefCell<Vec<CropRect>>,
    pub reject_mime: RefCell<Option<String>>,
    /// Chunks the next encoder delivers when it is finished.
    pub pending_chunks: RefCell<Vec<Vec<u8>>>,
    pub downloads: RefCell<Vec<(String, Vec<u8>)>>,
}

impl MockPlatform {
    pub fn with_cameras(cameras: Vec<CameraDevice>) -> Self {
        Self {
            cameras: RefCell::new(cameras),
            ..Self::default()
        }
    }
}

impl MediaPlatform for MockPlatform {
    type Stream = MockStream;
    type Blob = Vec<u8>;
    type Encoder = MockEncoder;

    async fn enumerate_cameras(&self) -> Result<Vec<CameraDevice>> {
        self.enumerate_calls.set(self.enumerate_calls.get() + 1);
        if self.enumerate_calls.get() > 1 {
            if let Some(granted) = self.granted_cameras.borrow().as_ref() {
                return Ok(granted.clone());
            }
        }
        Ok(self.cameras.borrow().clone())
    }

    async fn open_stream(&self, request: &StreamRequest) -> Result<MockStream> {
        if let Some(err) = self.open_error.borrow_mut().take() {
            return Err(err);
        }
        let mut opened = self.opened.borrow_mut();
        opened.push(request.clone());
        let device_id = request
            .device_id
            .clone()
            .or_else(|| self.default_device.borrow().clone());
        Ok(MockStream {
            id: opened.len() - 1,
            device_id,
        })
    }

    fn close_stream(&self, stream: &MockStream) {
        self.closed.borrow_mut().push(stream.id);
    }

    fn stream_device_id(&self, stream: &MockStream) -> Option<String> {
        stream.device_id.clone()
    }

    async fn attach_preview(&self, _stream: &MockStream) -> Result<()> {
        match self.attach_error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn frame_size(&self) -> Option<FrameSize> {
        self.frame.get()
    }

    fn draw_preview(&self, crop: &CropRect) -> Result<()> {
        self.drawn.borrow_mut().push(*crop);
        Ok(())
    }

    async fn encode_still(&self, crop: &CropRect, _mime_type: &str, _quality: f64) -> Result<Vec<u8>> {
        self.stills.borrow_mut().push(*crop);
        Ok(vec![0xFF, 0xD8, 0xFF])
    }

    fn supports_recording_format(&self, mime_type: &str) -> bool {
        self.reject_mime.borrow().as_deref() != Some(mime_type)
    }

    fn start_encoder(
        &self,
        _source: &MockStream,
        mime_type: &str,
        _frame_rate: f64,
        _timeslice_ms: Option<u32>,
        chunks: SharedChunks<Vec<u8>>,
    ) -> Result<MockEncoder> {
        if self.reject_mime.borrow().as_deref() == Some(mime_type) {
            return Err(CameraError::UnsupportedFormat(mime_type.to_string()));
        }
        self.encoders_started.set(self.encoders_started.get() + 1);
        Ok(MockEncoder {
            chunks,
            pending: self.pending_chunks.borrow_mut().drain(..).collect(),
        })
    }

    async fn finish_encoder(&self, encoder: MockEncoder) -> Result<()> {
        if let Some(err) = self.finish_error.borrow_mut().take() {
            return Err(err);
        }
        let mut buffer = encoder.chunks.borrow_mut();
        for chunk in encoder.pending {
            buffer.push(chunk);
        }
        Ok(())
    }

    fn concat_chunks(&self, chunks: Vec<Vec<u8>>, _mime_type: &str) -> Result<Vec<u8>> {
        Ok(chunks.concat())
    }

    fn offer_download(&self, blob: &Vec<u8>, file_name: &str) -> Result<()> {
        self.downloads
            .borrow_mut()
            .push((file_name.to_string(), blob.clone()));
        Ok(())
    }

    fn now_iso(&self) -> String {
        "2024-01-01T00:00:00.000Z".to_string()
    }
}
