//! The browser surface the camera app drives.
//!
//! Everything runs on the UI thread, so implementations are free to be `!Send`.

use crate::crop::{CropRect, FrameSize};
use crate::device::CameraDevice;
use crate::error::Result;
use crate::recording::SharedChunks;

/// Request for one audio+video capture stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub device_id: Option<String>,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub audio: bool,
}

pub trait MediaBlob {
    fn size_bytes(&self) -> u64;
}

#[allow(async_fn_in_trait)]
pub trait MediaPlatform {
    type Stream;
    type Blob: MediaBlob;
    type Encoder;

    /// Lists video inputs. Labels are empty until permission has been granted.
    async fn enumerate_cameras(&self) -> Result<Vec<CameraDevice>>;

    async fn open_stream(&self, request: &StreamRequest) -> Result<Self::Stream>;

    /// Stops every track of `stream`. Must tolerate already-stopped streams.
    fn close_stream(&self, stream: &Self::Stream);

    /// Device id the browser actually opened for `stream`, if it reports one.
    fn stream_device_id(&self, stream: &Self::Stream) -> Option<String>;

    /// Shows `stream` in the preview source and starts playback.
    async fn attach_preview(&self, stream: &Self::Stream) -> Result<()>;

    /// Size of the current live frame, or `None` while nothing is playing.
    fn frame_size(&self) -> Option<FrameSize>;

    /// Copies `crop` of the live frame onto the fixed-size display surface.
    fn draw_preview(&self, crop: &CropRect) -> Result<()>;

    /// Encodes `crop` of the live frame as a still image.
    async fn encode_still(&self, crop: &CropRect, mime_type: &str, quality: f64) -> Result<Self::Blob>;

    /// Whether the encoder can produce `mime_type`.
    fn supports_recording_format(&self, mime_type: &str) -> bool;

    /// Starts encoding the display surface's video plus the audio of `source`.
    /// Each produced chunk is pushed to `chunks`.
    fn start_encoder(
        &self,
        source: &Self::Stream,
        mime_type: &str,
        frame_rate: f64,
        timeslice_ms: Option<u32>,
        chunks: SharedChunks<Self::Blob>,
    ) -> Result<Self::Encoder>;

    /// Stops the encoder and resolves once its last chunk has been delivered.
    async fn finish_encoder(&self, encoder: Self::Encoder) -> Result<()>;

    /// Joins chunks into one playable resource. An empty slice yields an empty clip.
    fn concat_chunks(&self, chunks: Vec<Self::Blob>, mime_type: &str) -> Result<Self::Blob>;

    fn offer_download(&self, blob: &Self::Blob, file_name: &str) -> Result<()>;

    /// Current time as an ISO 8601 string.
    fn now_iso(&self) -> String;
}
