use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, Document, HtmlVideoElement, MediaRecorder, MediaStream, MediaStreamTrack,
};

use common::{
    CameraDevice, CropRect, FrameSize, MediaBlob, MediaPlatform, Result,
    SharedChunks, StreamRequest,
};

use crate::canvas_renderer::CanvasRenderer;
use crate::media_recorder::Recorder;
use crate::media_streams::{
    classify_error, get_camera_stream, list_video_inputs, stop_stream, stop_video_tracks,
    stream_device_id,
};
use crate::utils::{current_timestamp_utc, download_blob, platform_error};

/// A browser `Blob` holding a photo, a clip, or one encoder chunk.
#[derive(Debug, Clone)]
pub struct MediaFile(pub Blob);

impl MediaBlob for MediaFile {
    fn size_bytes(&self) -> u64 {
        self.0.size() as u64
    }
}

pub struct BrowserPlatform {
    document: Document,
    video: HtmlVideoElement,
    renderer: CanvasRenderer,
}

impl BrowserPlatform {
    pub fn new(document: Document, video: HtmlVideoElement, renderer: CanvasRenderer) -> Self {
        Self {
            document,
            video,
            renderer,
        }
    }
}

impl MediaPlatform for BrowserPlatform {
    type Stream = MediaStream;
    type Blob = MediaFile;
    type Encoder = Recorder;

    async fn enumerate_cameras(&self) -> Result<Vec<CameraDevice>> {
        list_video_inputs().await.map_err(platform_error)
    }

    async fn open_stream(&self, request: &StreamRequest) -> Result<MediaStream> {
        get_camera_stream(request)
            .await
            .map_err(|e| classify_error(&e))
    }

    fn close_stream(&self, stream: &MediaStream) {
        stop_stream(stream);
        if self.video.src_object().as_ref() == Some(stream) {
            self.video.set_src_object(None);
        }
    }

    fn stream_device_id(&self, stream: &MediaStream) -> Option<String> {
        stream_device_id(stream)
    }

    async fn attach_preview(&self, stream: &MediaStream) -> Result<()> {
        // the preview element stays muted so the microphone does not feed back
        self.video.set_muted(true);
        self.video.set_src_object(Some(stream));
        let playing = self.video.play().map_err(platform_error)?;
        JsFuture::from(playing).await.map_err(platform_error)?;
        Ok(())
    }

    fn frame_size(&self) -> Option<FrameSize> {
        CanvasRenderer::video_frame_size(&self.video)
    }

    fn draw_preview(&self, crop: &CropRect) -> Result<()> {
        self.renderer
            .draw_crop(&self.video, crop)
            .map_err(platform_error)
    }

    async fn encode_still(&self, crop: &CropRect, mime_type: &str, quality: f64) -> Result<MediaFile> {
        CanvasRenderer::encode_crop(&self.document, &self.video, crop, mime_type, quality)
            .await
            .map(MediaFile)
            .map_err(platform_error)
    }

    fn supports_recording_format(&self, mime_type: &str) -> bool {
        MediaRecorder::is_type_supported(mime_type)
    }

    fn start_encoder(
        &self,
        source: &MediaStream,
        mime_type: &str,
        frame_rate: f64,
        timeslice_ms: Option<u32>,
        chunks: SharedChunks<MediaFile>,
    ) -> Result<Recorder> {
        let combined = self
            .renderer
            .get_canvas_stream(frame_rate)
            .map_err(platform_error)?;

        let audio_tracks = source.get_audio_tracks();
        log::debug!("Adding {} audio track(s) to recording", audio_tracks.length());
        for i in 0..audio_tracks.length() {
            combined.add_track(&MediaStreamTrack::from(audio_tracks.get(i)));
        }

        let recorder = match Recorder::new(combined.clone(), mime_type, chunks) {
            Ok(recorder) => recorder,
            Err(e) => {
                // no Recorder owns the canvas track yet
                stop_video_tracks(&combined);
                return Err(e);
            }
        };
        // on failure the dropped recorder stops the canvas track
        recorder.start(timeslice_ms)?;
        Ok(recorder)
    }

    async fn finish_encoder(&self, encoder: Recorder) -> Result<()> {
        encoder.stop().await.map_err(platform_error)
    }

    fn concat_chunks(&self, chunks: Vec<MediaFile>, mime_type: &str) -> Result<MediaFile> {
        let parts = js_sys::Array::new();
        for chunk in &chunks {
            parts.push(&chunk.0);
        }

        let options = BlobPropertyBag::new();
        options.set_type(mime_type);
        Blob::new_with_blob_sequence_and_options(&parts, &options)
            .map(MediaFile)
            .map_err(platform_error)
    }

    fn offer_download(&self, blob: &MediaFile, file_name: &str) -> Result<()> {
        download_blob(&blob.0, file_name).map_err(platform_error)
    }

    fn now_iso(&self) -> String {
        current_timestamp_utc()
    }
}
