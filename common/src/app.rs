//! Application state owned by the page and handed to every UI handler.

use crate::artifact::{Artifact, ArtifactSummary};
use crate::config::CameraConfig;
use crate::controls::{ControlInputs, ControlState};
use crate::crop::{compute_crop, CropRect, ZoomLevel};
use crate::device::DeviceList;
use crate::error::{CameraError, Result};
use crate::platform::{MediaBlob, MediaPlatform, StreamRequest};
use crate::recording::{shared_chunks, RecordingState, SharedChunks};

pub struct CameraApp<P: MediaPlatform> {
    platform: P,
    config: CameraConfig,
    devices: DeviceList,
    stream: Option<P::Stream>,
    zoom: ZoomLevel,
    recording: RecordingState,
    encoder: Option<P::Encoder>,
    chunks: SharedChunks<P::Blob>,
    artifact: Option<Artifact<P::Blob>>,
    render_started: bool,
}

impl<P: MediaPlatform> CameraApp<P> {
    pub fn new(platform: P, config: CameraConfig) -> Result<Self> {
        config.validate()?;
        let zoom = ZoomLevel::new(&config.zoom);

        Ok(Self {
            platform,
            config,
            devices: DeviceList::default(),
            stream: None,
            zoom,
            recording: RecordingState::Idle,
            encoder: None,
            chunks: shared_chunks(),
            artifact: None,
            render_started: false,
        })
    }

    pub fn devices(&self) -> &DeviceList {
        &self.devices
    }

    pub fn zoom(&self) -> &ZoomLevel {
        &self.zoom
    }

    pub fn recording_state(&self) -> RecordingState {
        self.recording
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn artifact_summary(&self) -> Option<ArtifactSummary> {
        self.artifact.as_ref().map(|artifact| ArtifactSummary {
            kind: artifact.kind(),
            mime_type: artifact.mime_type().to_string(),
            size_bytes: artifact.blob().size_bytes(),
        })
    }

    pub fn controls(&self) -> ControlState {
        ControlState::derive(&ControlInputs {
            can_switch: self.devices.can_switch(),
            stream_active: self.stream.is_some(),
            recording: self.recording,
            has_artifact: self.artifact.is_some(),
        })
    }

    /// Enumerates cameras and opens the first one.
    pub async fn initialize(&mut self) -> Result<()> {
        let cameras = self.platform.enumerate_cameras().await?;
        log::info!("Found {} camera(s)", cameras.len());

        self.devices = DeviceList::new(cameras);
        if self.devices.is_empty() {
            return Err(CameraError::NoDevice);
        }

        self.acquire().await
    }

    /// Replaces the active stream with a new one for the active device.
    ///
    /// The previous stream is always stopped first. On failure no stream is left active.
    pub async fn acquire(&mut self) -> Result<()> {
        self.release();

        let request = self.stream_request();
        log::info!("Requesting camera stream (device: {:?})", request.device_id);

        let stream = match self.platform.open_stream(&request).await {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("Camera stream request failed: {}", e);
                return Err(e);
            }
        };

        if let Err(e) = self.platform.attach_preview(&stream).await {
            log::warn!("Preview playback failed: {}", e);
            self.platform.close_stream(&stream);
            return Err(e);
        }
        let live_id = self.platform.stream_device_id(&stream);
        self.stream = Some(stream);

        if !self.devices.labels_refreshed() {
            match self.platform.enumerate_cameras().await {
                Ok(cameras) if !cameras.is_empty() => {
                    log::debug!("Refreshed camera labels after permission grant");
                    self.devices.refresh(cameras, live_id.as_deref());
                }
                Ok(_) => log::warn!("Camera list came back empty after permission grant"),
                Err(e) => log::warn!("Failed to refresh camera labels: {}", e),
            }
        }

        Ok(())
    }

    /// Stops every track of the active stream. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            log::debug!("Releasing camera stream");
            self.platform.close_stream(&stream);
        }
    }

    pub async fn switch_to_next(&mut self) -> Result<()> {
        self.ensure_not_recording()?;
        self.zoom.reset();
        let device = self.devices.advance()?;
        log::info!("Switching to camera {:?}", device.label);
        self.acquire().await
    }

    pub async fn select_device(&mut self, index: usize) -> Result<()> {
        self.ensure_not_recording()?;
        self.zoom.reset();
        self.devices.select(index)?;
        log::info!("Selected camera #{}", index);
        self.acquire().await
    }

    /// Applies a slider value; returns the clamped zoom actually in effect.
    pub fn set_zoom(&mut self, value: f64) -> f64 {
        self.zoom.set(value)
    }

    /// Crop of the live frame for the current zoom, if a frame is available.
    pub fn current_crop(&self) -> Option<CropRect> {
        if self.stream.is_none() {
            return None;
        }
        let frame = self.platform.frame_size().filter(|f| !f.is_empty())?;
        Some(compute_crop(frame, self.zoom.factor()))
    }

    /// Draws one preview frame. Returns `Ok(false)` when there was nothing to draw.
    pub fn render_frame(&self) -> Result<bool> {
        match self.current_crop() {
            Some(crop) => {
                self.platform.draw_preview(&crop)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns true exactly once, the first time a stream is playing.
    pub fn mark_render_started(&mut self) -> bool {
        if self.render_started || self.stream.is_none() {
            return false;
        }
        self.render_started = true;
        true
    }

    pub async fn capture_photo(&mut self) -> Result<()> {
        self.ensure_not_recording()?;
        if self.stream.is_none() {
            return Err(CameraError::NoActiveStream);
        }
        let crop = self.current_crop().ok_or(CameraError::FrameUnavailable)?;

        let photo = &self.config.photo;
        let blob = self
            .platform
            .encode_still(&crop, &photo.mime_type, photo.quality)
            .await?;

        let size = crop.surface_size();
        log::info!(
            "Captured photo {}x{} ({} bytes)",
            size.width,
            size.height,
            blob.size_bytes()
        );
        self.artifact = Some(Artifact::Photo {
            blob,
            mime_type: photo.mime_type.clone(),
        });
        Ok(())
    }

    pub fn start_recording(&mut self) -> Result<()> {
        self.ensure_not_recording()?;
        let stream = self.stream.as_ref().ok_or(CameraError::NoActiveStream)?;

        let settings = &self.config.recording;
        if !self.platform.supports_recording_format(&settings.mime_type) {
            return Err(CameraError::UnsupportedFormat(settings.mime_type.clone()));
        }

        self.chunks.borrow_mut().clear();
        let encoder = self.platform.start_encoder(
            stream,
            &settings.mime_type,
            settings.frame_rate,
            settings.timeslice_ms,
            self.chunks.clone(),
        )?;

        self.encoder = Some(encoder);
        self.recording = RecordingState::Recording;
        log::info!("Recording started ({})", settings.mime_type);
        Ok(())
    }

    /// Ends the recording and publishes the clip once the encoder has flushed.
    pub async fn stop_recording(&mut self) -> Result<()> {
        if !self.recording.is_recording() {
            return Err(CameraError::NotRecording);
        }
        self.recording = RecordingState::Idle;

        if let Some(encoder) = self.encoder.take() {
            if let Err(e) = self.platform.finish_encoder(encoder).await {
                self.chunks.borrow_mut().clear();
                return Err(e);
            }
        }

        let chunks = self.chunks.borrow_mut().take();
        let chunk_count = chunks.len();
        let mime_type = self.config.recording.mime_type.clone();
        let blob = self.platform.concat_chunks(chunks, &mime_type)?;

        log::info!(
            "Recording finished: {} chunk(s), {} bytes",
            chunk_count,
            blob.size_bytes()
        );
        self.artifact = Some(Artifact::Video { blob, mime_type });
        Ok(())
    }

    /// Offers the current artifact as a download and returns the file name used.
    pub fn save(&self) -> Result<String> {
        let artifact = self.artifact.as_ref().ok_or(CameraError::NothingToExport)?;
        let file_name = artifact.file_name(&self.platform.now_iso());
        self.platform.offer_download(artifact.blob(), &file_name)?;
        log::info!("Offered {} as {}", artifact.kind().as_str(), file_name);
        Ok(file_name)
    }

    /// Page teardown. A recording in progress ends with its stream and yields no clip.
    pub fn shutdown(&mut self) {
        if self.recording.is_recording() {
            log::warn!("Page closing during recording; discarding clip");
            self.recording = RecordingState::Idle;
            self.encoder = None;
            self.chunks.borrow_mut().clear();
        }
        self.release();
    }

    fn ensure_not_recording(&self) -> Result<()> {
        if self.recording.is_recording() {
            Err(CameraError::RecordingInProgress)
        } else {
            Ok(())
        }
    }

    fn stream_request(&self) -> StreamRequest {
        StreamRequest {
            device_id: self
                .devices
                .active()
                .and_then(|d| d.constraint_id())
                .map(str::to_string),
            ideal_width: self.config.capture.ideal_width,
            ideal_height: self.config.capture.ideal_height,
            audio: self.config.capture.audio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactKind;
    use crate::crop::FrameSize;
    use crate::device::CameraDevice;
    use crate::mock::MockPlatform;
    use futures::executor::block_on;

    fn app_with(cameras: Vec<CameraDevice>) -> CameraApp<MockPlatform> {
        let platform = MockPlatform::with_cameras(cameras);
        CameraApp::new(platform, CameraConfig::default()).unwrap()
    }

    fn one_camera() -> Vec<CameraDevice> {
        vec![CameraDevice::new("cam-1", "")]
    }

    fn two_cameras() -> Vec<CameraDevice> {
        vec![
            CameraDevice::new("cam-1", "Front"),
            CameraDevice::new("cam-2", "Back"),
        ]
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = CameraConfig::default();
        config.zoom.max = 0.5;
        assert!(CameraApp::new(MockPlatform::default(), config).is_err());
    }

    #[test]
    fn test_no_devices_reports_and_hides_switch() {
        let mut app = app_with(vec![]);
        let err = block_on(app.initialize()).unwrap_err();
        assert_eq!(err, CameraError::NoDevice);
        assert_eq!(err.user_message(), "No camera found on this device.");
        assert!(!app.has_stream());

        let controls = app.controls();
        assert!(!controls.switch_visible);
        assert!(!controls.select_visible);
        assert!(app.platform.opened.borrow().is_empty());
    }

    #[test]
    fn test_single_device_photo_scenario() {
        let mut app = app_with(one_camera());
        block_on(app.initialize()).unwrap();

        let opened = app.platform.opened.borrow().clone();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].device_id.as_deref(), Some("cam-1"));
        assert_eq!(opened[0].ideal_width, 1280);
        assert!(opened[0].audio);

        // no frame yet: loop reschedules without drawing
        assert!(!app.render_frame().unwrap());
        app.platform.frame.set(Some(FrameSize::new(1280, 720)));
        assert!(app.mark_render_started());
        assert!(!app.mark_render_started());
        assert!(app.render_frame().unwrap());

        block_on(app.capture_photo()).unwrap();
        assert_eq!(app.artifact_summary().unwrap().kind, ArtifactKind::Photo);

        let name = app.save().unwrap();
        assert_eq!(name, "photo-2024-01-01T00:00:00.000Z.jpg");
        assert!(name.starts_with("photo-") && name.ends_with(".jpg"));
        assert_eq!(app.platform.downloads.borrow()[0].0, name);
    }

    #[test]
    fn test_labels_refreshed_once_after_permission() {
        let mut app = app_with(one_camera());
        block_on(app.initialize()).unwrap();
        assert_eq!(app.platform.enumerate_calls.get(), 2);
        assert!(app.devices().labels_refreshed());

        block_on(app.acquire()).unwrap();
        assert_eq!(app.platform.enumerate_calls.get(), 2);
    }

    #[test]
    fn test_preview_and_capture_use_identical_crop() {
        let mut app = app_with(one_camera());
        block_on(app.initialize()).unwrap();
        app.platform.frame.set(Some(FrameSize::new(1920, 1080)));

        let mut zoom = 1.0;
        while zoom <= 4.0 {
            app.set_zoom(zoom);
            app.render_frame().unwrap();
            block_on(app.capture_photo()).unwrap();

            let drawn = *app.platform.drawn.borrow().last().unwrap();
            let still = *app.platform.stills.borrow().last().unwrap();
            assert_eq!(drawn, still);
            assert_eq!(still, compute_crop(FrameSize::new(1920, 1080), app.zoom().factor()));
            zoom += 0.25;
        }
    }

    #[test]
    fn test_switch_resets_zoom_and_opens_next_device() {
        let mut app = app_with(two_cameras());
        block_on(app.initialize()).unwrap();
        app.set_zoom(3.0);

        block_on(app.switch_to_next()).unwrap();
        assert_eq!(app.zoom().factor(), 1.0);
        assert_eq!(app.devices().active_index(), 1);

        let opened = app.platform.opened.borrow().clone();
        assert_eq!(opened.last().unwrap().device_id.as_deref(), Some("cam-2"));
        // previous stream stopped before the new one
        assert_eq!(app.platform.closed.borrow().as_slice(), &[0]);
        assert!(app.has_stream());
    }

    #[test]
    fn test_zoom_reset_happens_before_acquire() {
        let mut app = app_with(two_cameras());
        block_on(app.initialize()).unwrap();
        app.set_zoom(2.0);
        *app.platform.open_error.borrow_mut() =
            Some(CameraError::DeviceBusy("NotReadableError".into()));

        let err = block_on(app.switch_to_next()).unwrap_err();
        assert!(matches!(err, CameraError::DeviceBusy(_)));
        assert_eq!(app.zoom().factor(), 1.0);
        assert!(!app.has_stream());
    }

    #[test]
    fn test_select_device_out_of_range() {
        let mut app = app_with(two_cameras());
        block_on(app.initialize()).unwrap();
        let err = block_on(app.select_device(7)).unwrap_err();
        assert_eq!(err, CameraError::DeviceIndexOutOfRange(7));
        // current stream untouched
        assert!(app.has_stream());
    }

    #[test]
    fn test_access_denied_leaves_no_stream() {
        let mut app = app_with(one_camera());
        *app.platform.open_error.borrow_mut() =
            Some(CameraError::AccessDenied("NotAllowedError".into()));
        let err = block_on(app.initialize()).unwrap_err();
        assert!(err.is_device_failure());
        assert!(!app.has_stream());
        assert!(!app.mark_render_started());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut app = app_with(one_camera());
        block_on(app.initialize()).unwrap();
        app.release();
        app.release();
        assert_eq!(app.platform.closed.borrow().len(), 1);
    }

    #[test]
    fn test_start_recording_without_stream() {
        let mut app = app_with(one_camera());
        assert_eq!(app.start_recording().unwrap_err(), CameraError::NoActiveStream);
        assert_eq!(app.recording_state(), RecordingState::Idle);
    }

    #[test]
    fn test_unsupported_codec_stays_idle() {
        let mut app = app_with(one_camera());
        block_on(app.initialize()).unwrap();
        *app.platform.reject_mime.borrow_mut() = Some("video/mp4".to_string());

        let err = app.start_recording().unwrap_err();
        assert_eq!(err, CameraError::UnsupportedFormat("video/mp4".to_string()));
        assert_eq!(app.recording_state(), RecordingState::Idle);
        // rejected before any encoder resources exist
        assert_eq!(app.platform.encoders_started.get(), 0);
        assert!(app.encoder.is_none());
    }

    #[test]
    fn test_failed_playback_closes_new_stream() {
        let mut app = app_with(one_camera());
        *app.platform.attach_error.borrow_mut() =
            Some(CameraError::DeviceBusy("AbortError".into()));

        let err = block_on(app.initialize()).unwrap_err();
        assert!(matches!(err, CameraError::DeviceBusy(_)));
        assert!(!app.has_stream());
        assert_eq!(app.platform.closed.borrow().as_slice(), &[0]);
        assert!(!app.mark_render_started());
        assert!(!app.controls().record_enabled);

        // a retry opens a fresh stream
        block_on(app.acquire()).unwrap();
        assert!(app.has_stream());
        assert_eq!(app.platform.closed.borrow().len(), 1);
    }

    #[test]
    fn test_failed_finalization_keeps_previous_artifact() {
        let mut app = app_with(one_camera());
        block_on(app.initialize()).unwrap();
        app.platform.frame.set(Some(FrameSize::new(640, 480)));
        block_on(app.capture_photo()).unwrap();

        app.start_recording().unwrap();
        app.chunks.borrow_mut().push(vec![7, 7]);
        *app.platform.finish_error.borrow_mut() =
            Some(CameraError::Platform("encoder error".into()));

        let err = block_on(app.stop_recording()).unwrap_err();
        assert_eq!(err, CameraError::Platform("encoder error".into()));
        assert_eq!(app.recording_state(), RecordingState::Idle);
        assert_eq!(app.artifact_summary().unwrap().kind, ArtifactKind::Photo);
        assert!(app.chunks.borrow().is_empty());

        // the next recording starts from a clean buffer
        app.start_recording().unwrap();
        block_on(app.stop_recording()).unwrap();
        assert_eq!(app.artifact_summary().unwrap().size_bytes, 0);
    }

    #[test]
    fn test_active_camera_follows_opened_device_after_permission() {
        let platform = MockPlatform::with_cameras(vec![CameraDevice::new("", "")]);
        *platform.granted_cameras.borrow_mut() = Some(two_cameras());
        *platform.default_device.borrow_mut() = Some("cam-2".to_string());
        let mut app = CameraApp::new(platform, CameraConfig::default()).unwrap();

        block_on(app.initialize()).unwrap();
        assert_eq!(app.platform.opened.borrow()[0].device_id, None);
        assert_eq!(app.devices().active_index(), 1);
        assert_eq!(app.devices().display_label(1), "Back");
        assert!(app.controls().switch_visible);

        block_on(app.switch_to_next()).unwrap();
        let opened = app.platform.opened.borrow().clone();
        assert_eq!(opened.last().unwrap().device_id.as_deref(), Some("cam-1"));
    }

    #[test]
    fn test_stop_with_no_chunks_yields_empty_clip() {
        let mut app = app_with(one_camera());
        block_on(app.initialize()).unwrap();
        app.start_recording().unwrap();
        assert_eq!(app.recording_state(), RecordingState::Recording);

        block_on(app.stop_recording()).unwrap();
        assert_eq!(app.recording_state(), RecordingState::Idle);
        let summary = app.artifact_summary().unwrap();
        assert_eq!(summary.kind, ArtifactKind::Video);
        assert_eq!(summary.size_bytes, 0);
    }

    #[test]
    fn test_chunks_concatenated_in_order() {
        let mut app = app_with(one_camera());
        block_on(app.initialize()).unwrap();
        *app.platform.pending_chunks.borrow_mut() = vec![vec![1, 2], vec![3], vec![4, 5, 6]];

        app.start_recording().unwrap();
        block_on(app.stop_recording()).unwrap();

        match app.artifact.as_ref().unwrap() {
            Artifact::Video { blob, mime_type } => {
                assert_eq!(blob, &vec![1, 2, 3, 4, 5, 6]);
                assert_eq!(mime_type, "video/mp4");
            }
            other => panic!("expected video, got {:?}", other),
        }
    }

    #[test]
    fn test_stop_when_idle() {
        let mut app = app_with(one_camera());
        assert_eq!(
            block_on(app.stop_recording()).unwrap_err(),
            CameraError::NotRecording
        );
    }

    #[test]
    fn test_latest_artifact_wins() {
        let mut app = app_with(one_camera());
        block_on(app.initialize()).unwrap();
        app.platform.frame.set(Some(FrameSize::new(640, 480)));

        block_on(app.capture_photo()).unwrap();
        app.start_recording().unwrap();
        block_on(app.stop_recording()).unwrap();

        let name = app.save().unwrap();
        assert!(name.starts_with("video-") && name.ends_with(".mp4"));
        assert_eq!(app.platform.downloads.borrow().len(), 1);
    }

    #[test]
    fn test_save_without_artifact_is_noop() {
        let app = app_with(one_camera());
        assert_eq!(app.save().unwrap_err(), CameraError::NothingToExport);
        assert!(app.platform.downloads.borrow().is_empty());
    }

    #[test]
    fn test_recording_locks_everything_but_zoom() {
        let mut app = app_with(two_cameras());
        block_on(app.initialize()).unwrap();
        app.platform.frame.set(Some(FrameSize::new(640, 480)));
        app.start_recording().unwrap();

        assert_eq!(
            block_on(app.switch_to_next()).unwrap_err(),
            CameraError::RecordingInProgress
        );
        assert_eq!(
            block_on(app.select_device(0)).unwrap_err(),
            CameraError::RecordingInProgress
        );
        assert_eq!(
            block_on(app.capture_photo()).unwrap_err(),
            CameraError::RecordingInProgress
        );
        assert_eq!(app.start_recording().unwrap_err(), CameraError::RecordingInProgress);

        assert_eq!(app.set_zoom(2.0), 2.0);
        app.render_frame().unwrap();
        let drawn = *app.platform.drawn.borrow().last().unwrap();
        assert_eq!(drawn.width, 320.0);
        assert_eq!(app.devices().active_index(), 0);
    }

    #[test]
    fn test_capture_without_frame() {
        let mut app = app_with(one_camera());
        assert_eq!(
            block_on(app.capture_photo()).unwrap_err(),
            CameraError::NoActiveStream
        );
        block_on(app.initialize()).unwrap();
        assert_eq!(
            block_on(app.capture_photo()).unwrap_err(),
            CameraError::FrameUnavailable
        );
    }

    #[test]
    fn test_shutdown_discards_recording_and_releases() {
        let mut app = app_with(one_camera());
        block_on(app.initialize()).unwrap();
        app.start_recording().unwrap();

        app.shutdown();
        assert_eq!(app.recording_state(), RecordingState::Idle);
        assert!(!app.has_stream());
        assert!(app.artifact.as_ref().is_none());
        app.shutdown();
        assert_eq!(app.platform.closed.borrow().len(), 1);
    }
}
