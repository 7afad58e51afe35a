use serde::{Deserialize, Serialize};

use crate::error::{CameraError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub photo: PhotoConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
}

/// Constraints passed to getUserMedia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_ideal_width")]
    pub ideal_width: u32,
    #[serde(default = "default_ideal_height")]
    pub ideal_height: u32,
    #[serde(default = "default_audio")]
    pub audio: bool,
}

/// Fixed size of the preview canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_display_width")]
    pub width: u32,
    #[serde(default = "default_display_height")]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    #[serde(default = "default_zoom_min")]
    pub min: f64,
    #[serde(default = "default_zoom_max")]
    pub max: f64,
    #[serde(default = "default_zoom_step")]
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoConfig {
    #[serde(default = "default_photo_mime")]
    pub mime_type: String,
    #[serde(default = "default_photo_quality")]
    pub quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    #[serde(default = "default_video_mime")]
    pub mime_type: String,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    /// When set, the encoder emits a chunk every `timeslice_ms` instead of once on stop.
    #[serde(default)]
    pub timeslice_ms: Option<u32>,
}

fn default_ideal_width() -> u32 {
    1280
}

fn default_ideal_height() -> u32 {
    720
}

fn default_audio() -> bool {
    true
}

fn default_display_width() -> u32 {
    640
}

fn default_display_height() -> u32 {
    480
}

fn default_zoom_min() -> f64 {
    1.0
}

fn default_zoom_max() -> f64 {
    4.0
}

fn default_zoom_step() -> f64 {
    0.1
}

fn default_photo_mime() -> String {
    "image/jpeg".to_string()
}

fn default_photo_quality() -> f64 {
    0.92
}

fn default_video_mime() -> String {
    "video/mp4".to_string()
}

fn default_frame_rate() -> f64 {
    30.0
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ideal_width: default_ideal_width(),
            ideal_height: default_ideal_height(),
            audio: default_audio(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_display_width(),
            height: default_display_height(),
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: default_zoom_min(),
            max: default_zoom_max(),
            step: default_zoom_step(),
        }
    }
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            mime_type: default_photo_mime(),
            quality: default_photo_quality(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            mime_type: default_video_mime(),
            frame_rate: default_frame_rate(),
            timeslice_ms: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            display: DisplayConfig::default(),
            zoom: ZoomConfig::default(),
            photo: PhotoConfig::default(),
            recording: RecordingConfig::default(),
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<()> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(CameraError::ConfigError(
                "display size must be non-zero".to_string(),
            ));
        }
        if self.capture.ideal_width == 0 || self.capture.ideal_height == 0 {
            return Err(CameraError::ConfigError(
                "ideal capture size must be non-zero".to_string(),
            ));
        }
        let zoom = &self.zoom;
        if !(zoom.min.is_finite() && zoom.max.is_finite()) || zoom.min < 1.0 || zoom.max < zoom.min {
            return Err(CameraError::ConfigError(format!(
                "invalid zoom range [{}, {}]",
                zoom.min, zoom.max
            )));
        }
        if !(zoom.step > 0.0) {
            return Err(CameraError::ConfigError("zoom step must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.photo.quality) {
            return Err(CameraError::ConfigError(format!(
                "photo quality {} outside 0.0..=1.0",
                self.photo.quality
            )));
        }
        if !self.photo.mime_type.starts_with("image/") {
            return Err(CameraError::ConfigError(format!(
                "photo mime type {:?} is not an image type",
                self.photo.mime_type
            )));
        }
        if !self.recording.mime_type.starts_with("video/") {
            return Err(CameraError::ConfigError(format!(
                "recording mime type {:?} is not a video type",
                self.recording.mime_type
            )));
        }
        if !(self.recording.frame_rate > 0.0) {
            return Err(CameraError::ConfigError("frame rate must be positive".to_string()));
        }
        Ok(())
    }
}
