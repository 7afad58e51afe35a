//! Digital zoom: the crop rectangle shared by preview, still capture and recording.

use serde::{Deserialize, Serialize};

use crate::config::ZoomConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Source rectangle in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Pixel size of a surface holding exactly this crop, never smaller than 1x1.
    pub fn surface_size(&self) -> FrameSize {
        FrameSize {
            width: (self.width.round() as u32).max(1),
            height: (self.height.round() as u32).max(1),
        }
    }
}

/// Centered crop of `frame` for the given zoom factor.
///
/// Zoom values below 1.0 or non-finite values are treated as 1.0, so the crop
/// never exceeds the frame.
pub fn compute_crop(frame: FrameSize, zoom: f64) -> CropRect {
    let zoom = if zoom.is_finite() && zoom >= 1.0 { zoom } else { 1.0 };
    let frame_w = frame.width as f64;
    let frame_h = frame.height as f64;

    let width = frame_w / zoom;
    let height = frame_h / zoom;

    CropRect {
        x: (frame_w - width) / 2.0,
        y: (frame_h - height) / 2.0,
        width,
        height,
    }
}

/// Zoom factor bounded by the configured range.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomLevel {
    value: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl ZoomLevel {
    pub fn new(config: &ZoomConfig) -> Self {
        Self {
            value: config.min,
            min: config.min,
            max: config.max,
            step: config.step,
        }
    }

    pub fn factor(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Sets the zoom, clamped into range. NaN is ignored. Returns the applied value.
    pub fn set(&mut self, value: f64) -> f64 {
        if !value.is_nan() {
            self.value = value.clamp(self.min, self.max);
        }
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 1.0_f64.clamp(self.min, self.max);
    }

    pub fn label(&self) -> String {
        format!("{:.1}x", self.value)
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::new(&ZoomConfig::default())
    }
}
