pub mod app;
pub mod artifact;
pub mod config;
pub mod controls;
pub mod crop;
pub mod device;
pub mod error;
pub mod platform;
pub mod recording;

#[cfg(test)]
mod mock;

pub use app::CameraApp;
pub use artifact::{Artifact, ArtifactKind, ArtifactSummary};
pub use config::CameraConfig;
pub use controls::ControlState;
pub use crop::{compute_crop, CropRect, FrameSize, ZoomLevel};
pub use device::{CameraDevice, DeviceList};
pub use error::{CameraError, Result};
pub use platform::{MediaBlob, MediaPlatform, StreamRequest};
pub use recording::{ChunkBuffer, RecordingState, SharedChunks};
