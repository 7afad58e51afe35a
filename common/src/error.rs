use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("No camera device found")]
    NoDevice,

    #[error("Camera access denied: {0}")]
    AccessDenied(String),

    #[error("Camera is busy or could not be started: {0}")]
    DeviceBusy(String),

    #[error("Recording format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Nothing to export")]
    NothingToExport,

    #[error("No active camera stream")]
    NoActiveStream,

    #[error("No video frame available")]
    FrameUnavailable,

    #[error("Recording already in progress")]
    RecordingInProgress,

    #[error("Not recording")]
    NotRecording,

    #[error("Camera index {0} out of range")]
    DeviceIndexOutOfRange(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Platform error: {0}")]
    Platform(String),
}

impl CameraError {
    /// Text shown in the status region.
    pub fn user_message(&self) -> String {
        match self {
            CameraError::NoDevice => "No camera found on this device.".to_string(),
            CameraError::AccessDenied(_) => {
                "Camera access was denied. Allow camera and microphone access, then select the camera again."
                    .to_string()
            }
            CameraError::DeviceBusy(_) => {
                "The camera is in use by another application or could not be started.".to_string()
            }
            CameraError::UnsupportedFormat(mime) => {
                format!("This browser cannot record {}.", mime)
            }
            CameraError::NothingToExport => "Nothing to save yet. Take a photo or record a clip first.".to_string(),
            CameraError::NoActiveStream => "No camera stream is active.".to_string(),
            CameraError::FrameUnavailable => "The camera has not produced a frame yet.".to_string(),
            CameraError::RecordingInProgress => "Stop the recording first.".to_string(),
            CameraError::NotRecording => "No recording in progress.".to_string(),
            other => other.to_string(),
        }
    }

    /// Errors that leave the user without any usable camera.
    pub fn is_device_failure(&self) -> bool {
        matches!(
            self,
            CameraError::NoDevice | CameraError::AccessDenied(_) | CameraError::DeviceBusy(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CameraError>;
