use serde::Serialize;

use crate::recording::RecordingState;

/// Inputs the control layout depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInputs {
    /// More than one camera to choose from.
    pub can_switch: bool,
    pub stream_active: bool,
    pub recording: RecordingState,
    pub has_artifact: bool,
}

/// Visibility and enabled flags for every control on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub capture_enabled: bool,
    pub record_enabled: bool,
    pub record_label: &'static str,
    pub switch_visible: bool,
    pub switch_enabled: bool,
    pub select_visible: bool,
    pub select_enabled: bool,
    pub zoom_enabled: bool,
    pub save_enabled: bool,
}

impl ControlState {
    pub fn derive(inputs: &ControlInputs) -> Self {
        let recording = inputs.recording.is_recording();
        let live = inputs.stream_active;
        let multi = inputs.can_switch;

        Self {
            capture_enabled: live && !recording,
            // while recording the toggle is the stop button and stays usable
            record_enabled: recording || live,
            record_label: if recording { "Stop" } else { "Record" },
            switch_visible: multi,
            switch_enabled: multi && !recording,
            select_visible: multi,
            select_enabled: multi && !recording,
            zoom_enabled: live,
            save_enabled: inputs.has_artifact && !recording,
        }
    }
}
