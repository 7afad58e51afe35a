use serde::{Deserialize, Serialize};

use crate::error::{CameraError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDevice {
    pub id: String,
    /// Empty until the user has granted camera permission.
    #[serde(default)]
    pub label: String,
}

impl CameraDevice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Device id usable as an exact constraint, if the browser exposed one.
    pub fn constraint_id(&self) -> Option<&str> {
        if self.id.is_empty() {
            None
        } else {
            Some(&self.id)
        }
    }
}

/// Enumerated cameras and the index of the active one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceList {
    devices: Vec<CameraDevice>,
    active: usize,
    labels_refreshed: bool,
}

impl DeviceList {
    pub fn new(devices: Vec<CameraDevice>) -> Self {
        Self {
            devices,
            active: 0,
            labels_refreshed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&CameraDevice> {
        self.devices.get(self.active)
    }

    /// Switching only makes sense with more than one camera.
    pub fn can_switch(&self) -> bool {
        self.devices.len() > 1
    }

    pub fn select(&mut self, index: usize) -> Result<&CameraDevice> {
        if index >= self.devices.len() {
            return Err(CameraError::DeviceIndexOutOfRange(index));
        }
        self.active = index;
        Ok(&self.devices[index])
    }

    /// Moves to the next camera, wrapping around.
    pub fn advance(&mut self) -> Result<&CameraDevice> {
        if self.devices.is_empty() {
            return Err(CameraError::NoDevice);
        }
        self.active = (self.active + 1) % self.devices.len();
        Ok(&self.devices[self.active])
    }

    pub fn labels_refreshed(&self) -> bool {
        self.labels_refreshed
    }

    /// Replaces the list with a post-permission enumeration.
    ///
    /// `live_id` is the device id reported by the playing track. It wins over
    /// the previously active id, since the first request may have gone out with
    /// no device id at all. Without a match the index is kept if in range, or
    /// reset to 0.
    pub fn refresh(&mut self, devices: Vec<CameraDevice>, live_id: Option<&str>) {
        let active_id = live_id
            .map(str::to_string)
            .or_else(|| self.active().map(|d| d.id.clone()))
            .filter(|id| !id.is_empty());

        let position = active_id.and_then(|id| devices.iter().position(|d| d.id == id));
        self.active = match position {
            Some(index) => index,
            None if self.active < devices.len() => self.active,
            None => 0,
        };
        self.devices = devices;
        self.labels_refreshed = true;
    }

    /// Label for the dropdown: the device label, or `Camera N` before permission.
    pub fn display_label(&self, index: usize) -> String {
        match self.devices.get(index) {
            Some(device) if !device.label.trim().is_empty() => device.label.clone(),
            _ => format!("Camera {}", index + 1),
        }
    }
}
