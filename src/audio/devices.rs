//! Input device enumeration
//!
//! The settings panel lists devices by name; capture opens them by index
//! into the same enumeration order.

use crate::{ParleyError, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::Device;
use tracing::warn;

/// Names of the available input devices, in enumeration order.
pub fn input_device_names() -> Vec<String> {
    let host = cpal::default_host();

    match host.input_devices() {
        Ok(devices) => devices
            .map(|d| d.name().unwrap_or_else(|_| "Unknown device".to_string()))
            .collect(),
        Err(e) => {
            warn!("failed to enumerate input devices: {e}");
            Vec::new()
        }
    }
}

/// Open the input device at `index` in enumeration order.
pub fn input_device_by_index(index: usize) -> Result<Device> {
    let host = cpal::default_host();

    let devices = host.input_devices().map_err(|e| {
        ParleyError::AudioDeviceError(format!("failed to enumerate input devices: {e}"))
    })?;

    devices.into_iter().nth(index).ok_or_else(|| {
        ParleyError::AudioDeviceError(format!("no input device at index {index}"))
    })
}
