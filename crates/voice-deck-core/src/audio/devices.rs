use crate::{AudioError, CoreResult};

use std::panic::Location;

use cpal::{
    Device,
    traits::{DeviceTrait, HostTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// A host audio device that can be named in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDeviceInfo {
    /// Device name as matched against `input_device` / `output_device`.
    pub name: String,
    /// Whether this is the host default for its direction.
    pub is_default: bool,
}

/// Input devices, default first, then by name.
#[track_caller]
#[instrument]
pub fn list_input_devices() -> CoreResult<Vec<AudioDeviceInfo>> {
    let host = cpal::default_host();
    let default = host.default_input_device().and_then(|d| device_name(&d));

    let devices = host.input_devices().map_err(|e| AudioError::DeviceError {
        reason: format!("Failed to enumerate input devices: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(collect(devices, default.as_deref()))
}

/// Output devices, default first, then by name.
#[track_caller]
#[instrument]
pub fn list_output_devices() -> CoreResult<Vec<AudioDeviceInfo>> {
    let host = cpal::default_host();
    let default = host.default_output_device().and_then(|d| device_name(&d));

    let devices = host.output_devices().map_err(|e| AudioError::DeviceError {
        reason: format!("Failed to enumerate output devices: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(collect(devices, default.as_deref()))
}

fn device_name(device: &Device) -> Option<String> {
    #[allow(deprecated)]
    let name = device.name();
    name.ok()
}

fn collect(devices: impl Iterator<Item = Device>, default: Option<&str>) -> Vec<AudioDeviceInfo> {
    let mut infos: Vec<AudioDeviceInfo> = devices
        .filter_map(|d| device_name(&d))
        .map(|name| AudioDeviceInfo {
            is_default: default == Some(name.as_str()),
            name,
        })
        .collect();

    sort_default_first(&mut infos);
    debug!(count = infos.len(), "Enumerated audio devices");
    infos
}

pub(crate) fn sort_default_first(infos: &mut [AudioDeviceInfo]) {
    infos.sort_by(|a, b| b.is_default.cmp(&a.is_default).then_with(|| a.name.cmp(&b.name)));
}
