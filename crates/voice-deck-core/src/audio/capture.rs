use crate::{AudioError, CoreResult, audio::encode_wav, device::CaptureDevice, model::AudioClip};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        atomic::{AtomicBool, Ordering},
        {Arc, Mutex},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Default cap on a single capture.
pub const DEFAULT_MAX_RECORDING_SECONDS: u32 = 300;

/// Microphone capture over the default (or a named) cpal input device.
///
/// The device is opened on [`start`](CaptureDevice::start) and dropped on
/// [`stop`](CaptureDevice::stop), so the microphone is only held while a
/// capture is running. Audio past `max_seconds` is not kept; the session
/// stops the capture when its elapsed count reaches the same limit.
pub struct MicrophoneCapture {
    device_name: Option<String>,
    max_seconds: u32,
    active: Option<ActiveCapture>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream so no in-flight callback writes after the lock
    /// is taken in `stop()`.
    shutdown: Arc<AtomicBool>,
}

struct ActiveCapture {
    stream: Stream,
    config: StreamConfig,
}

impl MicrophoneCapture {
    /// Create a capture bound to `device_name`, or the default input when
    /// `None`. No device is opened until capture starts.
    pub fn new(device_name: Option<String>, max_seconds: u32) -> Self {
        Self {
            device_name,
            max_seconds: max_seconds.max(1),
            active: None,
            samples: Arc::new(Mutex::new(VecDeque::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    #[track_caller]
    fn open_device(&self) -> CoreResult<(Device, StreamConfig)> {
        let host = cpal::default_host();

        let device = match &self.device_name {
            Some(wanted) => host
                .input_devices()
                .map_err(|e| AudioError::DeviceError {
                    reason: format!("Failed to list input devices: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?
                .find(|d| {
                    #[allow(deprecated)]
                    let name = d.name();
                    name.ok().as_deref() == Some(wanted.as_str())
                })
                .ok_or_else(|| AudioError::DeviceError {
                    reason: format!("Input device not found: {}", wanted),
                    location: ErrorLocation::from(Location::caller()),
                })?,
            None => host
                .default_input_device()
                .ok_or(AudioError::PermissionDenied {
                    reason: "No microphone found".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })?,
        };

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::PermissionDenied {
                reason: format!("Failed to get input config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "Microphone opened"
        );

        Ok((device, config.into()))
    }
}

impl CaptureDevice for MicrophoneCapture {
    #[track_caller]
    #[instrument(skip(self))]
    fn start(&mut self) -> CoreResult<()> {
        if self.active.is_some() {
            return Err(AudioError::CaptureBusy {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let (device, config) = self.open_device()?;

        let max_samples = self.max_seconds as usize
            * config.sample_rate as usize
            * usize::from(config.channels.max(1));
        let samples = Arc::clone(&self.samples);
        let shutdown = Arc::clone(&self.shutdown);

        // Reset shutdown flag for new capture session
        self.shutdown.store(false, Ordering::Release);

        samples
            .lock()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .clear();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // A poisoned mutex still holds valid samples.
                    let mut buf = samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    push_capped(&mut buf, data, max_samples);
                },
                |err| {
                    error!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::PermissionDenied {
                reason: format!("Failed to open input stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| AudioError::PermissionDenied {
            reason: format!("Failed to start input stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.active = Some(ActiveCapture { stream, config });
        info!(max_seconds = self.max_seconds, "Microphone capture started");

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn stop(&mut self) -> CoreResult<AudioClip> {
        self.shutdown.store(true, Ordering::Release);

        let Some(ActiveCapture { stream, config }) = self.active.take() else {
            return Err(AudioError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        // Dropping the stream releases the microphone.
        drop(stream);
        std::thread::sleep(std::time::Duration::from_millis(5));
        info!("Microphone capture stopped");

        let samples: Vec<f32> = {
            let mut buf = self.samples.lock().map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
            buf.drain(..).collect()
        };

        debug!(sample_count = samples.len(), "Captured audio samples");

        encode_wav(&samples, config.channels, config.sample_rate)
    }

    fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn max_seconds(&self) -> Option<u32> {
        Some(self.max_seconds)
    }
}

/// Append as much of `data` as fits under `max_samples`; the rest is dropped.
pub(crate) fn push_capped(buf: &mut VecDeque<f32>, data: &[f32], max_samples: usize) {
    let room = max_samples.saturating_sub(buf.len());
    buf.extend(data.iter().take(room).copied());
}
