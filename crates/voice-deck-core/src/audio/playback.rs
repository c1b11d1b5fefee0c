//! Clip playback over a cpal output stream.
//!
//! Each [`SpeakerDevice`] owns its decoded samples and a playhead shared
//! with the audio callback. Position, end of clip and stream errors are
//! reported through the device's [`DeviceEventSink`].

use crate::{
    AudioError, CoreResult,
    audio::{DecodedAudio, decode_wav},
    device::{DeviceEventKind, DeviceEventSink, PlaybackBackend, PlaybackDevice},
    model::{AudioClip, RecordingId},
};

use std::{
    panic::Location,
    sync::{Arc, Mutex},
};

use cpal::{
    Device, SampleFormat, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Default spacing between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 250;

/// Creates [`SpeakerDevice`]s on the default (or a named) output device.
#[derive(Debug, Clone)]
pub struct SpeakerBackend {
    device_name: Option<String>,
    progress_interval_ms: u64,
}

impl SpeakerBackend {
    /// Backend for `device_name`, or the default output when `None`.
    pub fn new(device_name: Option<String>, progress_interval_ms: u64) -> Self {
        Self {
            device_name,
            progress_interval_ms: progress_interval_ms.max(1),
        }
    }

    #[track_caller]
    fn open_device(&self) -> CoreResult<Device> {
        let host = cpal::default_host();

        match &self.device_name {
            Some(wanted) => host
                .output_devices()
                .map_err(|e| AudioError::PlaybackFailure {
                    reason: format!("Failed to list output devices: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?
                .find(|d| {
                    #[allow(deprecated)]
                    let name = d.name();
                    name.ok().as_deref() == Some(wanted.as_str())
                })
                .ok_or_else(|| AudioError::PlaybackFailure {
                    reason: format!("Output device not found: {}", wanted),
                    location: ErrorLocation::from(Location::caller()),
                }),
            None => host
                .default_output_device()
                .ok_or(AudioError::PlaybackFailure {
                    reason: "No output device found".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                }),
        }
    }
}

impl PlaybackBackend for SpeakerBackend {
    type Device = SpeakerDevice;

    #[track_caller]
    #[instrument(skip(self, clip, events), fields(clip_bytes = clip.len()))]
    fn create(
        &self,
        id: RecordingId,
        clip: &AudioClip,
        events: DeviceEventSink,
    ) -> CoreResult<SpeakerDevice> {
        let audio = decode_wav(clip)?;
        let device = self.open_device()?;
        let config = output_config(&device, audio.sample_rate)?;

        let duration = audio.duration_seconds();
        let playhead = Playhead::new(audio, config.sample_rate, self.progress_interval_ms);

        info!(
            recording_id = %id,
            duration_seconds = duration,
            output_rate = config.sample_rate,
            output_channels = config.channels,
            "Playback device created"
        );
        events.emit(DeviceEventKind::DurationKnown(duration));

        Ok(SpeakerDevice {
            device,
            config,
            stream: None,
            playhead: Arc::new(Mutex::new(playhead)),
            events,
        })
    }
}

/// Prefer an f32 config at the clip's own rate; fall back to the device default.
#[track_caller]
fn output_config(device: &Device, clip_rate: u32) -> CoreResult<StreamConfig> {
    let matching = device.supported_output_configs().ok().and_then(|mut configs| {
        configs.find(|c| {
            c.sample_format() == SampleFormat::F32
                && c.min_sample_rate() <= clip_rate
                && clip_rate <= c.max_sample_rate()
        })
    });

    match matching {
        Some(range) => Ok(range.with_sample_rate(clip_rate).config()),
        None => device
            .default_output_config()
            .map(|c| c.config())
            .map_err(|e| AudioError::PlaybackFailure {
                reason: format!("Failed to get output config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }),
    }
}

/// Playback position shared between a device and its audio callback.
pub(crate) struct Playhead {
    samples: Vec<f32>,
    channels: usize,
    clip_rate: u32,
    /// Source frames advanced per output frame.
    step: f64,
    /// Fractional source frame.
    position: f64,
    paused: bool,
    progress_every: f64,
    last_reported: f64,
}

/// What a fill pass observed, reported outside the lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FillOutcome {
    Silent,
    Played { report: Option<f64> },
    Ended,
}

impl Playhead {
    pub(crate) fn new(audio: DecodedAudio, output_rate: u32, progress_interval_ms: u64) -> Self {
        let clip_rate = audio.sample_rate.max(1);
        let step = f64::from(clip_rate) / f64::from(output_rate.max(1));

        Self {
            channels: usize::from(audio.channels.max(1)),
            samples: audio.samples,
            clip_rate,
            step,
            position: 0.0,
            paused: true,
            progress_every: f64::from(clip_rate) * progress_interval_ms as f64 / 1000.0,
            last_reported: 0.0,
        }
    }

    fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub(crate) fn seconds(&self) -> f64 {
        self.position / f64::from(self.clip_rate)
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub(crate) fn seek(&mut self, seconds: f64) {
        let target = (seconds.max(0.0) * f64::from(self.clip_rate)).min(self.frames() as f64);
        self.position = if target.is_finite() { target } else { 0.0 };
        self.last_reported = self.position;
    }

    /// Fill an interleaved output buffer with `out_channels` channels.
    ///
    /// Reaching the end pauses the playhead and rewinds it, so the next
    /// `play` starts from the top.
    pub(crate) fn fill(&mut self, out: &mut [f32], out_channels: usize) -> FillOutcome {
        let out_channels = out_channels.max(1);

        if self.paused {
            out.fill(0.0);
            return FillOutcome::Silent;
        }

        let frames = self.frames();
        for frame in out.chunks_mut(out_channels) {
            let src = self.position as usize;
            if src >= frames {
                frame.fill(0.0);
                continue;
            }
            for (ch, slot) in frame.iter_mut().enumerate() {
                *slot = self.samples[src * self.channels + ch.min(self.channels - 1)];
            }
            self.position += self.step;
        }

        if self.position as usize >= frames {
            self.paused = true;
            self.position = 0.0;
            self.last_reported = 0.0;
            return FillOutcome::Ended;
        }

        if self.position - self.last_reported >= self.progress_every {
            self.last_reported = self.position;
            FillOutcome::Played {
                report: Some(self.seconds()),
            }
        } else {
            FillOutcome::Played { report: None }
        }
    }
}

/// A cpal output stream bound to one recording.
///
/// The stream is built on first [`play`](PlaybackDevice::play) and dropped
/// with the device.
pub struct SpeakerDevice {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    playhead: Arc<Mutex<Playhead>>,
    events: DeviceEventSink,
}

impl SpeakerDevice {
    #[track_caller]
    fn build_stream(&self) -> CoreResult<Stream> {
        let playhead = Arc::clone(&self.playhead);
        let out_channels = usize::from(self.config.channels);
        let data_events = self.events.clone();
        let error_events = self.events.clone();

        self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let outcome = {
                        let mut head = playhead.lock().unwrap_or_else(|e| {
                            error!("Playhead lock poisoned, recovering: {}", e);
                            e.into_inner()
                        });
                        head.fill(data, out_channels)
                    };
                    match outcome {
                        FillOutcome::Played {
                            report: Some(seconds),
                        } => data_events.emit(DeviceEventKind::Progress(seconds)),
                        FillOutcome::Ended => data_events.emit(DeviceEventKind::Ended),
                        _ => {}
                    }
                },
                move |err| {
                    error!("Audio output stream error: {}", err);
                    error_events.emit(DeviceEventKind::Error(err.to_string()));
                },
                None,
            )
            .map_err(|e| AudioError::PlaybackFailure {
                reason: format!("Failed to build output stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    fn with_playhead<T>(&self, f: impl FnOnce(&mut Playhead) -> T) -> T {
        let mut head = self.playhead.lock().unwrap_or_else(|e| {
            warn!("Playhead lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        f(&mut head)
    }
}

impl PlaybackDevice for SpeakerDevice {
    #[track_caller]
    #[instrument(skip(self), fields(recording_id = %self.events.id()))]
    fn play(&mut self) -> CoreResult<()> {
        if self.stream.is_none() {
            self.stream = Some(self.build_stream()?);
        }

        self.with_playhead(|head| head.set_paused(false));

        if let Some(stream) = &self.stream {
            if let Err(e) = stream.play() {
                self.with_playhead(|head| head.set_paused(true));
                return Err(AudioError::PlaybackFailure {
                    reason: format!("Failed to start output stream: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        debug!(position = self.with_playhead(|head| head.seconds()), "Playback started");
        Ok(())
    }

    #[instrument(skip(self), fields(recording_id = %self.events.id()))]
    fn pause(&mut self) {
        self.with_playhead(|head| head.set_paused(true));

        if let Some(stream) = &self.stream {
            if let Err(e) = stream.pause() {
                // The playhead is paused already and renders silence.
                warn!(error = %e, "Failed to pause output stream");
            }
        }
    }

    fn seek(&mut self, seconds: f64) {
        self.with_playhead(|head| head.seek(seconds));
        debug!(recording_id = %self.events.id(), seconds, "Seeked");
    }

    fn is_paused(&self) -> bool {
        self.with_playhead(|head| head.is_paused())
    }
}
