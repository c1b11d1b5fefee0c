//! Collaborator traits for the session controller.
//!
//! The controller never talks to audio hardware or the filesystem directly.
//! It drives these traits and receives asynchronous outcomes as
//! [`SessionEvent`]s through a [`DeviceEventSink`].

use crate::{
    CoreResult,
    model::{AudioClip, CoverImage, RecordingId},
    session::SessionEvent,
};

use std::path::Path;

use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

/// Microphone capture with a single active session.
pub trait CaptureDevice {
    /// Request microphone access and begin accumulating audio.
    ///
    /// Returns [`AudioError::PermissionDenied`](crate::AudioError::PermissionDenied)
    /// when access is refused or no input device exists.
    fn start(&mut self) -> CoreResult<()>;

    /// Stop accumulating, encode everything captured, release the microphone.
    fn stop(&mut self) -> CoreResult<AudioClip>;

    /// Whether a capture session is running.
    fn is_active(&self) -> bool;

    /// Longest capture this device keeps, in whole seconds. `None` means
    /// unbounded.
    fn max_seconds(&self) -> Option<u32> {
        None
    }
}

/// A stateful player bound to one recording's audio.
///
/// Dropping the device releases it.
pub trait PlaybackDevice {
    /// Start or resume from the current position.
    fn play(&mut self) -> CoreResult<()>;

    /// Pause, keeping the current position.
    fn pause(&mut self);

    /// Move to an absolute position in seconds.
    fn seek(&mut self, seconds: f64);

    /// True unless the device is currently producing audio.
    fn is_paused(&self) -> bool;
}

/// Creates playback devices.
pub trait PlaybackBackend {
    /// Device type produced by this backend.
    type Device: PlaybackDevice;

    /// Build a device for `clip`. Progress, duration, end and runtime errors
    /// are reported through `events`.
    fn create(
        &self,
        id: RecordingId,
        clip: &AudioClip,
        events: DeviceEventSink,
    ) -> CoreResult<Self::Device>;
}

/// Reads cover art from disk.
pub trait ImageLoader: Send + Sync + 'static {
    /// Read and validate an image file.
    fn load(&self, path: &Path) -> CoreResult<CoverImage>;
}

/// What a playback device observed.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEventKind {
    /// Current position in seconds.
    Progress(f64),
    /// Total duration in seconds.
    DurationKnown(f64),
    /// Reached the end of the clip.
    Ended,
    /// Runtime failure while playing.
    Error(String),
}

/// An event reported by the playback device bound to `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEvent {
    /// Recording the device is bound to.
    pub id: RecordingId,
    /// What happened.
    pub kind: DeviceEventKind,
}

/// Sending half used by devices to report back to the session.
#[derive(Debug, Clone)]
pub struct DeviceEventSink {
    id: RecordingId,
    tx: UnboundedSender<SessionEvent>,
}

impl DeviceEventSink {
    /// Bind a sink to one recording.
    pub fn new(id: RecordingId, tx: UnboundedSender<SessionEvent>) -> Self {
        Self { id, tx }
    }

    /// Recording this sink reports for.
    pub fn id(&self) -> RecordingId {
        self.id
    }

    /// Report an event. Events sent after the session is gone are dropped.
    pub fn emit(&self, kind: DeviceEventKind) {
        let event = DeviceEvent { id: self.id, kind };
        if self.tx.send(SessionEvent::Device(event)).is_err() {
            trace!(recording_id = %self.id, "Session gone, device event dropped");
        }
    }
}
