//! Voice-deck Core Library
//!
//! Voice memo recorder and player: a single-owner session state machine
//! over microphone capture (CPAL), clip playback (CPAL + Hound) and cover
//! art loading.
//!
//! # Example
//!
//! ```no_run
//! use voice_deck_core::{
//!     FileImageLoader, MicrophoneCapture, SessionController, SpeakerBackend,
//! };
//!
//! let capture = MicrophoneCapture::new(None, 300);
//! let backend = SpeakerBackend::new(None, 250);
//! let (mut session, _events) = SessionController::new(capture, backend, FileImageLoader);
//!
//! session.set_label("Groceries");
//! session.start_capture();
//! session.tick();
//! session.stop_capture();
//!
//! if let Some(recording) = session.state().recordings().first() {
//!     session.toggle(recording.id);
//! }
//! ```

mod audio;
mod cover;
mod device;
mod error;
mod model;
mod session;

pub use {
    audio::{
        AudioDeviceInfo, DEFAULT_MAX_RECORDING_SECONDS, DEFAULT_PROGRESS_INTERVAL_MS,
        DecodedAudio, MicrophoneCapture, SpeakerBackend, SpeakerDevice, decode_wav, encode_wav,
        list_input_devices, list_output_devices,
    },
    cover::{FileImageLoader, MAX_COVER_BYTES, encode_data_uri},
    device::{
        CaptureDevice, DeviceEvent, DeviceEventKind, DeviceEventSink, ImageLoader,
        PlaybackBackend, PlaybackDevice,
    },
    error::{AudioError, Result as CoreResult},
    model::{AudioClip, CoverImage, DEFAULT_LABEL, Recording, RecordingId, format_time},
    session::{
        CapturePhase, Effect, PlaybackStatus, Selection, SessionController, SessionEvent,
        SessionState, reduce,
    },
};
