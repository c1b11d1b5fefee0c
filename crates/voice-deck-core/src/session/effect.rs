use crate::model::{AudioClip, RecordingId};

use std::path::PathBuf;

use uuid::Uuid;

/// Side effects requested by the reducer, executed by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Request microphone access and start capturing.
    BeginCapture {
        /// Capture being started.
        session_id: Uuid,
    },
    /// Stop capturing and encode the result.
    FinishCapture {
        /// Capture being finished.
        session_id: Uuid,
    },
    /// Read an image file off the session task.
    LoadCover {
        /// Image file to read.
        path: PathBuf,
    },
    /// Pause every device except the one bound to `keep`.
    PauseOthers {
        /// Device left untouched.
        keep: RecordingId,
    },
    /// Create the device for `id` if needed and start it.
    Play {
        /// Recording to play.
        id: RecordingId,
        /// Audio the device is bound to when it is created.
        clip: AudioClip,
    },
    /// Pause the device bound to `id`.
    Pause {
        /// Recording to pause.
        id: RecordingId,
    },
    /// Reposition the device bound to `id`.
    Seek {
        /// Recording to reposition.
        id: RecordingId,
        /// Absolute position.
        seconds: f64,
    },
    /// Stop and drop the device bound to `id`.
    Release {
        /// Recording whose device goes away.
        id: RecordingId,
    },
}
