use crate::model::{CoverImage, Recording, RecordingId};

use uuid::Uuid;

/// Where the single capture slot is.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CapturePhase {
    /// No capture running.
    #[default]
    Idle,
    /// Waiting for microphone access.
    Requesting {
        /// Capture being requested.
        session_id: Uuid,
    },
    /// Microphone open and audio accumulating.
    Capturing {
        /// Running capture.
        session_id: Uuid,
        /// Whole seconds elapsed.
        elapsed_seconds: u32,
        /// Cover taken from the pending cover when capture started.
        cover: Option<CoverImage>,
        /// Pending cover changed after capture started.
        cover_replaced: bool,
    },
    /// Stop requested, waiting for the encoded clip.
    Finishing {
        /// Capture being finished.
        session_id: Uuid,
        /// Whole seconds elapsed when stop was requested.
        elapsed_seconds: u32,
        /// Cover taken when capture started.
        cover: Option<CoverImage>,
        /// Pending cover changed after capture started.
        cover_replaced: bool,
    },
}

impl CapturePhase {
    /// Id of the capture occupying the slot, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            CapturePhase::Idle => None,
            CapturePhase::Requesting { session_id }
            | CapturePhase::Capturing { session_id, .. }
            | CapturePhase::Finishing { session_id, .. } => Some(*session_id),
        }
    }
}

/// Transport status of the selected recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Device producing audio.
    Playing,
    /// Device paused at its current position.
    Paused,
}

/// The recording bound to the transport controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Selected recording.
    pub id: RecordingId,
    /// Whether it is playing.
    pub status: PlaybackStatus,
}

/// Complete state of one recorder/player session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub(crate) recordings: Vec<Recording>,
    pub(crate) capture: CapturePhase,
    pub(crate) pending_label: String,
    pub(crate) pending_cover: Option<CoverImage>,
    pub(crate) selection: Option<Selection>,
    pub(crate) current_time: f64,
    pub(crate) duration: f64,
    pub(crate) sidebar_open: bool,
    pub(crate) recorder_open: bool,
    pub(crate) notice: Option<String>,
    pub(crate) capture_limit: Option<u32>,
}

impl SessionState {
    /// Empty session whose captures stop after `seconds` whole seconds.
    pub fn with_capture_limit(seconds: u32) -> Self {
        Self {
            capture_limit: Some(seconds.max(1)),
            ..Self::default()
        }
    }

    /// Longest capture in whole seconds, if bounded.
    pub fn capture_limit(&self) -> Option<u32> {
        self.capture_limit
    }

    /// Recordings, newest first.
    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    /// Look up a recording by id.
    pub fn recording(&self, id: RecordingId) -> Option<&Recording> {
        self.recordings.iter().find(|r| r.id == id)
    }

    /// Position of a recording in collection order.
    pub fn index_of(&self, id: RecordingId) -> Option<usize> {
        self.recordings.iter().position(|r| r.id == id)
    }

    /// Capture slot.
    pub fn capture(&self) -> &CapturePhase {
        &self.capture
    }

    /// True while the microphone is open.
    pub fn is_capturing(&self) -> bool {
        matches!(self.capture, CapturePhase::Capturing { .. })
    }

    /// Whole seconds elapsed in the running capture, zero otherwise.
    pub fn capture_seconds(&self) -> u32 {
        match self.capture {
            CapturePhase::Capturing {
                elapsed_seconds, ..
            }
            | CapturePhase::Finishing {
                elapsed_seconds, ..
            } => elapsed_seconds,
            _ => 0,
        }
    }

    /// Label for the next recording as typed.
    pub fn pending_label(&self) -> &str {
        &self.pending_label
    }

    /// Cover for the next recording.
    pub fn pending_cover(&self) -> Option<&CoverImage> {
        self.pending_cover.as_ref()
    }

    /// Current selection.
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Id of the recording that is playing right now, if any.
    pub fn playing_id(&self) -> Option<RecordingId> {
        self.selection
            .filter(|s| s.status == PlaybackStatus::Playing)
            .map(|s| s.id)
    }

    /// The selected recording.
    pub fn now_playing(&self) -> Option<&Recording> {
        self.selection.and_then(|s| self.recording(s.id))
    }

    /// Position of the selected recording in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Duration of the selected recording in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Playback position as `0..=100`.
    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Whether `SkipPrevious` would move the selection.
    pub fn can_skip_previous(&self) -> bool {
        self.selected_index().is_some_and(|idx| idx > 0)
    }

    /// Whether `SkipNext` would move the selection.
    pub fn can_skip_next(&self) -> bool {
        self.selected_index()
            .is_some_and(|idx| idx + 1 < self.recordings.len())
    }

    /// Sidebar visibility.
    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// New-recording panel visibility.
    pub fn recorder_open(&self) -> bool {
        self.recorder_open
    }

    /// Last user-facing message.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub(crate) fn selected_index(&self) -> Option<usize> {
        self.selection.and_then(|s| self.index_of(s.id))
    }

    pub(crate) fn reset_progress(&mut self) {
        self.current_time = 0.0;
        self.duration = 0.0;
    }
}
