use crate::model::{AudioClip, CoverImage};

use std::fmt;

use chrono::{DateTime, Local};

/// Label given to recordings captured without a pending label.
pub const DEFAULT_LABEL: &str = "Untitled Recording";

/// Recording identifier: the creation timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordingId(pub i64);

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable, labeled audio clip created from one capture session.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Unique id within the session.
    pub id: RecordingId,
    /// Encoded audio.
    pub audio: AudioClip,
    /// Display label.
    pub label: String,
    /// When capture stopped.
    pub created_at: DateTime<Local>,
    /// Whole seconds counted while capturing.
    pub duration_seconds: u32,
    /// Cover art snapshotted when capture started.
    pub cover: Option<CoverImage>,
}

impl Recording {
    /// Creation time formatted for display.
    pub fn created_at_display(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
