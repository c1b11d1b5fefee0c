mod clip;
mod recording;
mod time;

pub use {
    clip::{AudioClip, CoverImage},
    recording::{DEFAULT_LABEL, Recording, RecordingId},
    time::format_time,
};
