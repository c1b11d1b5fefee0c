mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod logging_config;
mod playback_config;

pub(crate) use {
    audio_config::AudioConfig, config::Config, logging_config::LoggingConfig,
    playback_config::PlaybackConfig,
};

use voice_deck_core::{DEFAULT_MAX_RECORDING_SECONDS, DEFAULT_PROGRESS_INTERVAL_MS};

pub(crate) const DEFAULT_LOG_FILTER: &str = "voice_deck=info,voice_deck_core=info";

pub(crate) fn default_max_recording_seconds() -> u32 {
    DEFAULT_MAX_RECORDING_SECONDS
}

pub(crate) fn default_progress_interval_ms() -> u64 {
    DEFAULT_PROGRESS_INTERVAL_MS
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
