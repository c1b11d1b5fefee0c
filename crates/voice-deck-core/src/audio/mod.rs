//! Host audio devices: microphone capture, clip playback and the WAV codec
//! between them.

pub(crate) mod capture;
pub(crate) mod devices;
pub(crate) mod playback;
mod wav;

pub use {
    capture::{DEFAULT_MAX_RECORDING_SECONDS, MicrophoneCapture},
    devices::{AudioDeviceInfo, list_input_devices, list_output_devices},
    playback::{DEFAULT_PROGRESS_INTERVAL_MS, SpeakerBackend, SpeakerDevice},
    wav::{DecodedAudio, decode_wav, encode_wav},
};
