use crate::{AudioError, CoreResult, model::AudioClip};

use std::{io::Cursor, panic::Location};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, instrument};

/// Interleaved PCM decoded from a clip.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples in `-1.0..=1.0`.
    pub samples: Vec<f32>,
    /// Interleaved channel count.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Encode interleaved f32 samples as a 32-bit float WAV clip.
#[track_caller]
#[instrument(skip(samples))]
pub fn encode_wav(samples: &[f32], channels: u16, sample_rate: u32) -> CoreResult<AudioClip> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 4));

    let mut writer = WavWriter::new(&mut cursor, spec).map_err(|e| AudioError::EncodingError {
        reason: format!("Failed to create WAV writer: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| AudioError::EncodingError {
                reason: format!("Failed to write sample: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
    }

    writer.finalize().map_err(|e| AudioError::EncodingError {
        reason: format!("Failed to finalize WAV: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let bytes = cursor.into_inner();
    debug!(
        sample_count = samples.len(),
        byte_len = bytes.len(),
        "Encoded WAV clip"
    );

    Ok(AudioClip::wav(bytes))
}

/// Decode a WAV clip into interleaved f32 samples.
#[track_caller]
#[instrument(skip(clip), fields(clip_bytes = clip.len()))]
pub fn decode_wav(clip: &AudioClip) -> CoreResult<DecodedAudio> {
    let reader = WavReader::new(Cursor::new(clip.bytes())).map_err(|e| AudioError::DecodeFailure {
        reason: format!("Not a WAV clip: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let spec = reader.spec();

    let samples: Result<Vec<f32>, _> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect(),
        SampleFormat::Int => {
            let max_value = (1_i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_value))
                .collect()
        }
    };

    let samples = samples.map_err(|e| AudioError::DecodeFailure {
        reason: format!("Failed to read samples: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    debug!(
        sample_count = samples.len(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        "Decoded WAV clip"
    );

    Ok(DecodedAudio {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}
