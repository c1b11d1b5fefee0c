use std::{fmt, sync::Arc};

/// Encoded audio produced by a capture session.
///
/// The bytes are a complete WAV file. Clones share the same buffer, so a
/// clip can be handed to a playback device without copying.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    bytes: Arc<[u8]>,
    mime_type: &'static str,
}

impl AudioClip {
    /// MIME type of clips produced by the WAV encoder.
    pub const WAV_MIME: &'static str = "audio/wav";

    /// Wrap encoded WAV bytes.
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes),
            mime_type: Self::WAV_MIME,
        }
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Size of the encoded clip in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the clip holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Cover art as a `data:` URI.
#[derive(Clone, PartialEq, Eq)]
pub struct CoverImage {
    data_uri: Arc<str>,
}

impl CoverImage {
    /// Wrap an already encoded `data:` URI.
    pub fn from_data_uri(data_uri: impl Into<String>) -> Self {
        Self {
            data_uri: Arc::from(data_uri.into()),
        }
    }

    /// The full `data:` URI.
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// MIME type declared in the URI, if present.
    pub fn mime_type(&self) -> Option<&str> {
        self.data_uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .filter(|mime| !mime.is_empty())
    }
}

impl fmt::Debug for CoverImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverImage")
            .field("mime_type", &self.mime_type())
            .field("len", &self.data_uri.len())
            .finish()
    }
}
