use crate::{AudioError, CoreResult, device::ImageLoader, model::CoverImage};

use std::{fs, panic::Location, path::Path};

use base64::{Engine as _, engine::general_purpose};
use error_location::ErrorLocation;
use image::ImageFormat;
use tracing::{debug, instrument};

/// Largest cover file accepted (16 MiB).
pub const MAX_COVER_BYTES: u64 = 16 * 1024 * 1024;

/// Loads cover art from the local filesystem.
///
/// The file must decode as an image; the result keeps the original bytes
/// and format, base64 encoded into a `data:` URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageLoader;

impl ImageLoader for FileImageLoader {
    #[track_caller]
    #[instrument(skip(self))]
    fn load(&self, path: &Path) -> CoreResult<CoverImage> {
        let fail = |reason: String| AudioError::ImageLoadFailed {
            path: path.to_path_buf(),
            reason,
            location: ErrorLocation::from(Location::caller()),
        };

        let size = fs::metadata(path)
            .map_err(|e| fail(format!("Failed to read file: {}", e)))?
            .len();
        if size > MAX_COVER_BYTES {
            return Err(fail(format!(
                "File is {} bytes, limit is {}",
                size, MAX_COVER_BYTES
            )));
        }

        let bytes = fs::read(path).map_err(|e| fail(format!("Failed to read file: {}", e)))?;

        let format = image::guess_format(&bytes)
            .map_err(|e| fail(format!("Unrecognized image format: {}", e)))?;

        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| fail(format!("Failed to decode image: {}", e)))?;

        debug!(
            format = ?format,
            width = decoded.width(),
            height = decoded.height(),
            byte_len = bytes.len(),
            "Cover image loaded"
        );

        Ok(CoverImage::from_data_uri(encode_data_uri(format, &bytes)))
    }
}

/// Build a base64 `data:` URI for image bytes in `format`.
pub fn encode_data_uri(format: ImageFormat, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        general_purpose::STANDARD.encode(bytes)
    )
}
