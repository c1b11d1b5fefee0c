mod loader;

pub use loader::{FileImageLoader, MAX_COVER_BYTES, encode_data_uri};
