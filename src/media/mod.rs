/// Card picture sources
///
/// Pictures on a card can be a `data:` URL, a remote http(s) URL, or a
/// local file path. This module fetches and decodes all three.

pub mod data_url;
pub mod loader;

pub use loader::{load_bytes, load_image, ImageSource};

/// Errors while fetching or decoding a picture
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("no picture reference")]
    Empty,

    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("unsupported picture reference: {0}")]
    Unsupported(String),

    #[error("could not read picture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("picture download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("picture download returned HTTP {0}")]
    HttpStatus(u16),

    #[error("could not decode picture: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decode task failed: {0}")]
    Join(String),
}
