/// Card picture rendering module
///
/// This module provides the interactive picture editor's raster side:
/// framing (pan/zoom/rotate) and tone (brightness/contrast) applied to a
/// source picture and baked into a fixed-size JPEG.
///
/// Architecture:
/// - `pipeline.rs` - affine + tone rasterizer and JPEG commit
/// - `scheduler.rs` - one-redraw-per-frame coalescing
/// - `session.rs` - source lifecycle, parameters and drag for one edit

pub mod pipeline;
pub mod scheduler;
pub mod session;

pub use pipeline::{RenderPipeline, CANVAS_SIZE};
pub use session::{SourceState, TransformSession};

/// Errors from the picture editor
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The source picture failed to load, or is still loading
    #[error("image unavailable")]
    ImageUnavailable,

    #[error("could not encode picture: {0}")]
    Encode(#[from] image::ImageError),
}
