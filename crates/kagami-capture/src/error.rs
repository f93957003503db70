use kagami_types::PixelRect;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No displays available")]
    NoDisplays,

    #[error("Display {0} not found")]
    UnknownDisplay(u32),

    #[error("Capture rect {0:?} lies outside the source image")]
    OutOfBounds(PixelRect),

    #[error("Nothing to compose: concat buffer is empty")]
    EmptyBuffer,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Screen grab failed: {0}")]
    Backend(#[from] anyhow::Error),
}
