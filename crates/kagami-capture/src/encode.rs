use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder};

use crate::error::CaptureError;

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        image.as_bytes(),
        image.width(),
        image.height(),
        image.color().into(),
    )?;
    Ok(buffer)
}
