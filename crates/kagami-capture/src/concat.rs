//! Multi-frame buffer and vertical stacking

use std::collections::VecDeque;
use std::time::SystemTime;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Luma, Pixel, Rgb};
use kagami_config::capture::{CaptureConfig, ColorMode};
use kagami_core::Region;

use crate::error::CaptureError;

const SEPARATOR_GRAY: u8 = 180;

/// One captured, already conditioned region image
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    pub image: DynamicImage,
    pub region: Region,
    pub captured_at: SystemTime,
}

impl CaptureFrame {
    pub fn new(image: DynamicImage, region: Region) -> Self {
        Self {
            image,
            region,
            captured_at: SystemTime::now(),
        }
    }
}

/// Bounded FIFO of frames awaiting a combined translation
#[derive(Debug)]
pub struct ConcatBuffer {
    frames: VecDeque<CaptureFrame>,
    capacity: usize,
    gap: u32,
    mode: ColorMode,
}

impl ConcatBuffer {
    pub fn new(capacity: usize, gap: u32, mode: ColorMode) -> Self {
        Self {
            frames: VecDeque::new(),
            capacity: capacity.max(1),
            gap,
            mode,
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.concat_max, config.concat_gap, config.concat_mode)
    }

    /// Append a frame; returns the oldest frame if it had to be evicted
    pub fn push(&mut self, frame: CaptureFrame) -> Option<CaptureFrame> {
        let evicted = if self.frames.len() >= self.capacity {
            self.frames.pop_front()
        } else {
            None
        };
        self.frames.push_back(frame);
        tracing::debug!(
            "[CONCAT] {} / {} frame(s) buffered{}",
            self.frames.len(),
            self.capacity,
            if evicted.is_some() { ", oldest dropped" } else { "" }
        );
        evicted
    }

    pub fn clear(&mut self) {
        if !self.frames.is_empty() {
            tracing::debug!("[CONCAT] Cleared {} frame(s)", self.frames.len());
        }
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stack buffered frames top to bottom into one image
    pub fn compose(&self) -> Result<DynamicImage, CaptureError> {
        let images: Vec<&DynamicImage> = self.frames.iter().map(|f| &f.image).collect();
        compose_vertical(&images, self.gap, self.mode)
    }
}

/// Scale every image to the widest width (aspect preserved), stack them with
/// `gap`-pixel light gray separators on a black background.
pub fn compose_vertical(images: &[&DynamicImage], gap: u32, mode: ColorMode) -> Result<DynamicImage, CaptureError> {
    if images.is_empty() {
        return Err(CaptureError::EmptyBuffer);
    }
    Ok(match mode {
        ColorMode::Luma => {
            let frames: Vec<_> = images.iter().map(|img| img.to_luma8()).collect();
            DynamicImage::ImageLuma8(stack(&frames, gap, Luma([0]), Luma([SEPARATOR_GRAY])))
        }
        ColorMode::Rgb => {
            let frames: Vec<_> = images.iter().map(|img| img.to_rgb8()).collect();
            let sep = Rgb([SEPARATOR_GRAY; 3]);
            DynamicImage::ImageRgb8(stack(&frames, gap, Rgb([0, 0, 0]), sep))
        }
    })
}

fn stack<P>(frames: &[ImageBuffer<P, Vec<P::Subpixel>>], gap: u32, background: P, separator: P) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let width = frames.iter().map(|f| f.width()).max().unwrap_or(1).max(1);
    let scaled: Vec<ImageBuffer<P, Vec<P::Subpixel>>> = frames
        .iter()
        .map(|f| {
            if f.width() == width || f.width() == 0 {
                f.clone()
            } else {
                let height = ((f.height() as u64 * width as u64) / f.width() as u64).max(1) as u32;
                imageops::resize(f, width, height, FilterType::CatmullRom)
            }
        })
        .collect();

    let total = scaled.iter().map(|f| f.height()).sum::<u32>() + gap * (scaled.len() as u32 - 1);
    let mut canvas = ImageBuffer::from_pixel(width, total.max(1), background);
    let mut y = 0u32;
    for (i, frame) in scaled.iter().enumerate() {
        imageops::replace(&mut canvas, frame, 0, y as i64);
        y += frame.height();
        if i + 1 < scaled.len() {
            for sy in y..y + gap {
                for x in 0..width {
                    canvas.put_pixel(x, sy, separator);
                }
            }
            y += gap;
        }
    }
    canvas
}

/// Cut `img` into `count` horizontal bands of near-equal height, top to bottom.
/// At least two bands are produced, and never more bands than rows.
pub fn slice_bands(img: &DynamicImage, count: usize) -> Vec<DynamicImage> {
    let height = img.height().max(1);
    let count = (count.max(2) as u32).min(height);
    (0..count)
        .map(|i| {
            let top = height * i / count;
            let bottom = height * (i + 1) / count;
            img.crop_imm(0, top, img.width(), bottom - top)
        })
        .collect()
}
