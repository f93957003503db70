//! Screen grabbing backends

use std::path::Path;

use image::{RgbImage, imageops};
use kagami_types::PixelRect;

use crate::display::DisplayInfo;
use crate::error::CaptureError;

/// Source of physical screen pixels
pub trait CaptureService: Send {
    fn displays(&self) -> Result<Vec<DisplayInfo>, CaptureError>;

    /// Grab `rect` (physical pixels, desktop origin) from `display`
    fn grab(&self, rect: PixelRect, display: u32) -> Result<RgbImage, CaptureError>;
}

/// Crop `rect` out of `source`, whose top-left sits at `origin`.
/// Parts outside the source are dropped.
fn crop_from(source: &RgbImage, origin: (i32, i32), rect: PixelRect) -> Result<RgbImage, CaptureError> {
    let x0 = (rect.x - origin.0).max(0) as i64;
    let y0 = (rect.y - origin.1).max(0) as i64;
    let x1 = ((rect.x - origin.0) as i64 + rect.width as i64).min(source.width() as i64);
    let y1 = ((rect.y - origin.1) as i64 + rect.height as i64).min(source.height() as i64);
    if x1 <= x0 || y1 <= y0 {
        return Err(CaptureError::OutOfBounds(rect));
    }
    Ok(imageops::crop_imm(source, x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32).to_image())
}

/// Single-display desktop backed by a fixed image
///
/// Used for offline runs and tests.
pub struct StillImageCapture {
    image: RgbImage,
    scale: f64,
}

impl StillImageCapture {
    pub fn new(image: RgbImage) -> Self {
        Self { image, scale: 1.0 }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let image = image::open(path)?.to_rgb8();
        tracing::info!(
            "[CAPTURE] Loaded still desktop {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::new(image))
    }

    /// Pretend the display runs at `scale` physical pixels per logical pixel
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

impl CaptureService for StillImageCapture {
    fn displays(&self) -> Result<Vec<DisplayInfo>, CaptureError> {
        let physical = PixelRect {
            x: 0,
            y: 0,
            width: self.image.width(),
            height: self.image.height(),
        };
        Ok(vec![DisplayInfo::from_physical(0, physical, self.scale, true)])
    }

    fn grab(&self, rect: PixelRect, display: u32) -> Result<RgbImage, CaptureError> {
        if display != 0 {
            return Err(CaptureError::UnknownDisplay(display));
        }
        crop_from(&self.image, (0, 0), rect)
    }
}

#[cfg(feature = "xcap")]
pub use live::ScreenCapture;

#[cfg(feature = "xcap")]
mod live {
    use anyhow::Context;
    use image::{DynamicImage, RgbImage, RgbaImage};
    use kagami_types::PixelRect;
    use xcap::Monitor;

    use super::{CaptureService, crop_from};
    use crate::display::DisplayInfo;
    use crate::error::CaptureError;

    /// Live monitors through xcap
    #[derive(Default)]
    pub struct ScreenCapture;

    impl CaptureService for ScreenCapture {
        fn displays(&self) -> Result<Vec<DisplayInfo>, CaptureError> {
            let monitors = Monitor::all().context("Failed to get monitors")?;
            if monitors.is_empty() {
                return Err(CaptureError::NoDisplays);
            }
            Ok(monitors
                .iter()
                .map(|m| {
                    let physical = PixelRect {
                        x: m.x(),
                        y: m.y(),
                        width: m.width(),
                        height: m.height(),
                    };
                    DisplayInfo::from_physical(m.id(), physical, m.scale_factor() as f64, m.is_primary())
                })
                .collect())
        }

        fn grab(&self, rect: PixelRect, display: u32) -> Result<RgbImage, CaptureError> {
            let monitors = Monitor::all().context("Failed to get monitors")?;
            let monitor = monitors
                .into_iter()
                .find(|m| m.id() == display)
                .ok_or(CaptureError::UnknownDisplay(display))?;
            let shot = monitor.capture_image().context("Failed to capture screen")?;
            let (w, h) = (shot.width(), shot.height());
            let rgba = RgbaImage::from_raw(w, h, shot.into_raw())
                .context("Captured buffer does not match its dimensions")?;
            let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
            crop_from(&rgb, (monitor.x(), monitor.y()), rect)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn desktop() -> StillImageCapture {
        StillImageCapture::new(RgbImage::from_fn(200, 100, |x, y| Rgb([x as u8, y as u8, 0])))
    }

    #[test]
    fn test_still_capture_crops_requested_rect() {
        let img = desktop()
            .grab(PixelRect { x: 10, y: 20, width: 30, height: 40 }, 0)
            .unwrap();
        assert_eq!(img.dimensions(), (30, 40));
        assert_eq!(img.get_pixel(0, 0), &Rgb([10, 20, 0]));
    }

    #[test]
    fn test_still_capture_clips_partial_overlap() {
        let img = desktop()
            .grab(PixelRect { x: 180, y: 90, width: 50, height: 50 }, 0)
            .unwrap();
        assert_eq!(img.dimensions(), (20, 10));
    }

    #[test]
    fn test_still_capture_rejects_outside_rect() {
        let err = desktop()
            .grab(PixelRect { x: 500, y: 0, width: 10, height: 10 }, 0)
            .unwrap_err();
        assert!(matches!(err, CaptureError::OutOfBounds(_)));
        assert!(matches!(
            desktop().grab(PixelRect { x: 0, y: 0, width: 1, height: 1 }, 7),
            Err(CaptureError::UnknownDisplay(7))
        ));
    }

    #[test]
    fn test_still_capture_reports_single_primary_display() {
        let displays = desktop().with_scale(2.0).displays().unwrap();
        assert_eq!(displays.len(), 1);
        assert!(displays[0].primary);
        assert_eq!(displays[0].logical.width(), 100);
    }
}
