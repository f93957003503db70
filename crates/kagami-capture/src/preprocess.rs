//! Image conditioning applied before frames are sent off

use image::{DynamicImage, GrayImage, Rgb, RgbImage, imageops};
use kagami_core::Polygon;
use kagami_types::Rect;

/// Tonal adjustments applied to a grayscale frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enhance {
    pub brightness: f32,
    pub contrast: f32,
    pub sharpen: bool,
}

impl Enhance {
    /// Main region: slightly brighter, strong contrast, light sharpening
    pub const MAIN: Enhance = Enhance {
        brightness: 1.12,
        contrast: 1.32,
        sharpen: true,
    };

    /// Speaker name plates are short and already high contrast
    pub const SPEAKER: Enhance = Enhance {
        brightness: 1.0,
        contrast: 1.2,
        sharpen: false,
    };
}

/// Grayscale, then brightness, contrast and optional sharpening
pub fn enhance(img: &RgbImage, params: Enhance) -> GrayImage {
    let mut gray = DynamicImage::ImageRgb8(img.clone()).to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return gray;
    }

    if (params.brightness - 1.0).abs() > f32::EPSILON {
        for p in gray.pixels_mut() {
            p.0[0] = clamp_u8(p.0[0] as f32 * params.brightness);
        }
    }

    if (params.contrast - 1.0).abs() > f32::EPSILON {
        // Contrast pivots around the mean intensity
        let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
        let mean = (sum as f32 / (gray.width() * gray.height()) as f32).round();
        for p in gray.pixels_mut() {
            p.0[0] = clamp_u8(mean + (p.0[0] as f32 - mean) * params.contrast);
        }
    }

    if params.sharpen {
        gray = imageops::unsharpen(&gray, 0.8, 2);
    }
    gray
}

fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Paint everything outside `polygon` with `fill`.
///
/// `area` is the logical rectangle `img` was captured from; pixel centers
/// are mapped back into it before the containment test.
pub fn mask_polygon(img: &mut RgbImage, polygon: &Polygon, area: Rect, fill: Rgb<u8>) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || area.is_empty() {
        return;
    }
    let sx = area.width() as f64 / w as f64;
    let sy = area.height() as f64 / h as f64;
    for (x, y, px) in img.enumerate_pixels_mut() {
        let lx = area.left as f64 + (x as f64 + 0.5) * sx;
        let ly = area.top as f64 + (y as f64 + 0.5) * sy;
        if !polygon.contains_f(lx, ly) {
            *px = fill;
        }
    }
}
