//! Display layout and logical-to-physical mapping

use kagami_types::{PixelRect, Rect};

use crate::error::CaptureError;

/// One attached monitor
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayInfo {
    pub id: u32,
    /// Geometry in desktop (logical) coordinates
    pub logical: Rect,
    /// Geometry in physical pixels
    pub physical: PixelRect,
    pub scale_x: f64,
    pub scale_y: f64,
    pub primary: bool,
}

impl DisplayInfo {
    /// Display whose logical geometry and scale are derived from physical size
    pub fn from_physical(id: u32, physical: PixelRect, scale: f64, primary: bool) -> Self {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let logical = Rect::from_xywh(
            (physical.x as f64 / scale).round() as i32,
            (physical.y as f64 / scale).round() as i32,
            (physical.width as f64 / scale).round() as i32,
            (physical.height as f64 / scale).round() as i32,
        );
        Self {
            id,
            logical,
            physical,
            scale_x: scale,
            scale_y: scale,
            primary,
        }
    }
}

/// How logical regions are addressed in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// Span all displays; scale by the display under the region's center
    VirtualDesktop,
    /// Overlay covers only the primary display; map into one indexed monitor
    PrimaryOnly { monitor_index: usize },
}

fn primary(displays: &[DisplayInfo]) -> Result<&DisplayInfo, CaptureError> {
    displays
        .iter()
        .find(|d| d.primary)
        .or_else(|| displays.first())
        .ok_or(CaptureError::NoDisplays)
}

/// Logical rectangle the overlay should cover
pub fn desktop_bounds(displays: &[DisplayInfo], addressing: Addressing) -> Result<Rect, CaptureError> {
    match addressing {
        Addressing::VirtualDesktop => displays
            .iter()
            .map(|d| d.logical)
            .reduce(|a, b| a.union(b))
            .ok_or(CaptureError::NoDisplays),
        Addressing::PrimaryOnly { .. } => Ok(primary(displays)?.logical),
    }
}

/// Converts logical capture rectangles into physical pixel rectangles
#[derive(Debug, Clone, Copy)]
pub struct CaptureCoordinateMapper {
    addressing: Addressing,
}

impl CaptureCoordinateMapper {
    pub fn new(addressing: Addressing) -> Self {
        Self { addressing }
    }

    pub fn addressing(&self) -> Addressing {
        self.addressing
    }

    /// Physical rectangle plus the display it should be grabbed from.
    /// Width and height are never below 1.
    pub fn map(&self, rect: &Rect, displays: &[DisplayInfo]) -> Result<(PixelRect, u32), CaptureError> {
        match self.addressing {
            Addressing::VirtualDesktop => {
                let center = rect.center();
                let display = displays
                    .iter()
                    .find(|d| d.logical.contains(center))
                    .map(Ok)
                    .unwrap_or_else(|| primary(displays))?;
                let (sx, sy) = (display.scale_x, display.scale_y);
                let px = PixelRect {
                    x: (rect.left as f64 * sx) as i32,
                    y: (rect.top as f64 * sy) as i32,
                    width: scaled_len(rect.width(), sx),
                    height: scaled_len(rect.height(), sy),
                };
                Ok((px, display.id))
            }
            Addressing::PrimaryOnly { monitor_index } => {
                let overlay = primary(displays)?.logical;
                let monitor = displays
                    .get(monitor_index.min(displays.len().saturating_sub(1)))
                    .ok_or(CaptureError::NoDisplays)?;
                let sx = monitor.physical.width as f64 / overlay.width().max(1) as f64;
                let sy = monitor.physical.height as f64 / overlay.height().max(1) as f64;
                let px = PixelRect {
                    x: monitor.physical.x + ((rect.left - overlay.left) as f64 * sx) as i32,
                    y: monitor.physical.y + ((rect.top - overlay.top) as f64 * sy) as i32,
                    width: scaled_len(rect.width(), sx),
                    height: scaled_len(rect.height(), sy),
                };
                Ok((px, monitor.id))
            }
        }
    }
}

fn scaled_len(len: i32, scale: f64) -> u32 {
    ((len as f64 * scale) as i64).max(1) as u32
}
