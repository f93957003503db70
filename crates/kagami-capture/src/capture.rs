//! Region capture: map, hide overlays, grab, mask and condition

use image::{DynamicImage, Rgb};
use kagami_config::capture::CaptureConfig;
use kagami_config::ui::UiConfig;
use kagami_core::Region;
use kagami_core::region::text_band_rect;
use kagami_types::{Rect, RegionSlot};

use crate::concat::CaptureFrame;
use crate::display::CaptureCoordinateMapper;
use crate::error::CaptureError;
use crate::guard::{HiddenOverlays, OverlaySurface};
use crate::preprocess::{Enhance, enhance, mask_polygon};
use crate::service::CaptureService;

/// Space kept between the captured area and the text band
const TEXT_BAND_CLEARANCE: i32 = 6;

const MASK_FILL: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Whole main region, text band included
    Full,
    /// Only the part of the main region above the text band
    ExcludeTextBand,
}

/// Runtime-adjustable capture options
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    mode: CaptureMode,
    hide_on_capture: bool,
    preprocess: bool,
    text_margin: i32,
    text_ratio: f32,
}

impl CaptureSettings {
    pub fn from_config(capture: &CaptureConfig, ui: &UiConfig) -> Self {
        Self {
            mode: if capture.capture_full {
                CaptureMode::Full
            } else {
                CaptureMode::ExcludeTextBand
            },
            hide_on_capture: capture.hide_on_capture,
            preprocess: capture.preprocess,
            text_margin: ui.text_margin,
            text_ratio: ui.text_ratio,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> CaptureMode {
        self.mode = match self.mode {
            CaptureMode::Full => CaptureMode::ExcludeTextBand,
            CaptureMode::ExcludeTextBand => CaptureMode::Full,
        };
        self.mode
    }

    pub fn hide_on_capture(&self) -> bool {
        self.hide_on_capture
    }

    pub fn set_hide_on_capture(&mut self, hide: bool) {
        self.hide_on_capture = hide;
    }

    pub fn toggle_hide_on_capture(&mut self) -> bool {
        self.hide_on_capture = !self.hide_on_capture;
        self.hide_on_capture
    }

    pub fn preprocess(&self) -> bool {
        self.preprocess
    }

    pub fn set_text_ratio(&mut self, ratio: f32) {
        self.text_ratio = ratio;
    }

    /// Logical rectangle actually grabbed for `slot`
    pub fn capture_area(&self, slot: RegionSlot, bounds: &Rect) -> Rect {
        match (slot, self.mode) {
            (RegionSlot::Main, CaptureMode::ExcludeTextBand) => {
                let band = text_band_rect(bounds, self.text_margin, self.text_ratio);
                let height = (band.top - TEXT_BAND_CLEARANCE - bounds.top).max(1);
                Rect::new(bounds.left, bounds.top, bounds.right, bounds.top + height)
            }
            _ => *bounds,
        }
    }
}

/// Captures regions through a [`CaptureService`]
pub struct Capturer {
    service: Box<dyn CaptureService>,
    mapper: CaptureCoordinateMapper,
    settings: CaptureSettings,
}

impl Capturer {
    pub fn new(service: Box<dyn CaptureService>, mapper: CaptureCoordinateMapper, settings: CaptureSettings) -> Self {
        Self {
            service,
            mapper,
            settings,
        }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut CaptureSettings {
        &mut self.settings
    }

    /// Grab one region. Overlay `surfaces` are transparent only while the
    /// backend is reading pixels.
    pub fn capture(
        &self,
        slot: RegionSlot,
        region: &Region,
        surfaces: &[&dyn OverlaySurface],
    ) -> Result<CaptureFrame, CaptureError> {
        let area = self.settings.capture_area(slot, &region.bounds());
        let displays = self.service.displays()?;
        let (pixels, display_id) = self.mapper.map(&area, &displays)?;

        let mut rgb = {
            let _hidden = if self.settings.hide_on_capture {
                HiddenOverlays::hide(surfaces)
            } else {
                HiddenOverlays::none()
            };
            self.service.grab(pixels, display_id)?
        };

        if let Some(polygon) = region.polygon() {
            mask_polygon(&mut rgb, polygon, area, MASK_FILL);
        }

        let image = if self.settings.preprocess {
            let params = match slot {
                RegionSlot::Main => Enhance::MAIN,
                RegionSlot::Speaker => Enhance::SPEAKER,
            };
            DynamicImage::ImageLuma8(enhance(&rgb, params))
        } else {
            DynamicImage::ImageRgb8(rgb)
        };

        tracing::debug!(
            "[CAPTURE] {:?} {:?} -> {}x{} px on display {}",
            slot,
            area,
            image.width(),
            image.height(),
            display_id
        );
        Ok(CaptureFrame::new(image, region.clone()))
    }
}
