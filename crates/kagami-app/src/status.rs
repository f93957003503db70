use kagami_config::ui::UiConfig;

pub const FONT_MIN: u32 = 8;
pub const FONT_MAX: u32 = 40;
pub const RATIO_MIN: f32 = 0.12;
pub const RATIO_MAX: f32 = 0.9;
const RATIO_STEP: f32 = 0.05;

pub const NO_TEXT: &str = "(no text found)";
pub const CANCELED: &str = "(canceled)";

/// Text and busy state shown by the overlay
#[derive(Clone, Debug)]
pub struct OverlayStatus {
    pub busy: bool,
    /// Busy animation phase, 0..=3
    pub dots: u8,
    pub text: String,
    /// Recognized source text of the last applied result
    pub source: String,
    pub font_pt: u32,
    pub text_ratio: f32,
}

impl OverlayStatus {
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            busy: false,
            dots: 0,
            text: String::new(),
            source: String::new(),
            font_pt: ui.font_pt.clamp(FONT_MIN, FONT_MAX),
            text_ratio: ui.text_ratio.clamp(RATIO_MIN, RATIO_MAX),
        }
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        self.dots = 0;
    }

    /// Advance the busy animation; no-op when idle
    pub fn tick_dots(&mut self) {
        if self.busy {
            self.dots = (self.dots + 1) % 4;
        }
    }

    pub fn show(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn font_smaller(&mut self) {
        self.font_pt = self.font_pt.saturating_sub(1).max(FONT_MIN);
    }

    pub fn font_larger(&mut self) {
        self.font_pt = (self.font_pt + 1).min(FONT_MAX);
    }

    pub fn area_smaller(&mut self) {
        self.text_ratio = round2(self.text_ratio - RATIO_STEP).max(RATIO_MIN);
    }

    pub fn area_larger(&mut self) {
        self.text_ratio = round2(self.text_ratio + RATIO_STEP).min(RATIO_MAX);
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}
