use serde::{Deserialize, Serialize};

use crate::{env_flag, env_or};

fn default_true() -> bool {
    true
}

fn default_concat_max() -> usize {
    8
}

fn default_concat_gap() -> u32 {
    6
}

/// Pixel format frames are normalized to before stacking
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    #[serde(rename = "L")]
    Luma,
    #[serde(rename = "RGB")]
    Rgb,
}

impl ColorMode {
    fn from_env() -> Self {
        match std::env::var("KAGAMI_CONCAT_MODE") {
            Ok(v) if v.trim().eq_ignore_ascii_case("rgb") => ColorMode::Rgb,
            _ => ColorMode::Luma,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CaptureConfig {
    /// Map into one indexed physical display instead of the virtual desktop
    #[serde(default)]
    pub primary_only: bool,
    #[serde(default)]
    pub monitor_index: usize,
    /// Grayscale + contrast boost before sending
    #[serde(default = "default_true")]
    pub preprocess: bool,
    /// Make overlay surfaces transparent while grabbing
    #[serde(default = "default_true")]
    pub hide_on_capture: bool,
    /// Capture the full region, or only the part above the text band
    #[serde(default = "default_true")]
    pub capture_full: bool,
    #[serde(default = "default_concat_max")]
    pub concat_max: usize,
    #[serde(default = "default_concat_gap")]
    pub concat_gap: u32,
    #[serde(default)]
    pub concat_mode: ColorMode,
}

impl CaptureConfig {
    pub fn new() -> Self {
        Self {
            primary_only: env_flag("KAGAMI_PRIMARY_ONLY", false),
            monitor_index: env_or("KAGAMI_MON_INDEX", 0),
            preprocess: env_flag("KAGAMI_PREPROCESS", true),
            hide_on_capture: env_flag("KAGAMI_HIDE_ON_CAPTURE", true),
            capture_full: env_flag("KAGAMI_CAPTURE_FULL", true),
            concat_max: env_or("KAGAMI_CONCAT_MAX", default_concat_max()),
            concat_gap: env_or("KAGAMI_CONCAT_GAP", default_concat_gap()),
            concat_mode: ColorMode::from_env(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            primary_only: false,
            monitor_index: 0,
            preprocess: true,
            hide_on_capture: true,
            capture_full: true,
            concat_max: default_concat_max(),
            concat_gap: default_concat_gap(),
            concat_mode: ColorMode::Luma,
        }
    }
}
