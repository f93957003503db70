use serde::{Deserialize, Serialize};

use crate::{env_flag, env_or};

fn default_text_ratio() -> f32 {
    0.28
}

fn default_font_pt() -> u32 {
    12
}

fn default_text_margin() -> i32 {
    8
}

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct UiConfig {
    /// Share of the main region used by the in-region text band
    #[serde(default = "default_text_ratio")]
    pub text_ratio: f32,
    #[serde(default = "default_font_pt")]
    pub font_pt: u32,
    #[serde(default = "default_text_margin")]
    pub text_margin: i32,
    #[serde(default = "default_true")]
    pub show_main_frame: bool,
    #[serde(default = "default_true")]
    pub show_speaker_frame: bool,
}

impl UiConfig {
    pub fn new() -> Self {
        Self {
            text_ratio: env_or("KAGAMI_TEXT_RATIO", default_text_ratio()),
            font_pt: env_or("KAGAMI_FONT_PT", default_font_pt()),
            text_margin: default_text_margin(),
            show_main_frame: env_flag("KAGAMI_SHOW_MAIN_FRAME", true),
            show_speaker_frame: env_flag("KAGAMI_SHOW_SPEAKER_FRAME", true),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            text_ratio: default_text_ratio(),
            font_pt: default_font_pt(),
            text_margin: default_text_margin(),
            show_main_frame: true,
            show_speaker_frame: true,
        }
    }
}
