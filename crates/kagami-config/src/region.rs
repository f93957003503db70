use serde::{Deserialize, Serialize};

use crate::{env_flag, env_or};

fn default_handle_size() -> i32 {
    12
}

fn default_handle_hot() -> i32 {
    6
}

fn default_min_width() -> i32 {
    40
}

fn default_min_height() -> i32 {
    30
}

fn default_move_band() -> i32 {
    8
}

fn default_true() -> bool {
    true
}

fn default_initial_margin() -> i32 {
    40
}

/// Region editing geometry
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct RegionConfig {
    #[serde(default = "default_handle_size")]
    pub handle_size: i32,
    /// Extra hit tolerance around each handle
    #[serde(default = "default_handle_hot")]
    pub handle_hot: i32,
    #[serde(default = "default_min_width")]
    pub min_width: i32,
    #[serde(default = "default_min_height")]
    pub min_height: i32,
    /// Inward border strip that moves the region
    #[serde(default = "default_move_band")]
    pub move_band: i32,
    /// Hover-driven editing without entering edit mode
    #[serde(default = "default_true")]
    pub auto_edit: bool,
    #[serde(default = "default_true")]
    pub border_move: bool,
    /// Drag anywhere inside to move (opt-in)
    #[serde(default)]
    pub interior_move: bool,
    /// Inset of the initial main region from the desktop edges
    #[serde(default = "default_initial_margin")]
    pub initial_margin: i32,
}

impl RegionConfig {
    pub fn new() -> Self {
        Self {
            handle_size: env_or("KAGAMI_HANDLE_SIZE", default_handle_size()),
            handle_hot: env_or("KAGAMI_HANDLE_HOT", default_handle_hot()),
            min_width: env_or("KAGAMI_ROI_MIN_W", default_min_width()),
            min_height: env_or("KAGAMI_ROI_MIN_H", default_min_height()),
            move_band: env_or("KAGAMI_MOVE_BAND", default_move_band()),
            auto_edit: env_flag("KAGAMI_ROI_AUTO_EDIT", true),
            border_move: env_flag("KAGAMI_ROI_BORDER_MOVE", true),
            interior_move: env_flag("KAGAMI_ROI_AUTO_MOVE", false),
            initial_margin: default_initial_margin(),
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            handle_size: default_handle_size(),
            handle_hot: default_handle_hot(),
            min_width: default_min_width(),
            min_height: default_min_height(),
            move_band: default_move_band(),
            auto_edit: true,
            border_move: true,
            interior_move: false,
            initial_margin: default_initial_margin(),
        }
    }
}
