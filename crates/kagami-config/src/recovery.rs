use serde::{Deserialize, Serialize};

use crate::{env_flag, env_or};

fn default_slices() -> u32 {
    3
}

/// Behavior when the backend refuses with a recitation status
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Re-ask once with the translation-only schema before slicing
    #[serde(default)]
    pub retry_translation_only: bool,
    /// Number of horizontal bands; values below 2 are raised to 2
    #[serde(default = "default_slices")]
    pub slices: u32,
}

impl RecoveryConfig {
    pub fn new() -> Self {
        Self {
            retry_translation_only: env_flag("KAGAMI_RECITATION_RETRY_TRANSLATION_ONLY", false),
            slices: env_or("KAGAMI_RECITATION_SLICES", default_slices()),
        }
    }

    pub fn effective_slices(&self) -> u32 {
        self.slices.max(2)
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            retry_translation_only: false,
            slices: default_slices(),
        }
    }
}
