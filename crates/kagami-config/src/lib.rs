use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use self::capture::CaptureConfig;
use self::recovery::RecoveryConfig;
use self::region::RegionConfig;
use self::translator::TranslatorConfig;
use self::ui::UiConfig;

pub mod capture;
pub mod recovery;
pub mod region;
pub mod translator;
pub mod ui;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub region: RegionConfig,
    pub capture: CaptureConfig,
    pub translator: TranslatorConfig,
    pub recovery: RecoveryConfig,
    pub ui: UiConfig,

    /// Overlay loop tick in milliseconds
    pub delta_time: u64,
    /// How often the overlay re-asserts topmost placement
    pub enforce_topmost_ms: u64,
    /// Minimum interval between two firings of the same command
    pub debounce_ms: u64,
}

impl Config {
    pub fn new() -> Self {
        let delta_time = env_or("KAGAMI_TICK_MS", 60); // 60ms default
        let enforce_topmost_ms = env_or("KAGAMI_TOPMOST_MS", 1000);
        let debounce_ms = env_or("KAGAMI_DEBOUNCE_MS", 250);

        Config {
            region: RegionConfig::new(),
            capture: CaptureConfig::new(),
            translator: TranslatorConfig::new(),
            recovery: RecoveryConfig::new(),
            ui: UiConfig::new(),

            delta_time,
            enforce_topmost_ms,
            debounce_ms,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            region: RegionConfig::default(),
            capture: CaptureConfig::default(),
            translator: TranslatorConfig::default(),
            recovery: RecoveryConfig::default(),
            ui: UiConfig::default(),
            delta_time: 60,
            enforce_topmost_ms: 1000,
            debounce_ms: 250,
        }
    }
}

/// Parse an environment variable, falling back to `default` when unset or malformed
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// `1`/`0` style flag
pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_field_defaults() {
        let json = r#"{
            "region": { "move_band": 12 },
            "capture": {},
            "translator": { "model": "gemini-2.0-flash" },
            "recovery": {},
            "ui": {},
            "delta_time": 30,
            "enforce_topmost_ms": 500,
            "debounce_ms": 100
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.region.move_band, 12);
        assert_eq!(config.region.min_width, 40);
        assert_eq!(config.capture.concat_max, 8);
        assert_eq!(config.translator.backoff_ms, vec![800, 2000]);
        assert_eq!(config.recovery.slices, 3);
        assert!(!config.recovery.retry_translation_only);
        assert_eq!(config.delta_time, 30);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("KAGAMI_TEST_SURELY_UNSET_VAR", 7u32), 7);
    }
}
