use std::env;

use serde::{Deserialize, Serialize};

use crate::{env_flag, env_or};

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_target_language() -> String {
    "Japanese".to_string()
}

fn default_keep_source() -> bool {
    true
}

fn default_connect_timeout_secs() -> f64 {
    12.0
}

fn default_read_timeout_secs() -> f64 {
    120.0
}

fn default_backoff_ms() -> Vec<u64> {
    vec![800, 2000]
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Overrides the endpoint derived from `model`
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Ask the backend to echo the recognized source text
    #[serde(default = "default_keep_source")]
    pub keep_source: bool,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub speaker: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: f64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: f64,
    /// Delay before each retry; its length is the retry budget
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: Vec<u64>,
}

impl TranslatorConfig {
    pub fn new() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .unwrap_or_default();

        let backoff_ms = env::var("KAGAMI_BACKOFF_MS")
            .ok()
            .map(|v| {
                v.split(',')
                    .filter_map(|part| part.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_else(default_backoff_ms);

        Self {
            api_key,
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| default_model()),
            api_url: env::var("KAGAMI_API_URL").ok(),
            target_language: env::var("KAGAMI_TARGET_LANG")
                .unwrap_or_else(|_| default_target_language()),
            keep_source: env_flag("KAGAMI_KEEP_SOURCE", true),
            tone: env::var("KAGAMI_TONE").unwrap_or_default(),
            speaker: env::var("KAGAMI_SPEAKER").unwrap_or_default(),
            connect_timeout_secs: env_or(
                "KAGAMI_HTTP_CONNECT_TIMEOUT",
                default_connect_timeout_secs(),
            ),
            read_timeout_secs: env_or("KAGAMI_HTTP_READ_TIMEOUT", default_read_timeout_secs()),
            backoff_ms,
        }
    }

    /// REST endpoint for `generateContent`
    pub fn endpoint(&self) -> String {
        if let Some(url) = &self.api_url {
            return url.clone();
        }
        let version = if self.model.contains("2.5") { "v1beta" } else { "v1" };
        format!(
            "https://generativelanguage.googleapis.com/{}/models/{}:generateContent",
            version, self.model
        )
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_url: None,
            target_language: default_target_language(),
            keep_source: default_keep_source(),
            tone: String::new(),
            speaker: String::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            backoff_ms: default_backoff_ms(),
        }
    }
}
