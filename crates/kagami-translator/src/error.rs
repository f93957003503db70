use kagami_capture::CaptureError;

/// Longest diagnostic excerpt kept in errors and status lines
pub const DIAGNOSTIC_LIMIT: usize = 120;

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    #[error("Request rejected (HTTP {status}): {body}")]
    Client { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Canceled")]
    Canceled,

    #[error("Refused by backend: {0}")]
    Refused(String),

    #[error("Recitation refusal: none of {bands} band(s) could be translated")]
    RecitationUnrecovered { bands: usize },

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Image encoding failed: {0}")]
    Encode(#[from] CaptureError),
}

impl TranslateError {
    /// Transport failures and 5xx responses may succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, TranslateError::Network(_) | TranslateError::Server { .. })
    }

    /// One-line status suitable for the overlay
    pub fn short(&self) -> String {
        truncate(&self.to_string(), DIAGNOSTIC_LIMIT)
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        let msg = truncate(&e.to_string(), DIAGNOSTIC_LIMIT);
        if e.is_connect() || e.is_timeout() || e.is_request() {
            TranslateError::Network(msg)
        } else if e.is_decode() {
            TranslateError::InvalidResponse(msg)
        } else {
            TranslateError::Http(msg)
        }
    }
}

/// Cut `s` to at most `max` characters, marking the cut with an ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TranslateError::Network("reset".into()).is_retryable());
        assert!(TranslateError::Server { status: 503, body: String::new() }.is_retryable());
        assert!(!TranslateError::Client { status: 400, body: String::new() }.is_retryable());
        assert!(!TranslateError::Canceled.is_retryable());
        assert!(!TranslateError::InvalidResponse("x".into()).is_retryable());
    }

    #[test]
    fn test_short_is_truncated() {
        let err = TranslateError::Client {
            status: 400,
            body: "x".repeat(500),
        };
        let short = err.short();
        assert_eq!(short.chars().count(), DIAGNOSTIC_LIMIT);
        assert!(short.ends_with('…'));
    }

    #[test]
    fn test_truncate_keeps_multibyte_boundaries() {
        assert_eq!(truncate("こんにちは", 3), "こん…");
        assert_eq!(truncate("  short  ", 10), "short");
    }

    #[test]
    fn test_builder_error_is_not_retried() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let err = TranslateError::from(err);
        assert!(matches!(err, TranslateError::Http(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_refused_connection_is_retried() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        let err = TranslateError::from(err);
        assert!(matches!(err, TranslateError::Network(_)));
        assert!(err.is_retryable());
    }
}
