use async_trait::async_trait;

use crate::error::TranslateError;
use crate::request::TranslationRequest;

/// How the backend finished producing its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Normal,
    /// Stopped because the output would reproduce recognized content verbatim
    RefusalRecitation,
    RefusalOther,
    Empty,
}

/// Raw text plus completion status of one backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub text: String,
    pub status: CompletionStatus,
    /// Short reason reported alongside refusals
    pub detail: Option<String>,
}

impl ResponseEnvelope {
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: CompletionStatus::Normal,
            detail: None,
        }
    }

    pub fn with_status(status: CompletionStatus, detail: Option<String>) -> Self {
        Self {
            text: String::new(),
            status,
            detail,
        }
    }
}

/// Image translation provider
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn send(&self, request: &TranslationRequest) -> Result<ResponseEnvelope, TranslateError>;

    fn name(&self) -> &str;
}
