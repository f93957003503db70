use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use kagami_config::translator::TranslatorConfig;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::backend::{CompletionStatus, ResponseEnvelope, TranslationBackend};
use crate::error::{DIAGNOSTIC_LIMIT, TranslateError, truncate};
use crate::request::TranslationRequest;

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
];

/// Decoded `generateContent` body; unknown fields are ignored
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub finish_reason: Option<String>,
    pub content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Gemini `generateContent` over REST
#[derive(Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(config: &TranslatorConfig) -> Result<Self, TranslateError> {
        if config.api_key.trim().is_empty() {
            return Err(TranslateError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs_f64(config.connect_timeout_secs.max(0.1)))
            .read_timeout(Duration::from_secs_f64(config.read_timeout_secs.max(0.1)))
            .build()?;
        let endpoint = config.endpoint();
        tracing::info!("[GEMINI] Using {}", endpoint);
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.trim().to_string(),
        })
    }

    pub fn payload(request: &TranslationRequest) -> Value {
        let mut parts = vec![json!({ "text": request.instructions() })];
        for image in &request.images {
            if let Some(caption) = &image.caption {
                parts.push(json!({ "text": caption }));
            }
            parts.push(json!({
                "inline_data": {
                    "mime_type": "image/png",
                    "data": general_purpose::STANDARD.encode(&image.png),
                }
            }));
        }
        let safety: Vec<Value> = SAFETY_CATEGORIES
            .iter()
            .map(|c| json!({ "category": c, "threshold": "BLOCK_NONE" }))
            .collect();
        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": request.schema.json_schema(),
            },
            "safetySettings": safety,
        })
    }

    /// Map a decoded `generateContent` body to an envelope
    pub fn envelope(data: &GenerateResponse) -> ResponseEnvelope {
        let Some(candidate) = data.candidates.first() else {
            let reason = data.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref());
            return match reason {
                Some(reason) => ResponseEnvelope::with_status(
                    CompletionStatus::RefusalOther,
                    Some(format!("prompt blocked: {reason}")),
                ),
                None => ResponseEnvelope::with_status(CompletionStatus::Empty, None),
            };
        };

        let finish = candidate.finish_reason.as_deref().unwrap_or("STOP");
        match finish {
            "STOP" | "MAX_TOKENS" | "FINISH_REASON_UNSPECIFIED" => {}
            "RECITATION" => {
                return ResponseEnvelope::with_status(
                    CompletionStatus::RefusalRecitation,
                    Some("finishReason=RECITATION".to_string()),
                );
            }
            other => {
                return ResponseEnvelope::with_status(
                    CompletionStatus::RefusalOther,
                    Some(format!("finishReason={other}")),
                );
            }
        }

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();
        let text = text.trim();
        if text.is_empty() {
            ResponseEnvelope::with_status(CompletionStatus::Empty, None)
        } else {
            ResponseEnvelope::normal(text)
        }
    }
}

#[async_trait]
impl TranslationBackend for GeminiBackend {
    async fn send(&self, request: &TranslationRequest) -> Result<ResponseEnvelope, TranslateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::payload(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = truncate(&response.text().await.unwrap_or_default(), DIAGNOSTIC_LIMIT);
            tracing::debug!("[GEMINI] HTTP {}: {}", status, body);
            return Err(if status.is_server_error() {
                TranslateError::Server {
                    status: status.as_u16(),
                    body,
                }
            } else {
                TranslateError::Client {
                    status: status.as_u16(),
                    body,
                }
            });
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::InvalidResponse(truncate(&e.to_string(), DIAGNOSTIC_LIMIT)))?;
        let envelope = Self::envelope(&data);
        tracing::debug!("[GEMINI] {:?} ({} chars)", envelope.status, envelope.text.chars().count());
        Ok(envelope)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
