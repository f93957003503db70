//! One translation job: request, retry, parse, recover

use std::sync::Arc;

use image::DynamicImage;
use kagami_capture::{encode_png, slice_bands};
use kagami_config::recovery::RecoveryConfig;
use kagami_config::translator::TranslatorConfig;
use kagami_core::{JobState, JobTicket};
use kagami_types::JobId;

use crate::backend::{CompletionStatus, ResponseEnvelope, TranslationBackend};
use crate::error::TranslateError;
use crate::parse::{ParseTier, parse_response};
use crate::request::{OutputSchema, Persona, TranslationRequest};
use crate::retry::RetryPolicy;

/// Images captured for one job
#[derive(Debug, Clone)]
pub struct JobImages {
    /// Main region, or the composed concat buffer
    pub main: DynamicImage,
    pub speaker: Option<DynamicImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub source: String,
    pub translation: String,
    pub tier: ParseTier,
    /// Bands that contributed, if recitation recovery ran
    pub recovered_bands: Option<(usize, usize)>,
}

impl TranslationResult {
    fn empty() -> Self {
        Self {
            source: String::new(),
            translation: String::new(),
            tier: ParseTier::StructuredJson,
            recovered_bands: None,
        }
    }

    /// Text to show; the source stands in for a blank translation
    pub fn display_text(&self) -> &str {
        if self.translation.trim().is_empty() {
            self.source.trim()
        } else {
            self.translation.trim()
        }
    }
}

#[derive(Debug)]
pub enum JobOutcome {
    Succeeded(TranslationResult),
    Canceled,
    Failed(TranslateError),
}

/// Finished job as handed back to the overlay loop
#[derive(Debug)]
pub struct JobReport {
    pub id: JobId,
    pub outcome: JobOutcome,
}

#[derive(Clone)]
pub struct TranslationPipeline {
    backend: Arc<dyn TranslationBackend>,
    retry: RetryPolicy,
    recovery: RecoveryConfig,
    persona: Persona,
    target_language: String,
    keep_source: bool,
}

impl TranslationPipeline {
    pub fn new(backend: Arc<dyn TranslationBackend>, config: &TranslatorConfig, recovery: &RecoveryConfig) -> Self {
        Self {
            backend,
            retry: RetryPolicy::from_config(config),
            recovery: recovery.clone(),
            persona: Persona::from_config(config),
            target_language: config.target_language.clone(),
            keep_source: config.keep_source,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn set_persona(&mut self, persona: Persona) {
        self.persona = persona;
    }

    /// Run a job to its terminal state
    pub async fn run(&self, ticket: &JobTicket, images: JobImages) -> JobOutcome {
        let outcome = match self.translate(ticket, &images).await {
            Ok(result) => JobOutcome::Succeeded(result),
            Err(TranslateError::Canceled) => JobOutcome::Canceled,
            Err(err) => JobOutcome::Failed(err),
        };
        match &outcome {
            JobOutcome::Succeeded(result) => {
                tracing::info!(
                    "[PIPELINE] {} succeeded ({:?}, {} chars)",
                    ticket.id(),
                    result.tier,
                    result.translation.chars().count()
                );
                ticket.set_state(JobState::Succeeded);
            }
            JobOutcome::Canceled => {
                tracing::info!("[PIPELINE] {} canceled", ticket.id());
                ticket.set_state(JobState::Canceled);
            }
            JobOutcome::Failed(err) => {
                tracing::error!("[PIPELINE] {} failed: {}", ticket.id(), err.short());
                ticket.set_state(JobState::Failed);
            }
        }
        outcome
    }

    fn request(
        &self,
        main: &DynamicImage,
        speaker: Option<&DynamicImage>,
        schema: OutputSchema,
    ) -> Result<TranslationRequest, TranslateError> {
        let mut request = TranslationRequest::new(encode_png(main)?, self.persona.clone(), &self.target_language, schema);
        if let Some(speaker) = speaker {
            request = request.with_speaker_hint(encode_png(speaker)?);
        }
        Ok(request)
    }

    async fn translate(&self, ticket: &JobTicket, images: &JobImages) -> Result<TranslationResult, TranslateError> {
        let schema = if self.keep_source {
            OutputSchema::SourceAndTranslation
        } else {
            OutputSchema::TranslationOnly
        };
        let request = self.request(&images.main, images.speaker.as_ref(), schema)?;
        tracing::debug!("[PIPELINE] {} sending {:?} via {}", ticket.id(), schema, self.backend.name());
        let envelope = self.retry.send(self.backend.as_ref(), &request, ticket).await?;
        match Self::interpret(envelope)? {
            Some(result) => Ok(result),
            None => self.recover(ticket, images, schema).await,
        }
    }

    /// `Ok(None)` means a recitation refusal that recovery may fix
    fn interpret(envelope: ResponseEnvelope) -> Result<Option<TranslationResult>, TranslateError> {
        match envelope.status {
            CompletionStatus::Normal => {
                let parsed = parse_response(&envelope.text);
                if parsed.is_degraded() {
                    tracing::warn!("[PIPELINE] Response was not structured, showing raw text");
                }
                Ok(Some(TranslationResult {
                    source: parsed.source,
                    translation: parsed.translation,
                    tier: parsed.tier,
                    recovered_bands: None,
                }))
            }
            CompletionStatus::Empty => Ok(Some(TranslationResult::empty())),
            CompletionStatus::RefusalOther => Err(TranslateError::Refused(
                envelope.detail.unwrap_or_else(|| "refused".to_string()),
            )),
            CompletionStatus::RefusalRecitation => Ok(None),
        }
    }

    async fn recover(
        &self,
        ticket: &JobTicket,
        images: &JobImages,
        schema: OutputSchema,
    ) -> Result<TranslationResult, TranslateError> {
        tracing::warn!("[RECOVERY] {} hit a recitation refusal", ticket.id());

        if self.recovery.retry_translation_only && schema == OutputSchema::SourceAndTranslation {
            let request = self.request(&images.main, images.speaker.as_ref(), OutputSchema::TranslationOnly)?;
            match self.retry.send(self.backend.as_ref(), &request, ticket).await {
                Ok(envelope) => match envelope.status {
                    CompletionStatus::RefusalRecitation | CompletionStatus::RefusalOther => {
                        tracing::debug!("[RECOVERY] Translation-only request refused as well: {:?}", envelope.status);
                    }
                    CompletionStatus::Normal | CompletionStatus::Empty => {
                        if let Some(result) = Self::interpret(envelope)? {
                            tracing::info!("[RECOVERY] {} translation-only request succeeded", ticket.id());
                            return Ok(result);
                        }
                    }
                },
                Err(TranslateError::Canceled) => return Err(TranslateError::Canceled),
                Err(err) => tracing::warn!("[RECOVERY] Translation-only request failed: {}", err.short()),
            }
        }

        let bands = slice_bands(&images.main, self.recovery.effective_slices() as usize);
        let total = bands.len();
        let mut pieces = Vec::new();
        let mut worst = ParseTier::StructuredJson;

        for (index, band) in bands.iter().enumerate() {
            if !ticket.is_live() {
                return Err(TranslateError::Canceled);
            }
            let request = self.request(band, None, OutputSchema::TranslationOnly)?;
            match self.retry.send(self.backend.as_ref(), &request, ticket).await {
                Ok(envelope) if envelope.status == CompletionStatus::Normal => {
                    let parsed = parse_response(&envelope.text);
                    let text = parsed.display_text().to_string();
                    if text.is_empty() {
                        tracing::debug!("[RECOVERY] Band {}/{} produced no text", index + 1, total);
                        continue;
                    }
                    worst = worst.max(parsed.tier);
                    pieces.push(text);
                }
                Ok(envelope) => {
                    tracing::warn!("[RECOVERY] Band {}/{} skipped: {:?}", index + 1, total, envelope.status);
                }
                Err(TranslateError::Canceled) => return Err(TranslateError::Canceled),
                Err(err) => {
                    tracing::warn!("[RECOVERY] Band {}/{} failed: {}", index + 1, total, err.short());
                }
            }
        }

        if pieces.is_empty() {
            return Err(TranslateError::RecitationUnrecovered { bands: total });
        }
        tracing::info!("[RECOVERY] {} recovered {}/{} band(s)", ticket.id(), pieces.len(), total);
        Ok(TranslationResult {
            source: String::new(),
            translation: pieces.join("\n"),
            tier: worst,
            recovered_bands: Some((pieces.len(), total)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::ScriptedBackend;
    use image::GrayImage;
    use kagami_core::JobScheduler;
    use std::time::Duration;

    fn images() -> JobImages {
        JobImages {
            main: DynamicImage::ImageLuma8(GrayImage::new(60, 90)),
            speaker: None,
        }
    }

    fn pipeline(backend: Arc<ScriptedBackend>, recovery: RecoveryConfig) -> TranslationPipeline {
        TranslationPipeline::new(backend, &TranslatorConfig::default(), &recovery)
            .with_retry(RetryPolicy::new(vec![Duration::from_millis(1), Duration::from_millis(1)]))
    }

    fn recitation() -> Result<ResponseEnvelope, TranslateError> {
        Ok(ResponseEnvelope::with_status(CompletionStatus::RefusalRecitation, None))
    }

    #[tokio::test]
    async fn test_normal_response_is_parsed() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(ResponseEnvelope::normal(
            r#"{"source":"Hello","translation":"こんにちは"}"#,
        ))]));
        let ticket = JobScheduler::new().start();
        let outcome = pipeline(backend.clone(), RecoveryConfig::default()).run(&ticket, images()).await;
        let JobOutcome::Succeeded(result) = outcome else {
            panic!("expected success");
        };
        assert_eq!(result.source, "Hello");
        assert_eq!(result.translation, "こんにちは");
        assert_eq!(ticket.state(), JobState::Succeeded);
        assert_eq!(backend.seen(), vec![(OutputSchema::SourceAndTranslation, 1)]);
    }

    #[tokio::test]
    async fn test_recitation_recovery_tolerates_failed_band() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            recitation(),
            Ok(ResponseEnvelope::normal(r#"{"translation":"A"}"#)),
            Err(TranslateError::Client { status: 400, body: "bad band".into() }),
            Ok(ResponseEnvelope::normal(r#"{"translation":"C"}"#)),
        ]));
        let ticket = JobScheduler::new().start();
        let outcome = pipeline(backend.clone(), RecoveryConfig::default()).run(&ticket, images()).await;
        let JobOutcome::Succeeded(result) = outcome else {
            panic!("expected recovered success");
        };
        assert_eq!(result.translation, "A\nC");
        assert_eq!(result.recovered_bands, Some((2, 3)));
        assert_eq!(ticket.state(), JobState::Succeeded);

        // Bands are sent translation-only without the speaker hint
        let seen = backend.seen();
        assert_eq!(seen.len(), 4);
        assert!(seen[1..].iter().all(|s| *s == (OutputSchema::TranslationOnly, 1)));
    }

    #[tokio::test]
    async fn test_recitation_with_no_band_success_fails() {
        let backend = Arc::new(ScriptedBackend::new(vec![recitation(), recitation(), recitation(), recitation()]));
        let ticket = JobScheduler::new().start();
        let outcome = pipeline(backend, RecoveryConfig::default()).run(&ticket, images()).await;
        assert!(matches!(
            outcome,
            JobOutcome::Failed(TranslateError::RecitationUnrecovered { bands: 3 })
        ));
        assert_eq!(ticket.state(), JobState::Failed);
    }

    #[tokio::test]
    async fn test_translation_only_retry_runs_before_slicing() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            recitation(),
            Ok(ResponseEnvelope::normal(r#"{"translation":"whole"}"#)),
        ]));
        let recovery = RecoveryConfig {
            retry_translation_only: true,
            slices: 3,
        };
        let ticket = JobScheduler::new().start();
        let outcome = pipeline(backend.clone(), recovery).run(&ticket, images()).await;
        let JobOutcome::Succeeded(result) = outcome else {
            panic!("expected success");
        };
        assert_eq!(result.translation, "whole");
        assert_eq!(backend.calls(), 2);
    }

    fn refused(reason: &str) -> Result<ResponseEnvelope, TranslateError> {
        Ok(ResponseEnvelope::with_status(CompletionStatus::RefusalOther, Some(reason.into())))
    }

    #[tokio::test]
    async fn test_refused_translation_only_retry_falls_back_to_bands() {
        for second in [recitation(), refused("finishReason=SAFETY")] {
            let backend = Arc::new(ScriptedBackend::new(vec![
                recitation(),
                second,
                Ok(ResponseEnvelope::normal(r#"{"translation":"A"}"#)),
                Ok(ResponseEnvelope::normal(r#"{"translation":"B"}"#)),
                Ok(ResponseEnvelope::normal(r#"{"translation":"C"}"#)),
            ]));
            let recovery = RecoveryConfig {
                retry_translation_only: true,
                slices: 3,
            };
            let ticket = JobScheduler::new().start();
            let outcome = pipeline(backend.clone(), recovery).run(&ticket, images()).await;
            let JobOutcome::Succeeded(result) = outcome else {
                panic!("expected recovered success");
            };
            assert_eq!(result.translation, "A\nB\nC");
            assert_eq!(result.recovered_bands, Some((3, 3)));
            assert_eq!(backend.calls(), 5);
        }
    }

    #[tokio::test]
    async fn test_refused_band_is_skipped() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            recitation(),
            refused("finishReason=SAFETY"),
            Ok(ResponseEnvelope::normal(r#"{"translation":"B"}"#)),
            recitation(),
        ]));
        let ticket = JobScheduler::new().start();
        let outcome = pipeline(backend.clone(), RecoveryConfig::default()).run(&ticket, images()).await;
        let JobOutcome::Succeeded(result) = outcome else {
            panic!("expected recovered success");
        };
        assert_eq!(result.translation, "B");
        assert_eq!(result.recovered_bands, Some((1, 3)));
    }

    #[tokio::test]
    async fn test_slice_count_has_floor_of_two() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            recitation(),
            Ok(ResponseEnvelope::normal("top")),
            Ok(ResponseEnvelope::normal("bottom")),
        ]));
        let recovery = RecoveryConfig {
            retry_translation_only: false,
            slices: 1,
        };
        let ticket = JobScheduler::new().start();
        let outcome = pipeline(backend.clone(), recovery).run(&ticket, images()).await;
        let JobOutcome::Succeeded(result) = outcome else {
            panic!("expected success");
        };
        assert_eq!(result.translation, "top\nbottom");
        assert_eq!(result.tier, ParseTier::RawText);
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_other_refusal_fails_without_recovery() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(ResponseEnvelope::with_status(
            CompletionStatus::RefusalOther,
            Some("finishReason=SAFETY".into()),
        ))]));
        let ticket = JobScheduler::new().start();
        let outcome = pipeline(backend.clone(), RecoveryConfig::default()).run(&ticket, images()).await;
        assert!(matches!(outcome, JobOutcome::Failed(TranslateError::Refused(_))));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_status_is_success_without_text() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(ResponseEnvelope::with_status(
            CompletionStatus::Empty,
            None,
        ))]));
        let ticket = JobScheduler::new().start();
        let outcome = pipeline(backend, RecoveryConfig::default()).run(&ticket, images()).await;
        let JobOutcome::Succeeded(result) = outcome else {
            panic!("expected success");
        };
        assert_eq!(result.display_text(), "");
    }

    #[tokio::test]
    async fn test_cancel_during_request_yields_canceled() {
        let scheduler = JobScheduler::new();
        let ticket = scheduler.start();
        let backend = Arc::new(
            ScriptedBackend::new(vec![Ok(ResponseEnvelope::normal("late"))]).with_delay(Duration::from_secs(30)),
        );
        let pipeline = pipeline(backend, RecoveryConfig::default());
        let canceler = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                scheduler.cancel();
            })
        };
        let outcome = tokio::time::timeout(Duration::from_secs(5), pipeline.run(&ticket, images()))
            .await
            .unwrap();
        assert!(matches!(outcome, JobOutcome::Canceled));
        assert_eq!(ticket.state(), JobState::Canceled);
        canceler.await.unwrap();
    }

    #[tokio::test]
    async fn test_speaker_hint_is_attached() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(ResponseEnvelope::normal(r#"{"translation":"x"}"#))]));
        let ticket = JobScheduler::new().start();
        let mut images = images();
        images.speaker = Some(DynamicImage::ImageLuma8(GrayImage::new(20, 10)));
        pipeline(backend.clone(), RecoveryConfig::default()).run(&ticket, images).await;
        assert_eq!(backend.seen(), vec![(OutputSchema::SourceAndTranslation, 2)]);
    }
}
