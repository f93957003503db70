pub mod backend;
pub mod error;
pub mod gemini;
pub mod parse;
pub mod pipeline;
pub mod request;
pub mod retry;

pub use backend::{CompletionStatus, ResponseEnvelope, TranslationBackend};
pub use error::TranslateError;
pub use gemini::GeminiBackend;
pub use parse::{ParseTier, ParsedResponse, parse_response};
pub use pipeline::{JobImages, JobOutcome, JobReport, TranslationPipeline, TranslationResult};
pub use request::{OutputSchema, Persona, TranslationRequest};
pub use retry::RetryPolicy;
