use kagami_config::translator::TranslatorConfig;
use serde_json::{Value, json};

/// Shape of the JSON object the backend must answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSchema {
    /// `{source, translation}`
    SourceAndTranslation,
    /// `{translation}` only
    TranslationOnly,
}

impl OutputSchema {
    pub fn json_schema(self) -> Value {
        match self {
            OutputSchema::SourceAndTranslation => json!({
                "type": "OBJECT",
                "properties": {
                    "source": { "type": "STRING" },
                    "translation": { "type": "STRING" }
                },
                "required": ["source", "translation"]
            }),
            OutputSchema::TranslationOnly => json!({
                "type": "OBJECT",
                "properties": {
                    "translation": { "type": "STRING" }
                },
                "required": ["translation"]
            }),
        }
    }
}

/// Speaker and tone hints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Persona {
    pub speaker: String,
    pub tone: String,
}

impl Persona {
    pub fn new(speaker: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            tone: tone.into(),
        }
    }

    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(config.speaker.trim(), config.tone.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.speaker.is_empty() && self.tone.is_empty()
    }

    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "No particular speaker or tone is specified.".to_string();
        }
        let mut parts = Vec::new();
        if !self.speaker.is_empty() {
            parts.push(format!("The speaker is \"{}\".", self.speaker));
        }
        if !self.tone.is_empty() {
            parts.push(format!("Use this tone/style: \"{}\".", self.tone));
        }
        parts.join(" ")
    }
}

/// PNG image with an optional caption placed before it
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub png: Vec<u8>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub images: Vec<ImagePart>,
    pub persona: Persona,
    pub target_language: String,
    pub schema: OutputSchema,
}

pub const SPEAKER_HINT_CAPTION: &str =
    "The next image is a speaker hint (name plate or portrait).";

impl TranslationRequest {
    pub fn new(main_png: Vec<u8>, persona: Persona, target_language: impl Into<String>, schema: OutputSchema) -> Self {
        Self {
            images: vec![ImagePart {
                png: main_png,
                caption: None,
            }],
            persona,
            target_language: target_language.into(),
            schema,
        }
    }

    pub fn with_speaker_hint(mut self, png: Vec<u8>) -> Self {
        self.images.push(ImagePart {
            png,
            caption: Some(SPEAKER_HINT_CAPTION.to_string()),
        });
        self
    }

    pub fn instructions(&self) -> String {
        let output = match self.schema {
            OutputSchema::SourceAndTranslation => {
                r#"Reply with this JSON object only: {"source": "the text as read, in its original language", "translation": "a natural translation"}. If no text can be read, use an empty source and "(no text found)" as the translation."#
            }
            OutputSchema::TranslationOnly => {
                r#"Reply with this JSON object only: {"translation": "a natural translation"}. If no text can be read, use "(no text found)" as the translation."#
            }
        };
        let mut prompt = format!(
            "You translate game UI and dialogue. Read the text in the image accurately and translate it into {}, keeping the meaning and making it sound natural in context. {} {}",
            self.target_language,
            self.persona.describe(),
            output
        );
        if self.images.len() > 1 {
            prompt.push_str(" If a second image is given, use it only as a hint about who is speaking.");
        }
        prompt
    }
}
