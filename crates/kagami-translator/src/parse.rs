//! Tolerant extraction of `{source, translation}` from model output

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)["']?\bsource\b["']?\s*:\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#)
        .expect("valid source regex")
});

static TRANSLATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)["']?\b(?:translation|ja)\b["']?\s*:\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#)
        .expect("valid translation regex")
});

/// Which step of the cascade produced the result, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseTier {
    /// Whole payload (fence stripped) was a JSON object
    StructuredJson,
    /// JSON object cut from the first `{` to the last `}`
    BraceSlice,
    /// `key: "value"` pairs matched loosely
    LooseFields,
    /// Nothing structured found; the text itself is the translation
    RawText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub source: String,
    pub translation: String,
    pub tier: ParseTier,
}

impl ParsedResponse {
    pub fn is_degraded(&self) -> bool {
        self.tier == ParseTier::RawText
    }

    /// Translation, or the recognized source when the translation is blank
    pub fn display_text(&self) -> &str {
        if self.translation.trim().is_empty() {
            self.source.trim()
        } else {
            self.translation.trim()
        }
    }
}

pub fn parse_response(raw: &str) -> ParsedResponse {
    let text = strip_fence(raw.trim());

    if let Some((source, translation)) = parse_object(text) {
        return ParsedResponse {
            source,
            translation,
            tier: ParseTier::StructuredJson,
        };
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Some((source, translation)) = parse_object(&text[start..=end]) {
                return ParsedResponse {
                    source,
                    translation,
                    tier: ParseTier::BraceSlice,
                };
            }
        }
    }

    if let Some(translation) = capture_field(&TRANSLATION_RE, text) {
        return ParsedResponse {
            source: capture_field(&SOURCE_RE, text).unwrap_or_default(),
            translation,
            tier: ParseTier::LooseFields,
        };
    }

    tracing::debug!("[PARSE] No structured fields found, using raw text");
    ParsedResponse {
        source: String::new(),
        translation: text.to_string(),
        tier: ParseTier::RawText,
    }
}

/// Drop a leading ```lang line and a trailing ``` line
fn strip_fence(s: &str) -> &str {
    if !s.starts_with("```") {
        return s;
    }
    let body = match s.find('\n') {
        Some(i) => &s[i + 1..],
        None => return s.trim_start_matches('`').trim(),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn parse_object(s: &str) -> Option<(String, String)> {
    let value: Value = serde_json::from_str(s).ok()?;
    let obj = value.as_object()?;
    let field = |key: &str| -> Option<String> {
        match obj.get(key) {
            None | Some(Value::Null) => Some(String::new()),
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => None,
        }
    };
    if !obj.contains_key("source") && !obj.contains_key("translation") && !obj.contains_key("ja") {
        return None;
    }
    let translation = match obj.get("translation") {
        Some(_) => field("translation")?,
        None => field("ja")?,
    };
    Some((field("source")?, translation))
}

fn capture_field(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    Some(unescape(raw))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
