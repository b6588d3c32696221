//! Turning raw model output into a [`Classification`].
//!
//! Models do not always honour "JSON only": they wrap the object in a
//! fenced block, add prose around it, or answer with something else
//! entirely. Parsing therefore tries progressively looser readings and
//! always produces a value.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::categories::{normalize_category, CategoryKey};

/// Longest summary kept when the output cannot be parsed at all.
const RAW_SUMMARY_LIMIT: usize = 300;

#[allow(clippy::expect_used)] // Static regex pattern that is guaranteed to be valid
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// The sanitized result of classifying one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub doc_type: CategoryKey,
    pub summary: String,
    /// Integer in `0..=100`.
    pub confidence: u8,
}

impl Classification {
    /// Result recorded when the model could not be reached.
    pub fn llm_error() -> Self {
        Self {
            doc_type: CategoryKey::Others,
            summary: "LLM error".to_string(),
            confidence: 0,
        }
    }

    fn unparsed(raw: &str) -> Self {
        Self {
            doc_type: CategoryKey::Others,
            summary: raw.chars().take(RAW_SUMMARY_LIMIT).collect(),
            confidence: 0,
        }
    }
}

/// Parse model output into a classification.
///
/// Tried in order: the first fenced block holding a JSON object, the whole
/// text, the outermost `{...}` span. If none yields a JSON object the result
/// is `OTHERS` with the first 300 characters of the output as summary.
///
/// # Examples
/// ```
/// use doclens_pipeline::categories::CategoryKey;
/// use doclens_pipeline::classification::parse_classification;
///
/// let c = parse_classification(r#"{"type": "LEGAL_COMPLIANCE", "summary": "NDA", "confidence": "91"}"#);
/// assert_eq!(c.doc_type, CategoryKey::LegalCompliance);
/// assert_eq!(c.confidence, 91);
/// ```
pub fn parse_classification(raw: &str) -> Classification {
    let mut raw = raw.trim();
    if raw.starts_with("```") {
        if let Some(block) = fenced_object(raw) {
            raw = block;
        }
    }

    let object = parse_object(raw).or_else(|| {
        JSON_OBJECT
            .find(raw)
            .and_then(|m| parse_object(m.as_str()))
    });

    match object {
        Some(map) => sanitize(&map),
        None => {
            tracing::warn!(raw, "cannot parse LLM output as JSON");
            Classification::unparsed(raw)
        }
    }
}

/// First fenced segment that looks like a JSON object, ignoring a `json` tag.
fn fenced_object(raw: &str) -> Option<&str> {
    raw.split("```")
        .map(|part| {
            let part = part.trim();
            part.strip_prefix("json").unwrap_or(part).trim()
        })
        .find(|part| part.starts_with('{') && part.ends_with('}'))
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn sanitize(map: &Map<String, Value>) -> Classification {
    let doc_type = match map.get("type") {
        Some(Value::String(label)) => normalize_category(label),
        Some(Value::Null) | None => CategoryKey::Others,
        Some(other) => normalize_category(&other.to_string()),
    };

    let summary = match map.get("summary") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let confidence = coerce_confidence(map.get("confidence"));

    Classification {
        doc_type,
        summary,
        confidence: u8::try_from(confidence.clamp(0, 100)).unwrap_or(0),
    }
}

/// Integers pass through, floats truncate, numeric strings parse, booleans
/// count as 0 or 1. Anything else is 0.
fn coerce_confidence(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}
