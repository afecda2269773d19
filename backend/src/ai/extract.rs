//! JSON recovery from free-form model output.
//!
//! Models wrap JSON in prose and markdown fences. Nothing is trusted
//! verbatim: fences are stripped, the whole text is tried, then every
//! balanced `{...}` / `[...]` span in order of appearance. The first
//! candidate that parses (as the requested type) wins.

use orbit_shared::{Category, ImageAnalysis, Priority, Suggestion};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{AiError, AiResult, MOODS};

/// Removes markdown code fences, including a language tag after the
/// opening fence (```` ```json ````).
pub fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        rest = &rest[tag_len..];
    }
    out.push_str(rest);
    out
}

/// Byte offset just past the bracket that closes the one at `start`.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut expected = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => expected.push('}'),
            '[' => expected.push(']'),
            '}' | ']' => {
                if expected.pop() != Some(c) {
                    return None;
                }
                if expected.is_empty() {
                    return Some(start + i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Bounds the bracket scan on long unbalanced output.
const MAX_SCAN_BYTES: usize = 64 * 1024;
const MAX_SPAN_STARTS: usize = 64;

/// The whole text, then balanced spans by start position. Lazy, so
/// callers stop scanning at the first span that parses.
fn candidates(text: &str) -> impl Iterator<Item = &str> + '_ {
    let trimmed = text.trim();
    let mut limit = trimmed.len().min(MAX_SCAN_BYTES);
    while !trimmed.is_char_boundary(limit) {
        limit -= 1;
    }
    let scanned = &trimmed[..limit];

    let spans = scanned
        .char_indices()
        .filter(|&(_, c)| c == '{' || c == '[')
        .take(MAX_SPAN_STARTS)
        .filter_map(move |(start, _)| {
            balanced_end(scanned, start).map(|end| &scanned[start..end])
        });
    std::iter::once(trimmed).chain(spans)
}

fn no_json(raw: &str) -> AiError {
    let preview: String = raw.chars().take(80).collect();
    AiError::Parse(format!("no JSON object or array in output: {preview:?}"))
}

/// Returns the first object or array embedded in `raw`.
pub fn extract_json(raw: &str) -> AiResult<Value> {
    let cleaned = strip_code_fences(raw);
    let found = candidates(&cleaned)
        .filter_map(|c| serde_json::from_str::<Value>(c).ok())
        .find(|v| v.is_object() || v.is_array());
    found.ok_or_else(|| no_json(raw))
}

/// Like [`extract_json`], but keeps scanning until a candidate
/// deserializes into `T`.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> AiResult<T> {
    let cleaned = strip_code_fences(raw);
    let found = candidates(&cleaned)
        .filter(|c| c.starts_with('{') || c.starts_with('['))
        .find_map(|c| serde_json::from_str::<T>(c).ok());
    found.ok_or_else(|| no_json(raw))
}

/// Suggestion as models actually write it: labels in any case, unknown
/// categories, missing keys.
#[derive(Debug, Deserialize)]
struct LooseSuggestion {
    #[serde(default)]
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    priority: String,
}

impl LooseSuggestion {
    fn into_suggestion(self) -> Suggestion {
        Suggestion {
            title: self.title.trim().to_string(),
            category: Category::parse(&self.category).unwrap_or_default(),
            priority: Priority::parse(&self.priority).unwrap_or_default(),
        }
    }
}

pub(crate) fn parse_suggestions(raw: &str) -> AiResult<Vec<Suggestion>> {
    let items: Vec<LooseSuggestion> = parse_json(raw)?;
    let suggestions: Vec<Suggestion> = items
        .into_iter()
        .map(LooseSuggestion::into_suggestion)
        .filter(|s| !s.title.is_empty())
        .collect();
    if suggestions.is_empty() {
        return Err(AiError::Parse("no usable suggestions".to_string()));
    }
    Ok(suggestions)
}

/// The input text stands in for a missing title.
pub(crate) fn parse_classification(raw: &str, text: &str) -> AiResult<Suggestion> {
    let loose: LooseSuggestion = parse_json(raw)?;
    let mut suggestion = loose.into_suggestion();
    if suggestion.title.is_empty() {
        suggestion.title = text.trim().to_string();
    }
    Ok(suggestion)
}

pub(crate) fn parse_string_list(raw: &str) -> AiResult<Vec<String>> {
    let items: Vec<String> = parse_json(raw)?;
    let items: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return Err(AiError::Parse("empty list".to_string()));
    }
    Ok(items)
}

#[derive(Debug, Deserialize)]
struct LooseImageAnalysis {
    #[serde(default)]
    mood: Option<String>,
    #[serde(default)]
    expression: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    details: Option<String>,
}

const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Requires a `mood` (or `expression`) naming one of [`MOODS`].
pub(crate) fn parse_image_analysis(raw: &str) -> AiResult<ImageAnalysis> {
    let loose: LooseImageAnalysis = parse_json(raw)?;
    let mood = loose
        .mood
        .or(loose.expression)
        .map(|m| m.trim().to_lowercase())
        .filter(|m| MOODS.contains(&m.as_str()))
        .ok_or_else(|| AiError::Parse("image analysis has no recognized mood".to_string()))?;

    Ok(ImageAnalysis {
        mood,
        confidence: loose
            .confidence
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_CONFIDENCE),
        details: loose.details.filter(|d| !d.trim().is_empty()),
    })
}
