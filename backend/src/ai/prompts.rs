//! Prompt text shared by the hosted engines.

use orbit_shared::Task;
use serde_json::{json, Value};

use super::MOODS;

pub(crate) fn suggestions() -> String {
    "Generate 4 actionable task suggestions as a JSON array of objects with keys: \
     title, category (one of Work, Personal, Wellness, Errands), priority (low, medium or high). \
     Output JSON only."
        .to_string()
}

pub(crate) fn mood_advice(mood: &str, extra: &Value) -> String {
    let mut prompt = format!(
        "You are a friendly coach. Give 3 concise tips for someone feeling \"{}\".",
        mood.trim()
    );
    if has_context(extra) {
        prompt.push_str(&format!(" Context about their day: {extra}."));
    }
    prompt.push_str(" Output a JSON array of strings only.");
    prompt
}

pub(crate) fn classify(text: &str) -> String {
    format!(
        "Classify this task: \"{}\". Output EXACT JSON: \
         {{\"title\":\"...\", \"category\":\"Work|Personal|Wellness|Errands|Birthday|Anniversary|Meeting\", \
         \"priority\":\"low|medium|high\"}}",
        text.trim()
    )
}

pub(crate) fn summary(tasks: &[Task]) -> String {
    let compact: Vec<Value> = tasks
        .iter()
        .map(|t| {
            json!({
                "title": t.title,
                "category": t.category,
                "priority": t.priority,
                "status": t.status,
                "dueDate": t.due_date,
            })
        })
        .collect();
    format!(
        "Summarize this list in one short sentence: {}",
        Value::Array(compact)
    )
}

pub(crate) fn tips() -> String {
    "Give 4 short productivity tips as a JSON array of strings.".to_string()
}

pub(crate) fn image_mood() -> String {
    format!(
        "Look at the person's facial expression and classify their mood as exactly one of: {}. \
         Output JSON only: {{\"mood\":\"...\", \"confidence\":0.0-1.0, \"details\":\"one short sentence\"}}",
        MOODS.join(", ")
    )
}

fn has_context(extra: &Value) -> bool {
    match extra {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}
