//! Gemini `generateContent` engine. Supports image-based mood detection
//! by sending the upload inline as base64.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use orbit_shared::{MoodDetection, Suggestion, Task, TaskSummary};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::extract::{
    parse_classification, parse_image_analysis, parse_string_list, parse_suggestions,
    strip_code_fences,
};
use super::{http_client, prompts, provider_error, AiEngine, AiError, AiResult, ImageInput};
use crate::config::ProviderConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

/// Concatenates the text parts of the first candidate.
fn candidate_text(body: &Value) -> AiResult<String> {
    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or(AiError::UnexpectedShape(
            "generateContent has no candidates[0].content.parts",
        ))?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        return Err(AiError::UnexpectedShape("generateContent returned no text"));
    }
    Ok(text)
}

pub struct GeminiEngine {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl GeminiEngine {
    pub fn new(config: ProviderConfig, timeout: Option<Duration>) -> AiResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            config,
        })
    }

    async fn generate(&self, parts: Vec<Part<'_>>) -> AiResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let body: Value = response.json().await?;
        let text = strip_code_fences(&candidate_text(&body)?);
        debug!(model = %self.config.model, chars = text.len(), "gemini response received");
        Ok(text)
    }

    async fn prompt(&self, prompt: &str) -> AiResult<String> {
        self.generate(vec![Part::Text { text: prompt }]).await
    }
}

#[async_trait]
impl AiEngine for GeminiEngine {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn get_suggestions(&self) -> AiResult<Vec<Suggestion>> {
        let text = self.prompt(&prompts::suggestions()).await?;
        parse_suggestions(&text)
    }

    async fn analyze_image(&self, image: &ImageInput) -> AiResult<MoodDetection> {
        let prompt = prompts::image_mood();
        let parts = vec![
            Part::Text { text: &prompt },
            Part::Inline {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: BASE64.encode(&image.bytes),
                },
            },
        ];
        let text = self.generate(parts).await?;
        parse_image_analysis(&text).map(MoodDetection::Detected)
    }

    async fn get_mood_advice(&self, mood: &str, extra: &Value) -> AiResult<Vec<String>> {
        let text = self.prompt(&prompts::mood_advice(mood, extra)).await?;
        parse_string_list(&text)
    }

    async fn classify_task(&self, text: &str) -> AiResult<Suggestion> {
        let out = self.prompt(&prompts::classify(text)).await?;
        parse_classification(&out, text)
    }

    async fn get_summary(&self, tasks: &[Task]) -> AiResult<TaskSummary> {
        let out = self.prompt(&prompts::summary(tasks)).await?;
        Ok(TaskSummary {
            summary: out.trim().to_string(),
        })
    }

    async fn get_tips(&self) -> AiResult<Vec<String>> {
        let text = self.prompt(&prompts::tips()).await?;
        parse_string_list(&text)
    }
}
