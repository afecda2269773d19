//! OpenAI chat-completions engine. Text only; image analysis is refused
//! without contacting the provider.

use async_trait::async_trait;
use orbit_shared::{MoodDetection, Suggestion, Task, TaskSummary};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::extract::{parse_classification, parse_string_list, parse_suggestions};
use super::{http_client, prompts, provider_error, AiEngine, AiError, AiResult, ImageInput};
use crate::config::ProviderConfig;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 400;
const NO_VISION: &str =
    "OpenAI image/vision is not supported by this engine. Use offline or Gemini for vision.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Pulls `choices[0].message.content` out of a completion response.
fn completion_text(body: &Value) -> AiResult<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(AiError::UnexpectedShape(
            "chat completion has no choices[0].message.content",
        ))
}

pub struct OpenAiEngine {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiEngine {
    pub fn new(config: ProviderConfig, timeout: Option<Duration>) -> AiResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            config,
        })
    }

    async fn chat(&self, prompt: &str) -> AiResult<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let body: Value = response.json().await?;
        let text = completion_text(&body)?;
        debug!(model = %self.config.model, chars = text.len(), "openai completion received");
        Ok(text)
    }
}

#[async_trait]
impl AiEngine for OpenAiEngine {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn get_suggestions(&self) -> AiResult<Vec<Suggestion>> {
        let text = self.chat(&prompts::suggestions()).await?;
        parse_suggestions(&text)
    }

    async fn analyze_image(&self, _image: &ImageInput) -> AiResult<MoodDetection> {
        Ok(MoodDetection::Refused {
            error: NO_VISION.to_string(),
        })
    }

    async fn get_mood_advice(&self, mood: &str, extra: &Value) -> AiResult<Vec<String>> {
        let text = self.chat(&prompts::mood_advice(mood, extra)).await?;
        parse_string_list(&text)
    }

    async fn classify_task(&self, text: &str) -> AiResult<Suggestion> {
        let out = self.chat(&prompts::classify(text)).await?;
        parse_classification(&out, text)
    }

    async fn get_summary(&self, tasks: &[Task]) -> AiResult<TaskSummary> {
        let out = self.chat(&prompts::summary(tasks)).await?;
        let summary = out.trim();
        if summary.is_empty() {
            return Err(AiError::Parse("empty summary".to_string()));
        }
        Ok(TaskSummary {
            summary: summary.to_string(),
        })
    }

    async fn get_tips(&self) -> AiResult<Vec<String>> {
        let text = self.chat(&prompts::tips()).await?;
        parse_string_list(&text)
    }
}
