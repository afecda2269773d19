//! AI suggestion engines.
//!
//! # Architecture
//! ```text
//! handler → AiDispatcher ──► active engine (chosen once from AI_MODE)
//!                 │                 │ error
//!                 └──────────► OfflineEngine (fallback)
//! ```
//!
//! Every engine implements [`AiEngine`]. Hosted engines build a prompt,
//! call the provider and read JSON out of free text with [`extract`].
//! The dispatcher never surfaces an error to its caller: it yields the
//! engine result, the offline result, or `None`.

mod dispatcher;
pub mod extract;
mod gemini;
mod offline;
mod openai;
mod prompts;

pub use dispatcher::AiDispatcher;
pub use gemini::GeminiEngine;
pub use offline::OfflineEngine;
pub use openai::OpenAiEngine;

use async_trait::async_trait;
use orbit_shared::{MoodDetection, Suggestion, Task, TaskSummary};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{AiConfig, AiMode};

/// Mood vocabulary shared by the image analysis of every engine.
pub const MOODS: [&str; 7] = [
    "happy",
    "calm",
    "energetic",
    "stressed",
    "sad",
    "focused",
    "surprised",
];

#[derive(Debug, Error)]
pub enum AiError {
    #[error("engine missing method: {0}")]
    MissingCapability(&'static str),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("unexpected provider response shape: {0}")]
    UnexpectedShape(&'static str),
    #[error("could not parse provider output: {0}")]
    Parse(String),
}

pub type AiResult<T> = Result<T, AiError>;

/// Raw image bytes as uploaded by the client.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// The six operations every engine may provide.
///
/// Each method defaults to [`AiError::MissingCapability`], so a partial
/// engine is still a valid engine; the dispatcher treats the gap like any
/// other failure.
#[async_trait]
pub trait AiEngine: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get_suggestions(&self) -> AiResult<Vec<Suggestion>> {
        Err(AiError::MissingCapability("get_suggestions"))
    }

    async fn analyze_image(&self, _image: &ImageInput) -> AiResult<MoodDetection> {
        Err(AiError::MissingCapability("analyze_image"))
    }

    /// `extra` is caller-supplied context; `Value::Null` when absent.
    async fn get_mood_advice(&self, _mood: &str, _extra: &Value) -> AiResult<Vec<String>> {
        Err(AiError::MissingCapability("get_mood_advice"))
    }

    async fn classify_task(&self, _text: &str) -> AiResult<Suggestion> {
        Err(AiError::MissingCapability("classify_task"))
    }

    async fn get_summary(&self, _tasks: &[Task]) -> AiResult<TaskSummary> {
        Err(AiError::MissingCapability("get_summary"))
    }

    async fn get_tips(&self) -> AiResult<Vec<String>> {
        Err(AiError::MissingCapability("get_tips"))
    }
}

/// Builds the engine selected by `config.mode`.
pub fn create_engine(config: &AiConfig) -> AiResult<Arc<dyn AiEngine>> {
    let engine: Arc<dyn AiEngine> = match config.mode {
        AiMode::Offline => Arc::new(OfflineEngine::new()),
        AiMode::OpenAi => Arc::new(OpenAiEngine::new(
            config.openai.clone(),
            config.request_timeout,
        )?),
        AiMode::Gemini => Arc::new(GeminiEngine::new(
            config.gemini.clone(),
            config.request_timeout,
        )?),
    };
    Ok(engine)
}

pub(crate) fn http_client(timeout: Option<Duration>) -> AiResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Reads a provider error body without letting it flood the logs.
pub(crate) async fn provider_error(response: reqwest::Response) -> AiError {
    let status = response.status().as_u16();
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > 300 {
        let mut cut = 300;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    AiError::Provider { status, body }
}

/// Serves `app` on an ephemeral local port and returns its base URL.
#[cfg(test)]
pub(crate) async fn spawn_stub_provider(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}
