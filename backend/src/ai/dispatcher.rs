use orbit_shared::{MoodDetection, Suggestion, Task, TaskSummary};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, warn};

use super::{create_engine, AiEngine, AiResult, ImageInput, OfflineEngine};
use crate::config::{AiConfig, AiMode};

/// Routes the six AI operations to the engine chosen at start-up.
///
/// On failure the error is logged and, unless the active engine already
/// is the offline one, the same call is repeated once against the
/// fallback engine. Callers get `None` only when both attempts failed;
/// no error ever escapes.
pub struct AiDispatcher {
    mode: AiMode,
    engine: Arc<dyn AiEngine>,
    fallback: Arc<dyn AiEngine>,
}

impl AiDispatcher {
    pub fn new(mode: AiMode, engine: Arc<dyn AiEngine>, fallback: Arc<dyn AiEngine>) -> Self {
        Self {
            mode,
            engine,
            fallback,
        }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        let fallback: Arc<dyn AiEngine> = Arc::new(OfflineEngine::new());
        match create_engine(config) {
            Ok(engine) => Self::new(config.mode, engine, fallback),
            Err(e) => {
                warn!(engine = %config.mode, error = %e, "could not build AI engine, using offline engine");
                Self::new(AiMode::Offline, fallback.clone(), fallback)
            }
        }
    }

    pub fn mode(&self) -> AiMode {
        self.mode
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    async fn recover<T, F, Fut>(&self, operation: &'static str, first: AiResult<T>, retry: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AiResult<T>>,
    {
        let err = match first {
            Ok(value) => return Some(value),
            Err(err) => err,
        };
        error!(engine = %self.mode, operation, error = %err, "AI engine call failed");

        if self.mode == AiMode::Offline {
            return None;
        }

        match retry().await {
            Ok(value) => Some(value),
            Err(err) => {
                error!(
                    engine = self.fallback.name(),
                    operation,
                    error = %err,
                    "fallback engine failed"
                );
                None
            }
        }
    }

    pub async fn get_suggestions(&self) -> Option<Vec<Suggestion>> {
        let first = self.engine.get_suggestions().await;
        self.recover("get_suggestions", first, || self.fallback.get_suggestions())
            .await
    }

    /// A `Refused` answer is a result, not a failure, and is passed through.
    pub async fn analyze_image(&self, image: &ImageInput) -> Option<MoodDetection> {
        let first = self.engine.analyze_image(image).await;
        self.recover("analyze_image", first, || self.fallback.analyze_image(image))
            .await
    }

    pub async fn get_mood_advice(&self, mood: &str, extra: &Value) -> Option<Vec<String>> {
        let first = self.engine.get_mood_advice(mood, extra).await;
        self.recover("get_mood_advice", first, || {
            self.fallback.get_mood_advice(mood, extra)
        })
        .await
    }

    pub async fn classify_task(&self, text: &str) -> Option<Suggestion> {
        let first = self.engine.classify_task(text).await;
        self.recover("classify_task", first, || self.fallback.classify_task(text))
            .await
    }

    pub async fn get_summary(&self, tasks: &[Task]) -> Option<TaskSummary> {
        let first = self.engine.get_summary(tasks).await;
        self.recover("get_summary", first, || self.fallback.get_summary(tasks))
            .await
    }

    pub async fn get_tips(&self) -> Option<Vec<String>> {
        let first = self.engine.get_tips().await;
        self.recover("get_tips", first, || self.fallback.get_tips()).await
    }
}
