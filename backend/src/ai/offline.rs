use async_trait::async_trait;
use orbit_shared::{
    Category, ImageAnalysis, MoodDetection, Priority, Suggestion, Task, TaskSummary,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use super::{AiEngine, AiResult, ImageInput, MOODS};

pub(crate) const SUGGESTION_COUNT: usize = 4;
pub(crate) const TIP_COUNT: usize = 4;

pub(crate) const SUGGESTION_POOL: [(&str, Category, Priority); 11] = [
    ("Clear email inbox", Category::Work, Priority::Medium),
    ("Drink a glass of water", Category::Wellness, Priority::High),
    ("Review weekly goals", Category::Personal, Priority::Medium),
    ("Organize desk space", Category::Work, Priority::Low),
    ("Take a 10-minute walk", Category::Wellness, Priority::Medium),
    ("Call a family member", Category::Personal, Priority::Low),
    ("Buy groceries", Category::Errands, Priority::High),
    ("Plan tomorrow's schedule", Category::Work, Priority::High),
    ("Backup computer files", Category::Work, Priority::Low),
    ("Do a quick stretch", Category::Wellness, Priority::Medium),
    ("Update budget tracker", Category::Personal, Priority::High),
];

pub(crate) const TIP_POOL: [&str; 8] = [
    "Use Pomodoro (25/5).",
    "Focus on one task at a time.",
    "Plan tomorrow before sleep.",
    "Take regular short breaks.",
    "Batch similar work together.",
    "Write down your top 3 priorities each morning.",
    "Keep your phone out of reach while focusing.",
    "Drink water between tasks.",
];

const CLASSIFY_CATEGORIES: [Category; 4] = [
    Category::Work,
    Category::Personal,
    Category::Wellness,
    Category::Errands,
];

const DEFAULT_MOOD: &str = "calm";

/// Fixed advice per normalized mood name; anything unrecognized gets the
/// calm advice.
pub(crate) fn advice_for(mood: &str) -> &'static [&'static str; 3] {
    match mood.trim().to_lowercase().as_str() {
        "happy" => &[
            "Share energy with a friend!",
            "Tackle a difficult task while you feel good.",
            "Write one gratitude.",
        ],
        "energetic" => &[
            "Do a short exercise sprint.",
            "Start a high-priority task.",
            "Use the energy for a focused sprint.",
        ],
        "stressed" => &[
            "Breathe 4-7-8 for 3 rounds.",
            "Take a brief walk.",
            "Break tasks into 3 small steps.",
        ],
        "sad" => &[
            "Call a friend.",
            "Write one positive note.",
            "Listen to a comforting song.",
        ],
        "focused" => &[
            "Keep going for 25 minutes (Pomodoro).",
            "Avoid switching tasks.",
            "Batch similar work.",
        ],
        "surprised" => &[
            "Pause and breathe.",
            "Note your immediate thoughts.",
            "Take 3 deep breaths before acting.",
        ],
        _ => &[
            "Try a 10-minute meditation.",
            "Organize your workspace.",
            "Read a short article.",
        ],
    }
}

/// Offline engine: random picks from fixed pools. Never fails, which makes
/// it the fallback target for the hosted engines.
pub struct OfflineEngine {
    rng: Mutex<StdRng>,
}

impl OfflineEngine {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of picks for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for OfflineEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiEngine for OfflineEngine {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn get_suggestions(&self) -> AiResult<Vec<Suggestion>> {
        let mut rng = self.rng.lock();
        let mut picks: Vec<Suggestion> = SUGGESTION_POOL
            .choose_multiple(&mut *rng, SUGGESTION_COUNT)
            .map(|(title, category, priority)| Suggestion {
                title: title.to_string(),
                category: *category,
                priority: *priority,
            })
            .collect();
        picks.shuffle(&mut *rng);
        Ok(picks)
    }

    async fn analyze_image(&self, _image: &ImageInput) -> AiResult<MoodDetection> {
        let mut rng = self.rng.lock();
        let mood = MOODS.choose(&mut *rng).copied().unwrap_or(DEFAULT_MOOD);
        let confidence: f32 = rng.gen_range(0.75..=0.95);
        Ok(MoodDetection::Detected(ImageAnalysis {
            mood: mood.to_string(),
            confidence: (confidence * 100.0).round() / 100.0,
            details: Some("Mock analysis: offline mode".to_string()),
        }))
    }

    async fn get_mood_advice(&self, mood: &str, _extra: &Value) -> AiResult<Vec<String>> {
        Ok(advice_for(mood).iter().map(|s| s.to_string()).collect())
    }

    async fn classify_task(&self, text: &str) -> AiResult<Suggestion> {
        let mut rng = self.rng.lock();
        let category = CLASSIFY_CATEGORIES
            .choose(&mut *rng)
            .copied()
            .unwrap_or_default();
        let priority = Priority::ALL.choose(&mut *rng).copied().unwrap_or_default();
        Ok(Suggestion {
            title: text.trim().to_string(),
            category,
            priority,
        })
    }

    async fn get_summary(&self, tasks: &[Task]) -> AiResult<TaskSummary> {
        let focus = tasks.first().map(|t| t.title.as_str()).unwrap_or("a top task");
        Ok(TaskSummary {
            summary: format!("You have {} tasks. Focus on \"{}\".", tasks.len(), focus),
        })
    }

    async fn get_tips(&self) -> AiResult<Vec<String>> {
        let mut rng = self.rng.lock();
        let mut picks: Vec<String> = TIP_POOL
            .choose_multiple(&mut *rng, TIP_COUNT)
            .map(|tip| tip.to_string())
            .collect();
        picks.shuffle(&mut *rng);
        Ok(picks)
    }
}
