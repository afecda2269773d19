use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod dates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Work,
    #[default]
    Personal,
    Wellness,
    Errands,
    Birthday,
    Anniversary,
    Meeting,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Work,
        Category::Personal,
        Category::Wellness,
        Category::Errands,
        Category::Birthday,
        Category::Anniversary,
        Category::Meeting,
    ];

    /// Case-insensitive lookup, used when reading free-form provider output.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Wellness => "Wellness",
            Category::Errands => "Errands",
            Category::Birthday => "Birthday",
            Category::Anniversary => "Anniversary",
            Category::Meeting => "Meeting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Once,
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default, deserialize_with = "dates::deserialize_optional")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub frequency: Option<Frequency>,
    /// `Some(None)` clears the date; an absent key leaves it unchanged.
    #[serde(
        default,
        deserialize_with = "dates::deserialize_patch",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<TaskStatus>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

/// Tells an explicit `null` apart from a missing key.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A rejected field on an incoming record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl FieldError {
    fn blank(field: &'static str) -> Self {
        Self {
            field,
            reason: "must not be blank",
        }
    }
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.title.trim().is_empty() {
            return Err(FieldError::blank("title"));
        }
        Ok(())
    }
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Result<(), FieldError> {
        match &self.title {
            Some(title) if title.trim().is_empty() => Err(FieldError::blank("title")),
            _ => Ok(()),
        }
    }
}

impl Task {
    pub fn new(req: CreateTaskRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: req.title.trim().to_string(),
            category: req.category.unwrap_or_default(),
            priority: req.priority.unwrap_or_default(),
            frequency: req.frequency.unwrap_or_default(),
            due_date: req.due_date,
            status: req.status.unwrap_or_default(),
            notes: req.notes,
            created_at: Utc::now(),
        }
    }

    /// Applies only the fields present in `update`.
    pub fn apply(&mut self, update: UpdateTaskRequest) {
        if let Some(title) = update.title {
            self.title = title.trim().to_string();
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(frequency) = update.frequency {
            self.frequency = frequency;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(notes) = update.notes {
            self.notes = notes.filter(|n| !n.trim().is_empty());
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: Uuid,
    pub mood: String,
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMoodRequest {
    pub mood: String,
    pub emoji: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "dates::deserialize_optional")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl CreateMoodRequest {
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.mood.trim().is_empty() {
            return Err(FieldError::blank("mood"));
        }
        if self.emoji.trim().is_empty() {
            return Err(FieldError::blank("emoji"));
        }
        Ok(())
    }
}

impl MoodEntry {
    pub fn new(req: CreateMoodRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            mood: req.mood.trim().to_string(),
            emoji: req.emoji,
            notes: req.notes,
            timestamp: req.timestamp.unwrap_or_else(Utc::now),
        }
    }
}

/// A proposed task. Never stored until the caller submits it as a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub mood: String,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Answer to an image upload. An engine without vision support answers
/// `Refused` instead of guessing; the body is then `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoodDetection {
    Detected(ImageAnalysis),
    Refused { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub completion_rate: u32,
}

impl AnalyticsSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.is_completed()).count();
        let active = total - completed;
        let completion_rate = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        Self {
            total,
            completed,
            active,
            completion_rate,
        }
    }
}
