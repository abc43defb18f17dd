use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One completed mock-interview session. Append-only: records are never
/// mutated after creation, and the collection is ordered by `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub id: Uuid,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub questions: Vec<AnsweredQuestion>,
    /// Session score, 0–100 (mean of per-answer scores).
    #[serde(default)]
    pub overall_score: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: String,
    #[serde(default)]
    pub answer: String,
    /// Per-answer score, 0–100.
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub feedback: String,
}
