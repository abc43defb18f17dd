use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// The learning-plan document: weeks → topics → (modules → subtopics | items).
///
/// Generated once (LLM or template) and read-mostly; regenerating a plan
/// replaces the whole document. Completion ids from a previous structure may
/// survive in [`RoadmapProgress`] — they are tolerated and count for nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadmapStructure {
    #[serde(default)]
    pub weeks: Vec<Week>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Week {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(default)]
    pub title: String,
    /// Explicit deadline label; when absent the week title decides one.
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(flatten)]
    pub content: TopicContent,
}

/// The two document shapes a topic can arrive in, resolved once at
/// deserialization. Older plans carry a flat `items` list; newer ones nest
/// `modules`. Nothing downstream sniffs shapes — it matches on this enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicContent {
    Modules { modules: Vec<Module> },
    Items { items: Vec<String> },
    /// A topic with neither key contributes zero tasks.
    Empty {},
}

impl Default for TopicContent {
    fn default() -> Self {
        TopicContent::Empty {}
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default)]
    pub deadline: Option<String>,
}

/// Completion state for the current (or a previous) roadmap, plus the
/// per-day activity counters that drive streaks. The only roadmap entity
/// with frequent writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadmapProgress {
    /// Completed task ids (see `progress::tasks` for the id scheme).
    #[serde(default)]
    pub completed: BTreeSet<String>,
    /// `YYYY-MM-DD` (UTC) → number of recorded actions that day.
    #[serde(default)]
    pub activity: BTreeMap<String, u32>,
}
