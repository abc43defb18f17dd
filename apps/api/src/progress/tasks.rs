//! Task normalizer: flattens a roadmap structure into one `Task` per leaf
//! node with a stable identifier, so completion state keyed by id survives
//! re-renders of the same structure.
//!
//! Id scheme: `{week}-{topic}-{module}-{label}` for module-nested topics,
//! `{week}-{topic}-{label}` for legacy flat-item topics, where `label` is
//! the leaf's text with all whitespace stripped and nothing else changed.
//! Two sibling leaves differing only in case or punctuation would collide —
//! a latent weakness inherited from the persisted ids; changing the scheme
//! now would orphan every stored completion (DESIGN.md).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::roadmap::{RoadmapStructure, TopicContent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Parent path, e.g. "Week 1 Focus: Basics · Async Rust · Futures".
    pub subtitle: String,
    pub deadline: String,
    pub completed: bool,
}

/// Strips all whitespace from a leaf label. Deliberately nothing more.
pub fn normalize_label(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Deadline label when neither module nor topic carries an explicit one.
fn default_deadline(week_title: &str) -> &'static str {
    if week_title.contains("Focus") {
        "This Week"
    } else {
        "Next Week"
    }
}

fn parent_path(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" · ")
}

/// Flattens the structure into one task per leaf. Missing arrays contribute
/// zero tasks; nothing here can fail on a sparse document.
pub fn flatten_tasks(structure: &RoadmapStructure, completed: &BTreeSet<String>) -> Vec<Task> {
    let mut tasks = Vec::new();

    for (w, week) in structure.weeks.iter().enumerate() {
        for (t, topic) in week.topics.iter().enumerate() {
            match &topic.content {
                TopicContent::Modules { modules } => {
                    for (m, module) in modules.iter().enumerate() {
                        let deadline = module
                            .deadline
                            .as_deref()
                            .or(topic.deadline.as_deref())
                            .unwrap_or_else(|| default_deadline(&week.title));
                        for subtopic in &module.subtopics {
                            let id = format!("{w}-{t}-{m}-{}", normalize_label(subtopic));
                            tasks.push(Task {
                                completed: completed.contains(&id),
                                id,
                                title: subtopic.clone(),
                                subtitle: parent_path(&[&week.title, &topic.title, &module.title]),
                                deadline: deadline.to_string(),
                            });
                        }
                    }
                }
                TopicContent::Items { items } => {
                    let deadline = topic
                        .deadline
                        .as_deref()
                        .unwrap_or_else(|| default_deadline(&week.title));
                    for item in items {
                        let id = format!("{w}-{t}-{}", normalize_label(item));
                        tasks.push(Task {
                            completed: completed.contains(&id),
                            id,
                            title: item.clone(),
                            subtitle: parent_path(&[&week.title, &topic.title]),
                            deadline: deadline.to_string(),
                        });
                    }
                }
                TopicContent::Empty {} => {}
            }
        }
    }

    tasks
}
