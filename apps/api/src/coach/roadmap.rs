use tracing::warn;

use crate::coach::prompts::{ROADMAP_PROMPT, ROADMAP_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::roadmap::{Module, RoadmapStructure, Topic, TopicContent, Week};

const MIN_WEEKS: u32 = 1;
const MAX_WEEKS: u32 = 12;

/// Generates a roadmap for the target role. An LLM failure (or an empty
/// generation) degrades to the deterministic template instead of
/// propagating — the user always gets a plan.
pub async fn generate_roadmap(
    llm: &LlmClient,
    target_role: &str,
    weeks: u32,
) -> RoadmapStructure {
    let weeks = weeks.clamp(MIN_WEEKS, MAX_WEEKS);
    let prompt = ROADMAP_PROMPT
        .replace("{weeks}", &weeks.to_string())
        .replace("{target_role}", target_role);

    match llm.call_json::<RoadmapStructure>(&prompt, ROADMAP_SYSTEM).await {
        Ok(structure) if !structure.weeks.is_empty() => structure,
        Ok(_) => {
            warn!("LLM returned an empty roadmap for '{target_role}'; using template");
            template_roadmap(target_role, weeks)
        }
        Err(e) => {
            warn!("Roadmap generation for '{target_role}' failed ({e}); using template");
            template_roadmap(target_role, weeks)
        }
    }
}

/// Four-phase template cycled across the requested weeks.
const PHASES: &[(&str, &[&str])] = &[
    (
        "Fundamentals",
        &["Core concepts", "Key terminology", "Ecosystem overview"],
    ),
    (
        "Hands-on practice",
        &["Guided exercises", "Build a small project", "Read production code"],
    ),
    (
        "Depth",
        &["Advanced topics", "Performance and scaling", "Failure modes"],
    ),
    (
        "Interview preparation",
        &["Mock questions", "System design drills", "Telling your story"],
    ),
];

/// Deterministic fallback plan. Week 1 carries the "Focus" marker so its
/// tasks get the "This Week" deadline label.
pub fn template_roadmap(target_role: &str, weeks: u32) -> RoadmapStructure {
    let weeks = weeks.clamp(MIN_WEEKS, MAX_WEEKS);
    let structure_weeks = (1..=weeks)
        .map(|n| {
            let (phase, subtopics) = PHASES[((n - 1) as usize) % PHASES.len()];
            let title = if n == 1 {
                format!("Week 1 Focus: {phase}")
            } else {
                format!("Week {n}: {phase}")
            };
            Week {
                title,
                topics: vec![Topic {
                    title: format!("{phase} for {target_role}"),
                    deadline: None,
                    content: TopicContent::Modules {
                        modules: vec![Module {
                            title: phase.to_string(),
                            subtopics: subtopics.iter().map(|s| s.to_string()).collect(),
                            deadline: None,
                        }],
                    },
                }],
            }
        })
        .collect();

    RoadmapStructure {
        weeks: structure_weeks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::tasks::flatten_tasks;
    use std::collections::BTreeSet;

    #[test]
    fn test_template_has_requested_week_count() {
        assert_eq!(template_roadmap("Backend Engineer", 6).weeks.len(), 6);
    }

    #[test]
    fn test_template_week_one_is_the_focus_week() {
        let structure = template_roadmap("Data Engineer", 4);
        assert!(structure.weeks[0].title.contains("Focus"));
        assert!(!structure.weeks[1].title.contains("Focus"));
    }

    #[test]
    fn test_template_is_deterministic() {
        assert_eq!(
            template_roadmap("SRE", 8),
            template_roadmap("SRE", 8)
        );
    }

    #[test]
    fn test_template_week_count_is_clamped() {
        assert_eq!(template_roadmap("SRE", 0).weeks.len(), 1);
        assert_eq!(template_roadmap("SRE", 99).weeks.len(), MAX_WEEKS as usize);
    }

    #[test]
    fn test_template_flattens_into_tasks() {
        let structure = template_roadmap("Backend Engineer", 2);
        let tasks = flatten_tasks(&structure, &BTreeSet::new());
        // 3 subtopics per week in the template.
        assert_eq!(tasks.len(), 6);
        assert_eq!(tasks[0].deadline, "This Week");
        assert_eq!(tasks[3].deadline, "Next Week");
    }
}
