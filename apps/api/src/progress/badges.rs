//! Badge evaluator: a fixed, ordered catalog of conditions checked against
//! the aggregated state. Once earned, a badge is never re-evaluated or
//! revoked; the earned set (badge id → timestamp) is the only state this
//! module owns, persisted under the `badges` collection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inputs every badge predicate sees. Derived from the snapshot by the
/// aggregator; predicates never touch raw documents.
#[derive(Debug, Clone, Default)]
pub struct BadgeInputs {
    pub resume_score: Option<f64>,
    pub interview_count: usize,
    pub best_interview_score: Option<f64>,
    pub completion_fraction: Option<f64>,
    pub streak: u32,
}

impl BadgeInputs {
    /// Drops non-finite values so a malformed input can only fail a
    /// condition, never satisfy or break one.
    fn sanitized(&self) -> BadgeInputs {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        BadgeInputs {
            resume_score: finite(self.resume_score),
            best_interview_score: finite(self.best_interview_score),
            completion_fraction: finite(self.completion_fraction),
            ..*self
        }
    }
}

pub struct BadgeSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    predicate: fn(&BadgeInputs) -> bool,
}

/// The catalog. Order is fixed and user-visible; append only.
pub const CATALOG: &[BadgeSpec] = &[
    BadgeSpec {
        id: "resume-analyzed",
        title: "First Impression",
        description: "Analyzed your first resume",
        predicate: |i| i.resume_score.is_some(),
    },
    BadgeSpec {
        id: "ats-contender",
        title: "ATS Contender",
        description: "Resume scored 80 or higher",
        predicate: |i| i.resume_score.is_some_and(|s| s >= 80.0),
    },
    BadgeSpec {
        id: "first-interview",
        title: "Ice Breaker",
        description: "Completed your first mock interview",
        predicate: |i| i.interview_count >= 1,
    },
    BadgeSpec {
        id: "interview-ace",
        title: "Interview Ace",
        description: "Scored 90+ in a mock interview",
        predicate: |i| i.best_interview_score.is_some_and(|s| s >= 90.0),
    },
    BadgeSpec {
        id: "seasoned-candidate",
        title: "Seasoned Candidate",
        description: "Completed five mock interviews",
        predicate: |i| i.interview_count >= 5,
    },
    BadgeSpec {
        id: "halfway-there",
        title: "Halfway There",
        description: "Completed half of your roadmap",
        predicate: |i| i.completion_fraction.is_some_and(|f| f >= 0.5),
    },
    BadgeSpec {
        id: "roadmap-complete",
        title: "Summit",
        description: "Completed your entire roadmap",
        predicate: |i| i.completion_fraction.is_some_and(|f| f >= 1.0),
    },
    BadgeSpec {
        id: "three-day-streak",
        title: "Momentum",
        description: "Three consecutive days of activity",
        predicate: |i| i.streak >= 3,
    },
    BadgeSpec {
        id: "week-streak",
        title: "Habit Formed",
        description: "Seven consecutive days of activity",
        predicate: |i| i.streak >= 7,
    },
];

pub fn badge_spec(id: &str) -> Option<&'static BadgeSpec> {
    CATALOG.iter().find(|b| b.id == id)
}

/// Persisted earned set: badge id → when it was earned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarnedBadges {
    #[serde(default)]
    pub earned: BTreeMap<String, DateTime<Utc>>,
}

impl EarnedBadges {
    pub fn contains(&self, id: &str) -> bool {
        self.earned.contains_key(id)
    }
}

/// Returns catalog entries that are satisfied now but not yet in the earned
/// set, in catalog order. Pure: the caller records them (and persists).
pub fn evaluate_newly_earned(
    inputs: &BadgeInputs,
    earned: &EarnedBadges,
) -> Vec<&'static BadgeSpec> {
    let inputs = inputs.sanitized();
    CATALOG
        .iter()
        .filter(|spec| !earned.contains(spec.id) && (spec.predicate)(&inputs))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_earns_nothing() {
        let newly = evaluate_newly_earned(&BadgeInputs::default(), &EarnedBadges::default());
        assert!(newly.is_empty());
    }

    #[test]
    fn test_resume_analysis_earns_first_badge() {
        let inputs = BadgeInputs {
            resume_score: Some(42.0),
            ..Default::default()
        };
        let ids: Vec<_> = evaluate_newly_earned(&inputs, &EarnedBadges::default())
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["resume-analyzed"]);
    }

    #[test]
    fn test_already_earned_badge_never_reappears() {
        let inputs = BadgeInputs {
            resume_score: Some(95.0),
            ..Default::default()
        };
        let mut earned = EarnedBadges::default();
        earned
            .earned
            .insert("resume-analyzed".to_string(), Utc::now());

        let ids: Vec<_> = evaluate_newly_earned(&inputs, &earned)
            .iter()
            .map(|b| b.id)
            .collect();
        // Predicate still true for resume-analyzed, but it is not reported.
        assert_eq!(ids, vec!["ats-contender"]);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let inputs = BadgeInputs {
            interview_count: 5,
            best_interview_score: Some(91.0),
            streak: 7,
            ..Default::default()
        };
        let earned = EarnedBadges::default();
        let first: Vec<_> = evaluate_newly_earned(&inputs, &earned)
            .iter()
            .map(|b| b.id)
            .collect();
        let second: Vec<_> = evaluate_newly_earned(&inputs, &earned)
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                "first-interview",
                "interview-ace",
                "seasoned-candidate",
                "three-day-streak",
                "week-streak"
            ]
        );
    }

    #[test]
    fn test_malformed_inputs_count_as_not_satisfied() {
        let inputs = BadgeInputs {
            resume_score: Some(f64::NAN),
            completion_fraction: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(evaluate_newly_earned(&inputs, &EarnedBadges::default()).is_empty());
    }

    #[test]
    fn test_full_roadmap_earns_both_completion_badges() {
        let inputs = BadgeInputs {
            completion_fraction: Some(1.0),
            ..Default::default()
        };
        let ids: Vec<_> = evaluate_newly_earned(&inputs, &EarnedBadges::default())
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["halfway-there", "roadmap-complete"]);
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<_> = CATALOG.iter().map(|b| b.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn test_badge_spec_lookup() {
        assert!(badge_spec("week-streak").is_some());
        assert!(badge_spec("no-such-badge").is_none());
    }
}
