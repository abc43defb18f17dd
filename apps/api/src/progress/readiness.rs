use serde::{Deserialize, Serialize};

/// Category weights for the readiness score. The three weights sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessWeights {
    pub resume: f64,
    pub interview: f64,
    pub roadmap: f64,
}

impl Default for ReadinessWeights {
    fn default() -> Self {
        Self {
            resume: 0.3,
            interview: 0.4,
            roadmap: 0.3,
        }
    }
}

/// Derived readiness score: `round(resume/100*30 + mean(interviews)/100*40 +
/// min(fraction,1)*30)`, 0–100.
///
/// An absent category contributes zero — weights are NOT re-normalized over
/// the categories that are present, so a user with no interview sessions
/// caps at 60 with the default weights. Kept as-is pending product review;
/// see DESIGN.md.
pub fn compute_readiness(
    resume_score: Option<f64>,
    interview_scores: &[f64],
    completion_fraction: Option<f64>,
    weights: &ReadinessWeights,
) -> u32 {
    let mut points = 0.0;

    if let Some(score) = resume_score {
        points += score.clamp(0.0, 100.0) / 100.0 * weights.resume * 100.0;
    }

    if !interview_scores.is_empty() {
        let mean = interview_scores.iter().sum::<f64>() / interview_scores.len() as f64;
        points += mean.clamp(0.0, 100.0) / 100.0 * weights.interview * 100.0;
    }

    if let Some(fraction) = completion_fraction {
        points += fraction.clamp(0.0, 1.0) * weights.roadmap * 100.0;
    }

    points.round().clamp(0.0, 100.0) as u32
}

/// Roadmap completion as a fraction of the current structure's leaf count,
/// capped at 1.0. `None` when the structure has no leaves — an empty roadmap
/// is "absent", not "complete".
pub fn completion_fraction(completed_count: usize, total_count: usize) -> Option<f64> {
    if total_count == 0 {
        return None;
    }
    Some((completed_count as f64 / total_count as f64).min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_absent_yields_zero() {
        let w = ReadinessWeights::default();
        assert_eq!(compute_readiness(None, &[], None, &w), 0);
    }

    #[test]
    fn test_all_perfect_yields_100() {
        let w = ReadinessWeights::default();
        assert_eq!(compute_readiness(Some(100.0), &[100.0], Some(1.0), &w), 100);
    }

    #[test]
    fn test_idempotent_for_same_inputs() {
        let w = ReadinessWeights::default();
        let scores = [72.0, 88.0, 64.0];
        let first = compute_readiness(Some(81.0), &scores, Some(0.4), &w);
        let second = compute_readiness(Some(81.0), &scores, Some(0.4), &w);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_interviews_caps_at_60() {
        let w = ReadinessWeights::default();
        assert_eq!(compute_readiness(Some(100.0), &[], Some(1.0), &w), 60);
    }

    #[test]
    fn test_mean_of_interview_scores() {
        let w = ReadinessWeights::default();
        // mean(50, 100) = 75 → 75/100 * 40 = 30
        assert_eq!(compute_readiness(None, &[50.0, 100.0], None, &w), 30);
    }

    #[test]
    fn test_fraction_capped_before_weighting() {
        let w = ReadinessWeights::default();
        // A fraction above 1 (stale ids can never cause this, but inputs
        // are clamped regardless) still contributes at most 30 points.
        assert_eq!(compute_readiness(None, &[], Some(2.5), &w), 30);
    }

    #[test]
    fn test_out_of_range_scores_clamped() {
        let w = ReadinessWeights::default();
        assert_eq!(compute_readiness(Some(250.0), &[], None, &w), 30);
        assert_eq!(compute_readiness(Some(-10.0), &[], None, &w), 0);
    }

    #[test]
    fn test_completion_fraction_basics() {
        assert_eq!(completion_fraction(0, 0), None);
        assert_eq!(completion_fraction(1, 3), Some(1.0 / 3.0));
        assert_eq!(completion_fraction(5, 3), Some(1.0));
    }
}
