use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of analyzing one resume against a target role.
/// A user has at most one of these; each analysis replaces the previous
/// wholesale — no history is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    /// Overall score, 0–100.
    #[serde(default)]
    pub overall_score: u32,
    /// Skills the resume demonstrates for the target role.
    #[serde(default)]
    pub present_skills: Vec<String>,
    /// Skills mentioned but without supporting evidence.
    #[serde(default)]
    pub partial_skills: Vec<String>,
    /// Skills the target role expects that the resume lacks.
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub ats: AtsBreakdown,
    #[serde(default)]
    pub analyzed_at: Option<DateTime<Utc>>,
}

/// ATS-style sub-scores, each 0–100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtsBreakdown {
    #[serde(default)]
    pub formatting: u32,
    #[serde(default)]
    pub keywords: u32,
    #[serde(default)]
    pub impact: u32,
    #[serde(default)]
    pub readability: u32,
}

impl ResumeAnalysis {
    /// Clamps every sub-score into 0–100. LLM output is not trusted to
    /// stay in range.
    pub fn clamped(mut self) -> Self {
        self.overall_score = self.overall_score.min(100);
        self.ats.formatting = self.ats.formatting.min(100);
        self.ats.keywords = self.ats.keywords.min(100);
        self.ats.impact = self.ats.impact.min(100);
        self.ats.readability = self.ats.readability.min(100);
        self
    }
}
