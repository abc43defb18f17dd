use chrono::Utc;

use crate::coach::prompts::{RESUME_ANALYSIS_PROMPT, RESUME_ANALYSIS_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::resume::ResumeAnalysis;

/// Analyzes raw resume text against a target role. The result replaces any
/// previous analysis wholesale — no history is kept.
pub async fn analyze_resume(
    llm: &LlmClient,
    resume_text: &str,
    target_role: &str,
) -> Result<ResumeAnalysis, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text must not be empty".to_string(),
        ));
    }

    let prompt = RESUME_ANALYSIS_PROMPT
        .replace("{target_role}", target_role)
        .replace("{resume_text}", resume_text);

    let analysis: ResumeAnalysis = llm
        .call_json(&prompt, RESUME_ANALYSIS_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

    let mut analysis = analysis.clamped();
    analysis.analyzed_at = Some(Utc::now());
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_resume_text_is_rejected_before_any_llm_call() {
        // No API keys: reaching the LLM would fail differently.
        let llm = LlmClient::new(Vec::new());
        let err = analyze_resume(&llm, "   ", "Backend Engineer")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
