use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::coach::prompts::{INTERVIEW_EVAL_PROMPT, INTERVIEW_EVAL_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::interview::{AnsweredQuestion, InterviewRecord};

/// A completed mock-interview session as submitted by the client,
/// before evaluation.
#[derive(Debug, Deserialize)]
pub struct InterviewSubmission {
    pub role: String,
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Deserialize)]
pub struct SubmittedAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
struct AnswerEvaluation {
    #[serde(default)]
    score: u32,
    #[serde(default)]
    feedback: String,
}

/// Evaluates every answer of a session and assembles the append-only
/// [`InterviewRecord`]. Evaluation is foreground work: an LLM failure is
/// surfaced to the caller rather than producing a half-scored record.
pub async fn evaluate_interview(
    llm: &LlmClient,
    submission: &InterviewSubmission,
) -> Result<InterviewRecord, AppError> {
    if submission.answers.is_empty() {
        return Err(AppError::Validation(
            "an interview session needs at least one answered question".to_string(),
        ));
    }

    let mut questions = Vec::with_capacity(submission.answers.len());
    for answered in &submission.answers {
        let prompt = INTERVIEW_EVAL_PROMPT
            .replace("{role}", &submission.role)
            .replace("{question}", &answered.question)
            .replace("{answer}", &answered.answer);

        let evaluation: AnswerEvaluation = llm
            .call_json(&prompt, INTERVIEW_EVAL_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Answer evaluation failed: {e}")))?;

        questions.push(AnsweredQuestion {
            question: answered.question.clone(),
            answer: answered.answer.clone(),
            score: evaluation.score.min(100),
            feedback: evaluation.feedback,
        });
    }

    let overall_score = session_score(&questions.iter().map(|q| q.score).collect::<Vec<_>>());

    Ok(InterviewRecord {
        id: Uuid::new_v4(),
        role: submission.role.clone(),
        questions,
        overall_score,
        created_at: Utc::now(),
    })
}

/// Session score: rounded mean of per-answer scores; 0 for no answers.
fn session_score(scores: &[u32]) -> u32 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u32 = scores.iter().sum();
    ((sum as f64 / scores.len() as f64).round() as u32).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_score_is_rounded_mean() {
        assert_eq!(session_score(&[80, 90]), 85);
        assert_eq!(session_score(&[70, 71]), 71); // 70.5 rounds up
        assert_eq!(session_score(&[100]), 100);
    }

    #[test]
    fn test_session_score_empty_is_zero() {
        assert_eq!(session_score(&[]), 0);
    }

    #[tokio::test]
    async fn test_empty_submission_is_rejected() {
        let llm = LlmClient::new(Vec::new());
        let submission = InterviewSubmission {
            role: "Backend Engineer".to_string(),
            answers: vec![],
        };
        let err = evaluate_interview(&llm, &submission).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
