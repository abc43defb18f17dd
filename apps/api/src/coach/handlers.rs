use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::to_value;
use uuid::Uuid;

use crate::coach::interview::{evaluate_interview, InterviewSubmission, SubmittedAnswer};
use crate::coach::resume::analyze_resume;
use crate::coach::roadmap::generate_roadmap;
use crate::errors::AppError;
use crate::models::interview::InterviewRecord;
use crate::models::resume::ResumeAnalysis;
use crate::models::roadmap::RoadmapStructure;
use crate::progress::handlers::{badge_views, BadgeView};
use crate::state::AppState;
use crate::store::collections;

#[derive(Deserialize)]
pub struct AnalyzeResumeRequest {
    pub user_id: Uuid,
    pub resume_text: String,
    /// Falls back to the profile's target role when absent.
    #[serde(default)]
    pub target_role: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResumeResponse {
    pub analysis: ResumeAnalysis,
    pub readiness: u32,
    pub newly_earned: Vec<BadgeView>,
}

/// POST /api/v1/coach/resume
///
/// The session lock is not held across the LLM round-trip; the analysis is
/// persisted in the foreground (a coach result is authoritative, unlike the
/// optimistic progress writes) and only then merged into the session.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeResumeRequest>,
) -> Result<Json<AnalyzeResumeResponse>, AppError> {
    let target_role = match req.target_role {
        Some(role) if !role.trim().is_empty() => role,
        _ => {
            let agg = state.sessions.acquire(req.user_id).await;
            agg.snapshot().profile.target_role.clone()
        }
    };

    let analysis = analyze_resume(&state.llm, &req.resume_text, &target_role).await?;

    state
        .store
        .merge_write(
            req.user_id,
            collections::RESUME_ANALYSES,
            to_value(&analysis).map_err(anyhow::Error::from)?,
        )
        .await?;

    let mut agg = state.sessions.acquire(req.user_id).await;
    let newly = agg.put_resume(analysis.clone());
    Ok(Json(AnalyzeResumeResponse {
        analysis,
        readiness: agg.snapshot().readiness,
        newly_earned: badge_views(newly),
    }))
}

#[derive(Deserialize)]
pub struct EvaluateInterviewRequest {
    pub user_id: Uuid,
    pub role: String,
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Serialize)]
pub struct EvaluateInterviewResponse {
    pub record: InterviewRecord,
    pub readiness: u32,
    pub newly_earned: Vec<BadgeView>,
}

/// POST /api/v1/coach/interview
pub async fn handle_evaluate_interview(
    State(state): State<AppState>,
    Json(req): Json<EvaluateInterviewRequest>,
) -> Result<Json<EvaluateInterviewResponse>, AppError> {
    let submission = InterviewSubmission {
        role: req.role,
        answers: req.answers,
    };
    let record = evaluate_interview(&state.llm, &submission).await?;

    state
        .store
        .append(
            req.user_id,
            collections::INTERVIEWS,
            to_value(&record).map_err(anyhow::Error::from)?,
        )
        .await?;

    let mut agg = state.sessions.acquire(req.user_id).await;
    let newly = agg.push_interview(record.clone());
    Ok(Json(EvaluateInterviewResponse {
        record,
        readiness: agg.snapshot().readiness,
        newly_earned: badge_views(newly),
    }))
}

#[derive(Deserialize)]
pub struct GenerateRoadmapRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default = "default_weeks")]
    pub weeks: u32,
}

fn default_weeks() -> u32 {
    8
}

#[derive(Serialize)]
pub struct GenerateRoadmapResponse {
    pub roadmap: RoadmapStructure,
    pub total_tasks: usize,
    pub readiness: u32,
    pub newly_earned: Vec<BadgeView>,
}

/// POST /api/v1/coach/roadmap
///
/// Replaces the current roadmap wholesale. Previously completed task ids
/// that no longer resolve simply stop counting.
pub async fn handle_generate_roadmap(
    State(state): State<AppState>,
    Json(req): Json<GenerateRoadmapRequest>,
) -> Result<Json<GenerateRoadmapResponse>, AppError> {
    let target_role = match req.target_role {
        Some(role) if !role.trim().is_empty() => role,
        _ => {
            let agg = state.sessions.acquire(req.user_id).await;
            agg.snapshot().profile.target_role.clone()
        }
    };

    let roadmap = generate_roadmap(&state.llm, &target_role, req.weeks).await;

    state
        .store
        .merge_write(
            req.user_id,
            collections::ROADMAPS,
            to_value(&roadmap).map_err(anyhow::Error::from)?,
        )
        .await?;

    let mut agg = state.sessions.acquire(req.user_id).await;
    let newly = agg.put_roadmap(roadmap.clone());
    Ok(Json(GenerateRoadmapResponse {
        roadmap,
        total_tasks: agg.snapshot().tasks.len(),
        readiness: agg.snapshot().readiness,
        newly_earned: badge_views(newly),
    }))
}
