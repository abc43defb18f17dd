use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::UserProfile;
use crate::progress::badges::{BadgeSpec, CATALOG};
use crate::progress::outbox::SyncState;
use crate::progress::tasks::Task;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct UserIdBody {
    pub user_id: Uuid,
}

/// Serializable projection of a catalog badge.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeView {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

impl From<&'static BadgeSpec> for BadgeView {
    fn from(spec: &'static BadgeSpec) -> Self {
        Self {
            id: spec.id,
            title: spec.title,
            description: spec.description,
        }
    }
}

pub fn badge_views(specs: Vec<&'static BadgeSpec>) -> Vec<BadgeView> {
    specs.into_iter().map(BadgeView::from).collect()
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub profile: UserProfile,
    pub profile_loaded: bool,
    pub readiness: u32,
    pub tasks: Vec<Task>,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub completion_fraction: Option<f64>,
    pub streak: u32,
    pub interview_count: usize,
    pub earned_badges: BTreeMap<String, DateTime<Utc>>,
    /// Per-collection outbox state — lets the UI show staleness instead of
    /// silently drifting after a failed write.
    pub sync: BTreeMap<String, SyncState>,
}

/// GET /api/v1/progress/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let agg = state.sessions.acquire(params.user_id).await;
    let snapshot = agg.snapshot();
    Ok(Json(DashboardResponse {
        profile: snapshot.profile.clone(),
        profile_loaded: snapshot.profile_loaded,
        readiness: snapshot.readiness,
        completed_tasks: snapshot.completed_task_count(),
        total_tasks: snapshot.tasks.len(),
        completion_fraction: snapshot.completion_fraction(),
        tasks: snapshot.tasks.clone(),
        streak: snapshot.streak,
        interview_count: snapshot.interviews.len(),
        earned_badges: snapshot.badges.earned.clone(),
        sync: agg.sync_states(),
    }))
}

#[derive(Serialize)]
pub struct ToggleTaskResponse {
    pub task_id: String,
    pub completed: bool,
    pub readiness: u32,
    pub completion_fraction: Option<f64>,
    pub newly_earned: Vec<BadgeView>,
}

/// PATCH /api/v1/progress/tasks/:task_id
///
/// Ids not present in the current structure are accepted — the completed
/// set tolerates stale members, which count for nothing.
pub async fn handle_toggle_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(req): Json<UserIdBody>,
) -> Result<Json<ToggleTaskResponse>, AppError> {
    let mut agg = state.sessions.acquire(req.user_id).await;
    let (completed, newly) = agg.toggle_task(&task_id);
    Ok(Json(ToggleTaskResponse {
        task_id,
        completed,
        readiness: agg.snapshot().readiness,
        completion_fraction: agg.snapshot().completion_fraction(),
        newly_earned: badge_views(newly),
    }))
}

#[derive(Serialize)]
pub struct LogActivityResponse {
    pub today_count: u32,
    pub streak: u32,
    pub newly_earned: Vec<BadgeView>,
}

/// POST /api/v1/progress/activity
pub async fn handle_log_activity(
    State(state): State<AppState>,
    Json(req): Json<UserIdBody>,
) -> Result<Json<LogActivityResponse>, AppError> {
    let mut agg = state.sessions.acquire(req.user_id).await;
    let (today_count, newly) = agg.log_activity();
    Ok(Json(LogActivityResponse {
        today_count,
        streak: agg.snapshot().streak,
        newly_earned: badge_views(newly),
    }))
}

#[derive(Serialize)]
pub struct EarnedBadgeView {
    pub id: String,
    pub title: &'static str,
    pub description: &'static str,
    pub earned_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct BadgesResponse {
    pub earned: Vec<EarnedBadgeView>,
    pub available: Vec<BadgeView>,
}

/// GET /api/v1/progress/badges
pub async fn handle_badges(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<BadgesResponse>, AppError> {
    let agg = state.sessions.acquire(params.user_id).await;
    let earned_set = &agg.snapshot().badges;

    let earned = CATALOG
        .iter()
        .filter_map(|spec| {
            earned_set.earned.get(spec.id).map(|ts| EarnedBadgeView {
                id: spec.id.to_string(),
                title: spec.title,
                description: spec.description,
                earned_at: *ts,
            })
        })
        .collect();
    let available = CATALOG
        .iter()
        .filter(|spec| !earned_set.contains(spec.id))
        .map(BadgeView::from)
        .collect();

    Ok(Json(BadgesResponse { earned, available }))
}

/// POST /api/v1/progress/reset
///
/// Logout: clears the in-memory session. Nothing is deleted remotely.
pub async fn handle_reset(
    State(state): State<AppState>,
    Json(req): Json<UserIdBody>,
) -> Result<StatusCode, AppError> {
    {
        let mut agg = state.sessions.acquire(req.user_id).await;
        agg.reset();
    }
    state.sessions.remove(req.user_id).await;
    Ok(StatusCode::NO_CONTENT)
}
