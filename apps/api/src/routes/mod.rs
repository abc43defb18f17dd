pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::coach::handlers as coach;
use crate::progress::handlers as progress;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Coach API
        .route("/api/v1/coach/resume", post(coach::handle_analyze_resume))
        .route(
            "/api/v1/coach/interview",
            post(coach::handle_evaluate_interview),
        )
        .route(
            "/api/v1/coach/roadmap",
            post(coach::handle_generate_roadmap),
        )
        // Progress API
        .route(
            "/api/v1/progress/dashboard",
            get(progress::handle_dashboard),
        )
        .route(
            "/api/v1/progress/tasks/:task_id",
            patch(progress::handle_toggle_task),
        )
        .route(
            "/api/v1/progress/activity",
            post(progress::handle_log_activity),
        )
        .route("/api/v1/progress/badges", get(progress::handle_badges))
        .route("/api/v1/progress/reset", post(progress::handle_reset))
        .with_state(state)
}
