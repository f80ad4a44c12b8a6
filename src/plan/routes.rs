//! REST endpoints for onboarding questions and plan generation.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::warn;

use super::model::{EnrichedPlan, PlanRequest, QuestionsResponse};
use super::service::PlanService;
use crate::error::PlanError;

/// Shared state for plan routes.
#[derive(Clone)]
pub struct PlanRouteState {
    pub service: Arc<PlanService>,
}

/// GET /questions/{habit}
async fn get_questions(
    State(state): State<PlanRouteState>,
    Path(habit): Path<String>,
) -> Result<Json<QuestionsResponse>, PlanError> {
    state
        .service
        .questions(&habit)
        .await
        .map(Json)
        .inspect_err(|e| warn!(habit = %habit, error = %e, "Questions request failed"))
}

/// POST /plan
///
/// Body: `{"habit": "...", "answers": {"q1": "..."}}`. Malformed bodies are
/// reported as 400 `{error}` like every other failure.
async fn post_plan(
    State(state): State<PlanRouteState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<EnrichedPlan>, PlanError> {
    let Json(request) = payload
        .map_err(PlanError::from)
        .inspect_err(|e| warn!(error = %e, "Rejected plan request body"))?;

    state
        .service
        .plan(&request)
        .await
        .map(Json)
        .inspect_err(|e| warn!(habit = %request.habit, error = %e, "Plan request failed"))
}

/// Build the plan REST routes.
pub fn plan_routes(state: PlanRouteState) -> Router {
    Router::new()
        .route("/questions/{habit}", get(get_questions))
        .route("/plan", post(post_plan))
        .with_state(state)
}
