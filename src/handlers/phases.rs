use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::profile::CoachingPhase;
use crate::services::phases::{self, PhaseEvaluation, PhaseTransitionResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExecuteTransitionRequest {
    pub new_phase: CoachingPhase,
    /// Time-limit transitions keep maintenance calories.
    #[serde(default)]
    pub forced: bool,
}

pub async fn evaluate_phase(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<PhaseEvaluation>> {
    let evaluation = phases::evaluate_phase_transition(
        &state.store,
        user_id,
        state.config.phase_window_days,
    )
    .await?;

    Ok(Json(evaluation))
}

pub async fn execute_phase(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<ExecuteTransitionRequest>,
) -> AppResult<Json<PhaseTransitionResult>> {
    let result = phases::execute_phase_transition(
        &state.store,
        &state.notifier,
        user_id,
        body.new_phase,
        body.forced,
    )
    .await?;

    Ok(Json(result))
}
