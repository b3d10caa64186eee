use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::models::exercise_log::{CreateExerciseLogRequest, ExerciseLog, ExerciseLogQuery};
use crate::AppState;

pub async fn create_exercise_log(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<CreateExerciseLogRequest>,
) -> AppResult<Json<ExerciseLog>> {
    body.validate()?;

    let log_date = body.log_date.unwrap_or_else(|| Utc::now().date_naive());
    let log = state
        .store
        .create_exercise_log(user_id, log_date, &body)
        .await?;

    Ok(Json(log))
}

pub async fn list_exercise_logs(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ExerciseLogQuery>,
) -> AppResult<Json<Vec<ExerciseLog>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let logs = state
        .store
        .get_exercise_logs_range(user_id, start, end)
        .await?;

    Ok(Json(logs))
}
