use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::analytics::{self, WorkoutAnalytics};
use crate::AppState;

pub async fn get_workout_analytics(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<WorkoutAnalytics>> {
    let analytics = analytics::workout_analytics(
        &state.store,
        user_id,
        state.config.analytics_window_days,
        state.config.trend_weeks,
    )
    .await?;

    Ok(Json(analytics))
}
