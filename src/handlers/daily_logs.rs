use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::models::daily_log::{DailyLog, DailyLogQuery, UpsertDailyLogRequest};
use crate::services::points;
use crate::AppState;

#[derive(Debug, serde::Serialize)]
pub struct DailyLogResponse {
    pub log: DailyLog,
    pub points_awarded: i64,
}

/// Upsert today's (or an explicit date's) log, then run the award pipeline
/// over the diff between the previous row and this submission.
pub async fn upsert_daily_log(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpsertDailyLogRequest>,
) -> AppResult<Json<DailyLogResponse>> {
    body.validate()?;

    let log_date = body
        .log_date
        .unwrap_or_else(|| points::local_today(body.timezone.as_deref()));

    let previous = state.store.get_daily_log(user_id, log_date).await?;
    let log = state.store.upsert_daily_log(user_id, log_date, &body).await?;

    let points_awarded = points::process_daily_log_event(
        &state.store,
        &state.notifier,
        user_id,
        previous.as_ref(),
        &log,
        &body,
    )
    .await?;

    Ok(Json(DailyLogResponse {
        log,
        points_awarded,
    }))
}

pub async fn list_daily_logs(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<DailyLogQuery>,
) -> AppResult<Json<Vec<DailyLog>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let logs = state.store.get_daily_logs(user_id, start, end).await?;

    Ok(Json(logs))
}
