use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::points::{
    LeaderboardEntry, LeaderboardPeriod, LeaderboardQuery, PointsSummary,
};
use crate::services::points::{self, ProfileCompleteness};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MilestoneRequest {
    pub milestone: String,
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WelcomeBonusRequest {
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AwardResponse {
    pub points_awarded: i64,
    pub current_streak: i32,
    pub lifetime_points: i64,
}

pub async fn get_points_summary(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<PointsSummary>> {
    let summary = points::points_summary(&state.store, user_id).await?;
    Ok(Json(summary))
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<Vec<LeaderboardEntry>>> {
    let period = query.period.unwrap_or(LeaderboardPeriod::Weekly);
    let limit = query
        .limit
        .unwrap_or(state.config.leaderboard_limit)
        .clamp(1, 100);

    let entries = points::leaderboard(&state.store, period, limit).await?;
    Ok(Json(entries))
}

/// Unknown milestone keys award nothing and still return 200.
pub async fn award_milestone(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<MilestoneRequest>,
) -> AppResult<Json<AwardResponse>> {
    let result = points::award_milestone_points(
        &state.store,
        &state.notifier,
        user_id,
        &body.milestone,
        body.timezone.as_deref(),
    )
    .await?;

    let response = match result {
        Some(award) => AwardResponse {
            points_awarded: award.points_awarded,
            current_streak: award.ledger.current_streak,
            lifetime_points: award.ledger.lifetime_points,
        },
        None => {
            // Unknown key: nothing was awarded, report the ledger as-is.
            let ledger = state.store.get_user_points(user_id).await?;
            AwardResponse {
                points_awarded: 0,
                current_streak: ledger.as_ref().map_or(0, |l| l.current_streak),
                lifetime_points: ledger.as_ref().map_or(0, |l| l.lifetime_points),
            }
        }
    };

    Ok(Json(response))
}

pub async fn award_welcome_bonus(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<WelcomeBonusRequest>,
) -> AppResult<Json<AwardResponse>> {
    let completeness = state
        .store
        .get_profile(user_id)
        .await?
        .as_ref()
        .map(ProfileCompleteness::from_profile)
        .unwrap_or_default();

    let award = points::award_welcome_bonus(
        &state.store,
        user_id,
        completeness,
        body.timezone.as_deref(),
    )
    .await?;

    Ok(Json(AwardResponse {
        points_awarded: award.points_awarded,
        current_streak: award.ledger.current_streak,
        lifetime_points: award.ledger.lifetime_points,
    }))
}
