use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::profile::{Profile, UpdateProfileRequest};
use crate::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Profile>> {
    let profile = state
        .store
        .get_profile(user_id)
        .await?
        .ok_or(AppError::NotFound("Profile not found".into()))?;

    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<Profile>> {
    body.validate()?;

    let profile = state
        .store
        .update_profile(user_id, &body)
        .await?
        .ok_or(AppError::NotFound("Profile not found".into()))?;

    Ok(Json(profile))
}
