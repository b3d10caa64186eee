use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;
use validator::Validate;

/// A single performed set. Bodyweight sets carry no weight; volume
/// calculations substitute 1 kg so reps still contribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRecord {
    pub reps: i32,
    pub weight_kg: Option<f64>,
}

/// One exercise performed on one date. Immutable once the day is closed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExerciseLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_name: String,
    pub log_date: NaiveDate,
    pub set_details: Json<Vec<SetRecord>>,
    pub completed_sets: i32,
    pub prescribed_sets: Option<i32>,
    /// Free-text rep prescription, e.g. "8-12" or "5".
    pub prescribed_reps: Option<String>,
    pub prescribed_rir: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExerciseLogRequest {
    #[validate(length(min = 1, max = 200, message = "exercise_name is required"))]
    pub exercise_name: String,

    pub log_date: Option<NaiveDate>,

    pub set_details: Option<Vec<SetRecord>>,

    #[validate(range(min = 0, max = 50))]
    pub completed_sets: Option<i32>,

    #[validate(range(min = 1, max = 50))]
    pub prescribed_sets: Option<i32>,

    #[validate(length(max = 20))]
    pub prescribed_reps: Option<String>,

    #[validate(range(min = 0, max = 10))]
    pub prescribed_rir: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseLogQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
