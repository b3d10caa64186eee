use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// One user's data for one calendar date. One row per (user, log_date);
/// fields are set independently across the day and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: NaiveDate,
    pub weight_kg: Option<f64>,
    pub calories_consumed: Option<i32>,
    pub protein_grams: Option<i32>,
    pub carbs_grams: Option<i32>,
    pub fat_grams: Option<i32>,
    pub steps: Option<i32>,
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<i32>,
    pub energy_level: Option<i32>,
    pub stress_level: Option<i32>,
    pub mood_rating: Option<i32>,
    pub workout_completed: bool,
    pub workout_type: Option<String>,
    pub workout_duration_minutes: Option<i32>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertDailyLogRequest {
    pub log_date: Option<NaiveDate>,

    #[validate(range(min = 20.0, max = 400.0, message = "weight_kg out of range"))]
    pub weight_kg: Option<f64>,

    #[validate(range(min = 0, max = 20000, message = "calories_consumed out of range"))]
    pub calories_consumed: Option<i32>,

    #[validate(range(min = 0, max = 1000))]
    pub protein_grams: Option<i32>,

    #[validate(range(min = 0, max = 2000))]
    pub carbs_grams: Option<i32>,

    #[validate(range(min = 0, max = 1000))]
    pub fat_grams: Option<i32>,

    #[validate(range(min = 0, max = 200000))]
    pub steps: Option<i32>,

    #[validate(range(min = 0.0, max = 24.0))]
    pub sleep_hours: Option<f64>,

    #[validate(range(min = 1, max = 10, message = "sleep_quality must be between 1 and 10"))]
    pub sleep_quality: Option<i32>,

    #[validate(range(min = 1, max = 10, message = "energy_level must be between 1 and 10"))]
    pub energy_level: Option<i32>,

    #[validate(range(min = 1, max = 10, message = "stress_level must be between 1 and 10"))]
    pub stress_level: Option<i32>,

    #[validate(range(min = 1, max = 10, message = "mood_rating must be between 1 and 10"))]
    pub mood_rating: Option<i32>,

    pub workout_completed: Option<bool>,
    pub workout_type: Option<String>,

    #[validate(range(min = 1, max = 600))]
    pub workout_duration_minutes: Option<i32>,

    pub note: Option<String>,

    /// IANA timezone for "today" resolution (e.g. "America/New_York").
    /// Invalid or missing values fall back to UTC.
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DailyLogQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
