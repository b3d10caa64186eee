use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user gamification state. `lifetime_points` is monotonically
/// non-decreasing; `spendable_points` can later be drawn down by rewards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PointsLedger {
    pub user_id: Uuid,
    pub lifetime_points: i64,
    pub spendable_points: i64,
    pub daily_points: i64,
    pub weekly_points: i64,
    pub monthly_points: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable audit record of one award. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PointTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action_type: ActionType,
    pub base_points: i64,
    pub multiplier: f64,
    pub total_points: i64,
    pub description: String,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "action_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    FoodLog,
    WorkoutCompleted,
    BiofeedbackLog,
    StepMilestone,
    Milestone,
    WelcomeBonus,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardPeriod {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: Uuid,
    pub display_name: String,
    pub points: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct LeaderboardRow {
    pub user_id: Uuid,
    pub display_name: String,
    pub points: i64,
}

/// What the next streak tier looks like from a given streak count.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NextMultiplierInfo {
    pub next_multiplier: Option<f64>,
    pub days_until_next: Option<i32>,
    pub at_max: bool,
}

#[derive(Debug, Serialize)]
pub struct PointsSummary {
    pub lifetime_points: i64,
    pub spendable_points: i64,
    pub daily_points: i64,
    pub weekly_points: i64,
    pub monthly_points: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub current_multiplier: f64,
    pub next_multiplier_info: NextMultiplierInfo,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub period: Option<LeaderboardPeriod>,
    pub limit: Option<i64>,
}
