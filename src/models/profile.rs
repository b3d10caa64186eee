use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: String,
    pub sex: Option<Sex>,
    pub age: Option<i32>,
    pub height_cm: Option<f64>,
    pub current_weight_kg: Option<f64>,
    pub starting_weight_kg: Option<f64>,
    pub target_weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub current_phase: CoachingPhase,
    pub phase_start_date: NaiveDate,
    pub calorie_target: Option<i32>,
    pub protein_target_g: Option<i32>,
    pub carbs_target_g: Option<i32>,
    pub fat_target_g: Option<i32>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "sex", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "activity_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
}

/// Coaching stage. A guarded cycle: assessment → recovery → recomp →
/// cutting → recovery. Transitions only happen through an evaluation pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "coaching_phase", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CoachingPhase {
    Assessment,
    Recovery,
    Recomp,
    Cutting,
}

impl Default for CoachingPhase {
    fn default() -> Self {
        Self::Assessment
    }
}

impl std::fmt::Display for CoachingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assessment => write!(f, "assessment"),
            Self::Recovery => write!(f, "recovery"),
            Self::Recomp => write!(f, "recomp"),
            Self::Cutting => write!(f, "cutting"),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,

    pub sex: Option<Sex>,

    #[validate(range(min = 13, max = 120))]
    pub age: Option<i32>,

    #[validate(range(min = 100.0, max = 250.0))]
    pub height_cm: Option<f64>,

    #[validate(range(min = 20.0, max = 400.0))]
    pub current_weight_kg: Option<f64>,

    #[validate(range(min = 20.0, max = 400.0))]
    pub starting_weight_kg: Option<f64>,

    #[validate(range(min = 20.0, max = 400.0))]
    pub target_weight_kg: Option<f64>,

    pub activity_level: Option<ActivityLevel>,

    #[validate(range(min = 800, max = 10000))]
    pub calorie_target: Option<i32>,

    #[validate(range(min = 0, max = 500))]
    pub protein_target_g: Option<i32>,

    #[validate(range(min = 0, max = 1500))]
    pub carbs_target_g: Option<i32>,

    #[validate(range(min = 0, max = 500))]
    pub fat_target_g: Option<i32>,

    pub timezone: Option<String>,
}

/// Recomputed nutrition targets produced by a phase transition.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct NutritionTargets {
    pub calories: i32,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}
