//! Builders for entity fixtures used across service unit tests.

use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::daily_log::DailyLog;
use crate::models::exercise_log::{ExerciseLog, SetRecord};
use crate::models::profile::{CoachingPhase, Profile};

pub fn daily_log(log_date: NaiveDate) -> DailyLog {
    DailyLog {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        log_date,
        weight_kg: None,
        calories_consumed: None,
        protein_grams: None,
        carbs_grams: None,
        fat_grams: None,
        steps: None,
        sleep_hours: None,
        sleep_quality: None,
        energy_level: None,
        stress_level: None,
        mood_rating: None,
        workout_completed: false,
        workout_type: None,
        workout_duration_minutes: None,
        note: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn workout_day(log_date: NaiveDate) -> DailyLog {
    let mut log = daily_log(log_date);
    log.workout_completed = true;
    log
}

pub fn exercise_log(name: &str, log_date: NaiveDate, sets: Vec<SetRecord>) -> ExerciseLog {
    ExerciseLog {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        exercise_name: name.to_owned(),
        log_date,
        completed_sets: sets.len() as i32,
        set_details: Json(sets),
        prescribed_sets: None,
        prescribed_reps: None,
        prescribed_rir: None,
        created_at: Utc::now(),
    }
}

pub fn set(reps: i32, weight_kg: f64) -> SetRecord {
    SetRecord {
        reps,
        weight_kg: Some(weight_kg),
    }
}

pub fn bodyweight_set(reps: i32) -> SetRecord {
    SetRecord {
        reps,
        weight_kg: None,
    }
}

pub fn profile(phase: CoachingPhase) -> Profile {
    Profile {
        user_id: Uuid::new_v4(),
        display_name: "Test User".into(),
        sex: None,
        age: None,
        height_cm: None,
        current_weight_kg: None,
        starting_weight_kg: None,
        target_weight_kg: None,
        activity_level: None,
        current_phase: phase,
        phase_start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        calorie_target: None,
        protein_target_g: None,
        carbs_target_g: None,
        fat_target_g: None,
        timezone: "UTC".into(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
