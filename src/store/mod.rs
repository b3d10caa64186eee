//! Log Store collaborator. The only module in the crate that issues SQL;
//! everything above it works against this narrow interface.

use chrono::{NaiveDate, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::daily_log::{DailyLog, UpsertDailyLogRequest};
use crate::models::exercise_log::{CreateExerciseLogRequest, ExerciseLog, SetRecord};
use crate::models::points::{
    ActionType, LeaderboardPeriod, LeaderboardRow, PointTransaction, PointsLedger,
};
use crate::models::profile::{CoachingPhase, NutritionTargets, Profile, UpdateProfileRequest};

#[derive(Clone)]
pub struct LogStore {
    db: PgPool,
}

/// One ledger write per award: counter increments happen SQL-side so
/// concurrent awards cannot lose points, and `GREATEST` keeps the longest
/// streak monotone. The streak decision itself is computed by the caller.
#[derive(Debug, Clone, Copy)]
pub struct PointsUpdate {
    pub points: i64,
    pub reset_daily: bool,
    pub reset_weekly: bool,
    pub reset_monthly: bool,
    pub current_streak: i32,
    pub last_activity_date: NaiveDate,
}

#[derive(Debug)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub action_type: ActionType,
    pub base_points: i64,
    pub multiplier: f64,
    pub total_points: i64,
    pub description: String,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
}

impl LogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    // ── Daily logs ──────────────────────────────────────────────────────

    pub async fn get_daily_logs(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DailyLog>> {
        let logs = sqlx::query_as::<_, DailyLog>(
            r#"
            SELECT * FROM daily_logs
            WHERE user_id = $1 AND log_date BETWEEN $2 AND $3
            ORDER BY log_date DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }

    pub async fn get_daily_log(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<DailyLog>> {
        let log = sqlx::query_as::<_, DailyLog>(
            "SELECT * FROM daily_logs WHERE user_id = $1 AND log_date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;

        Ok(log)
    }

    pub async fn upsert_daily_log(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
        body: &UpsertDailyLogRequest,
    ) -> AppResult<DailyLog> {
        let log = sqlx::query_as::<_, DailyLog>(
            r#"
            INSERT INTO daily_logs (
                id, user_id, log_date, weight_kg, calories_consumed, protein_grams,
                carbs_grams, fat_grams, steps, sleep_hours, sleep_quality, energy_level,
                stress_level, mood_rating, workout_completed, workout_type,
                workout_duration_minutes, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    COALESCE($15, false), $16, $17, $18)
            ON CONFLICT (user_id, log_date) DO UPDATE SET
                weight_kg = COALESCE($4, daily_logs.weight_kg),
                calories_consumed = COALESCE($5, daily_logs.calories_consumed),
                protein_grams = COALESCE($6, daily_logs.protein_grams),
                carbs_grams = COALESCE($7, daily_logs.carbs_grams),
                fat_grams = COALESCE($8, daily_logs.fat_grams),
                steps = COALESCE($9, daily_logs.steps),
                sleep_hours = COALESCE($10, daily_logs.sleep_hours),
                sleep_quality = COALESCE($11, daily_logs.sleep_quality),
                energy_level = COALESCE($12, daily_logs.energy_level),
                stress_level = COALESCE($13, daily_logs.stress_level),
                mood_rating = COALESCE($14, daily_logs.mood_rating),
                workout_completed = COALESCE($15, daily_logs.workout_completed),
                workout_type = COALESCE($16, daily_logs.workout_type),
                workout_duration_minutes = COALESCE($17, daily_logs.workout_duration_minutes),
                note = COALESCE($18, daily_logs.note),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(log_date)
        .bind(body.weight_kg)
        .bind(body.calories_consumed)
        .bind(body.protein_grams)
        .bind(body.carbs_grams)
        .bind(body.fat_grams)
        .bind(body.steps)
        .bind(body.sleep_hours)
        .bind(body.sleep_quality)
        .bind(body.energy_level)
        .bind(body.stress_level)
        .bind(body.mood_rating)
        .bind(body.workout_completed)
        .bind(&body.workout_type)
        .bind(body.workout_duration_minutes)
        .bind(&body.note)
        .fetch_one(&self.db)
        .await?;

        Ok(log)
    }

    // ── Exercise logs ───────────────────────────────────────────────────

    pub async fn get_exercise_logs_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<ExerciseLog>> {
        let logs = sqlx::query_as::<_, ExerciseLog>(
            r#"
            SELECT * FROM exercise_logs
            WHERE user_id = $1 AND log_date BETWEEN $2 AND $3
            ORDER BY log_date DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }

    pub async fn create_exercise_log(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
        body: &CreateExerciseLogRequest,
    ) -> AppResult<ExerciseLog> {
        let sets: Vec<SetRecord> = body.set_details.clone().unwrap_or_default();
        let completed_sets = body.completed_sets.unwrap_or(sets.len() as i32);

        let log = sqlx::query_as::<_, ExerciseLog>(
            r#"
            INSERT INTO exercise_logs (
                id, user_id, exercise_name, log_date, set_details, completed_sets,
                prescribed_sets, prescribed_reps, prescribed_rir
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&body.exercise_name)
        .bind(log_date)
        .bind(Json(sets))
        .bind(completed_sets)
        .bind(body.prescribed_sets)
        .bind(&body.prescribed_reps)
        .bind(body.prescribed_rir)
        .fetch_one(&self.db)
        .await?;

        Ok(log)
    }

    // ── Points ledger ───────────────────────────────────────────────────

    pub async fn get_user_points(&self, user_id: Uuid) -> AppResult<Option<PointsLedger>> {
        let ledger = sqlx::query_as::<_, PointsLedger>(
            "SELECT * FROM user_points WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(ledger)
    }

    /// Lazily create a zeroed ledger. ON CONFLICT no-op update so RETURNING
    /// always yields the row, created or pre-existing.
    pub async fn create_user_points(&self, user_id: Uuid) -> AppResult<PointsLedger> {
        let ledger = sqlx::query_as::<_, PointsLedger>(
            r#"
            INSERT INTO user_points (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE
                SET user_id = user_points.user_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(ledger)
    }

    pub async fn update_user_points(
        &self,
        user_id: Uuid,
        update: PointsUpdate,
    ) -> AppResult<PointsLedger> {
        let ledger = sqlx::query_as::<_, PointsLedger>(
            r#"
            UPDATE user_points SET
                lifetime_points = lifetime_points + $2,
                spendable_points = spendable_points + $2,
                daily_points = CASE WHEN $3 THEN $2 ELSE daily_points + $2 END,
                weekly_points = CASE WHEN $4 THEN $2 ELSE weekly_points + $2 END,
                monthly_points = CASE WHEN $5 THEN $2 ELSE monthly_points + $2 END,
                current_streak = $6,
                longest_streak = GREATEST(longest_streak, $6),
                last_activity_date = $7,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(update.points)
        .bind(update.reset_daily)
        .bind(update.reset_weekly)
        .bind(update.reset_monthly)
        .bind(update.current_streak)
        .bind(update.last_activity_date)
        .fetch_one(&self.db)
        .await?;

        Ok(ledger)
    }

    /// Append an award record. When a reference id is present the insert is
    /// idempotent on (user_id, action_type, reference_id): a duplicate
    /// returns None and the caller treats the award as a no-op success.
    pub async fn create_point_transaction(
        &self,
        tx: &NewTransaction,
    ) -> AppResult<Option<PointTransaction>> {
        let row = sqlx::query_as::<_, PointTransaction>(
            r#"
            INSERT INTO point_transactions (
                id, user_id, action_type, base_points, multiplier, total_points,
                description, reference_id, reference_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, action_type, reference_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tx.user_id)
        .bind(tx.action_type)
        .bind(tx.base_points)
        .bind(tx.multiplier)
        .bind(tx.total_points)
        .bind(&tx.description)
        .bind(tx.reference_id)
        .bind(&tx.reference_type)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    pub async fn has_transaction(
        &self,
        user_id: Uuid,
        action_type: ActionType,
    ) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM point_transactions WHERE user_id = $1 AND action_type = $2)",
        )
        .bind(user_id)
        .bind(action_type)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    pub async fn get_leaderboard(
        &self,
        period: LeaderboardPeriod,
        limit: i64,
    ) -> AppResult<Vec<LeaderboardRow>> {
        let query = match period {
            LeaderboardPeriod::Daily => {
                r#"
                SELECT up.user_id, p.display_name, up.daily_points AS points
                FROM user_points up
                JOIN profiles p ON p.user_id = up.user_id
                ORDER BY up.daily_points DESC, p.display_name ASC
                LIMIT $1
                "#
            }
            LeaderboardPeriod::Weekly => {
                r#"
                SELECT up.user_id, p.display_name, up.weekly_points AS points
                FROM user_points up
                JOIN profiles p ON p.user_id = up.user_id
                ORDER BY up.weekly_points DESC, p.display_name ASC
                LIMIT $1
                "#
            }
            LeaderboardPeriod::Monthly => {
                r#"
                SELECT up.user_id, p.display_name, up.monthly_points AS points
                FROM user_points up
                JOIN profiles p ON p.user_id = up.user_id
                ORDER BY up.monthly_points DESC, p.display_name ASC
                LIMIT $1
                "#
            }
        };

        let rows = sqlx::query_as::<_, LeaderboardRow>(query)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;

        Ok(rows)
    }

    // ── Profiles ────────────────────────────────────────────────────────

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        body: &UpdateProfileRequest,
    ) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET
                display_name = COALESCE($2, display_name),
                sex = COALESCE($3, sex),
                age = COALESCE($4, age),
                height_cm = COALESCE($5, height_cm),
                current_weight_kg = COALESCE($6, current_weight_kg),
                starting_weight_kg = COALESCE($7, starting_weight_kg),
                target_weight_kg = COALESCE($8, target_weight_kg),
                activity_level = COALESCE($9, activity_level),
                calorie_target = COALESCE($10, calorie_target),
                protein_target_g = COALESCE($11, protein_target_g),
                carbs_target_g = COALESCE($12, carbs_target_g),
                fat_target_g = COALESCE($13, fat_target_g),
                timezone = COALESCE($14, timezone),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&body.display_name)
        .bind(body.sex)
        .bind(body.age)
        .bind(body.height_cm)
        .bind(body.current_weight_kg)
        .bind(body.starting_weight_kg)
        .bind(body.target_weight_kg)
        .bind(body.activity_level)
        .bind(body.calorie_target)
        .bind(body.protein_target_g)
        .bind(body.carbs_target_g)
        .bind(body.fat_target_g)
        .bind(&body.timezone)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    /// The single write a phase transition performs: new phase, fresh
    /// phase_start_date, recomputed nutrition targets.
    pub async fn set_phase(
        &self,
        user_id: Uuid,
        phase: CoachingPhase,
        targets: NutritionTargets,
    ) -> AppResult<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET
                current_phase = $2,
                phase_start_date = $3,
                calorie_target = $4,
                protein_target_g = $5,
                carbs_target_g = $6,
                fat_target_g = $7,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(phase)
        .bind(Utc::now().date_naive())
        .bind(targets.calories)
        .bind(targets.protein_g)
        .bind(targets.carbs_g)
        .bind(targets.fat_g)
        .fetch_one(&self.db)
        .await?;

        Ok(profile)
    }
}
