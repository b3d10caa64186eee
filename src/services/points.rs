//! Streak & points ledger: converts discrete logging actions into point
//! awards with a streak multiplier, and keeps the per-user counters current.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::daily_log::{DailyLog, UpsertDailyLogRequest};
use crate::models::points::{
    ActionType, LeaderboardEntry, LeaderboardPeriod, NextMultiplierInfo, PointTransaction,
    PointsLedger, PointsSummary,
};
use crate::services::notifications::{self, Notification, Notifier};
use crate::store::{LogStore, NewTransaction, PointsUpdate};

/// Base points for logging a day's nutrition.
pub const FOOD_LOG_POINTS: i64 = 10;

/// Streak-day thresholds and their multipliers, highest tier first.
const STREAK_TIERS: &[(i32, f64)] = &[(14, 4.0), (7, 3.0), (3, 2.0)];

/// One-off milestone catalog. Unknown keys award nothing.
const MILESTONE_CATALOG: &[(&str, i64)] = &[
    ("first_food_log", 50),
    ("first_workout", 100),
    ("day_3", 100),
    ("first_week", 250),
];

const WELCOME_BONUS_BASE: i64 = 50;

/// Per-flag bonuses for a complete onboarding profile.
const COMPLETENESS_BONUSES: &[(ProfileFlag, i64)] = &[
    (ProfileFlag::DisplayName, 10),
    (ProfileFlag::Sex, 10),
    (ProfileFlag::Age, 15),
    (ProfileFlag::Height, 15),
    (ProfileFlag::Weight, 25),
    (ProfileFlag::TargetWeight, 25),
    (ProfileFlag::ActivityLevel, 50),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfileFlag {
    DisplayName,
    Sex,
    Age,
    Height,
    Weight,
    TargetWeight,
    ActivityLevel,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileCompleteness {
    pub display_name: bool,
    pub sex: bool,
    pub age: bool,
    pub height: bool,
    pub weight: bool,
    pub target_weight: bool,
    pub activity_level: bool,
}

impl ProfileCompleteness {
    pub fn from_profile(profile: &crate::models::profile::Profile) -> Self {
        Self {
            display_name: !profile.display_name.is_empty(),
            sex: profile.sex.is_some(),
            age: profile.age.is_some(),
            height: profile.height_cm.is_some(),
            weight: profile.current_weight_kg.is_some(),
            target_weight: profile.target_weight_kg.is_some(),
            activity_level: profile.activity_level.is_some(),
        }
    }

    fn flag(&self, flag: ProfileFlag) -> bool {
        match flag {
            ProfileFlag::DisplayName => self.display_name,
            ProfileFlag::Sex => self.sex,
            ProfileFlag::Age => self.age,
            ProfileFlag::Height => self.height,
            ProfileFlag::Weight => self.weight,
            ProfileFlag::TargetWeight => self.target_weight,
            ProfileFlag::ActivityLevel => self.activity_level,
        }
    }

    pub fn bonus(&self) -> i64 {
        COMPLETENESS_BONUSES
            .iter()
            .filter(|(flag, _)| self.flag(*flag))
            .map(|(_, points)| points)
            .sum()
    }
}

/// Which biofeedback fields a submission carried.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiofeedbackFields {
    pub sleep: bool,
    pub energy: bool,
    pub stress: bool,
    pub mood: bool,
    pub weight: bool,
}

impl BiofeedbackFields {
    pub fn from_request(body: &UpsertDailyLogRequest) -> Self {
        Self {
            sleep: body.sleep_hours.is_some() || body.sleep_quality.is_some(),
            energy: body.energy_level.is_some(),
            stress: body.stress_level.is_some(),
            mood: body.mood_rating.is_some(),
            weight: body.weight_kg.is_some(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AwardInput {
    pub action_type: ActionType,
    pub base_points: i64,
    pub description: String,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug)]
pub struct AwardResult {
    /// None when the award was a no-op (zero points or duplicate reference).
    pub transaction: Option<PointTransaction>,
    pub ledger: PointsLedger,
    pub points_awarded: i64,
}

// ── Pure calculators ────────────────────────────────────────────────────

pub fn streak_multiplier(streak: i32) -> f64 {
    for &(days, multiplier) in STREAK_TIERS {
        if streak >= days {
            return multiplier;
        }
    }
    1.0
}

pub fn next_multiplier_info(streak: i32) -> NextMultiplierInfo {
    // Tiers are ordered highest first; the next tier is the last one the
    // streak has not yet reached.
    for &(days, multiplier) in STREAK_TIERS.iter().rev() {
        if streak < days {
            return NextMultiplierInfo {
                next_multiplier: Some(multiplier),
                days_until_next: Some(days - streak),
                at_max: false,
            };
        }
    }
    NextMultiplierInfo {
        next_multiplier: None,
        days_until_next: None,
        at_max: true,
    }
}

/// Highest step tier reached; tiers do not accumulate.
pub fn calculate_step_points(steps: i32) -> i64 {
    match steps {
        s if s >= 10_000 => 50,
        s if s >= 8_000 => 35,
        s if s >= 5_000 => 20,
        s if s >= 2_000 => 10,
        _ => 0,
    }
}

/// Base 50, plus one point per minute past 15, capped at 30 bonus points.
pub fn calculate_workout_points(duration_minutes: i32) -> i64 {
    let bonus = (duration_minutes - 15).clamp(0, 30) as i64;
    50 + bonus
}

/// Fixed value per biofeedback field present in the submission. Zero fields
/// present means zero points, which callers treat as a no-op.
pub fn calculate_biofeedback_points(fields: &BiofeedbackFields) -> i64 {
    let mut points = 0;
    if fields.sleep {
        points += 15;
    }
    if fields.energy {
        points += 10;
    }
    if fields.stress {
        points += 10;
    }
    if fields.mood {
        points += 10;
    }
    if fields.weight {
        points += 20;
    }
    points
}

/// "Today" in the caller's timezone; invalid or missing zones fall back to
/// UTC without surfacing an error.
pub fn local_today(timezone: Option<&str>) -> NaiveDate {
    let tz: Tz = timezone
        .and_then(|name| name.parse().ok())
        .unwrap_or(chrono_tz::UTC);
    Utc::now().with_timezone(&tz).date_naive()
}

/// Streak continuation rule: same day keeps the streak, yesterday extends
/// it, anything else restarts at 1.
fn advance_streak(last_activity: Option<NaiveDate>, current: i32, today: NaiveDate) -> i32 {
    match last_activity {
        Some(date) if date == today => current,
        Some(date) if date == today - Duration::days(1) => current + 1,
        _ => 1,
    }
}

/// Which period counters have rolled over since the last activity.
fn period_rollovers(last_activity: Option<NaiveDate>, today: NaiveDate) -> (bool, bool, bool) {
    let Some(last) = last_activity else {
        return (false, false, false);
    };
    let daily = last != today;
    let weekly = (last.iso_week().year(), last.iso_week().week())
        != (today.iso_week().year(), today.iso_week().week());
    let monthly = (last.year(), last.month()) != (today.year(), today.month());
    (daily, weekly, monthly)
}

// ── Award orchestration ─────────────────────────────────────────────────

pub async fn award_points(
    store: &LogStore,
    notifier: &Notifier,
    user_id: Uuid,
    input: AwardInput,
) -> AppResult<AwardResult> {
    let today = local_today(input.timezone.as_deref());

    let ledger = match store.get_user_points(user_id).await? {
        Some(ledger) => ledger,
        None => store.create_user_points(user_id).await?,
    };

    if input.base_points <= 0 {
        return Ok(AwardResult {
            transaction: None,
            ledger,
            points_awarded: 0,
        });
    }

    let old_streak = ledger.current_streak;
    let new_streak = advance_streak(ledger.last_activity_date, ledger.current_streak, today);
    let multiplier = streak_multiplier(new_streak);
    let total_points = (input.base_points as f64 * multiplier).round() as i64;

    let transaction = store
        .create_point_transaction(&NewTransaction {
            user_id,
            action_type: input.action_type,
            base_points: input.base_points,
            multiplier,
            total_points,
            description: input.description,
            reference_id: input.reference_id,
            reference_type: input.reference_type,
        })
        .await?;

    let Some(transaction) = transaction else {
        // Duplicate reference: the award already happened. No-op success.
        tracing::debug!(%user_id, action = ?input.action_type, "duplicate award reference, skipping");
        return Ok(AwardResult {
            transaction: None,
            ledger,
            points_awarded: 0,
        });
    };

    let (reset_daily, reset_weekly, reset_monthly) =
        period_rollovers(ledger.last_activity_date, today);

    let ledger = store
        .update_user_points(
            user_id,
            PointsUpdate {
                points: total_points,
                reset_daily,
                reset_weekly,
                reset_monthly,
                current_streak: new_streak,
                last_activity_date: today,
            },
        )
        .await?;

    if let Some(days) = notifications::crossed_streak_milestone(old_streak, ledger.current_streak)
    {
        notifier.send(Notification::StreakMilestone { user_id, days });
    }

    tracing::info!(
        %user_id,
        action = ?transaction.action_type,
        points = total_points,
        streak = ledger.current_streak,
        "points awarded"
    );

    Ok(AwardResult {
        transaction: Some(transaction),
        ledger,
        points_awarded: total_points,
    })
}

/// Step awards hand out only the delta between the tier already reached
/// today and the new one, so re-logging a higher count never double-pays.
pub async fn award_step_milestone(
    store: &LogStore,
    notifier: &Notifier,
    user_id: Uuid,
    old_steps: Option<i32>,
    new_steps: i32,
    timezone: Option<&str>,
) -> AppResult<Option<AwardResult>> {
    let delta =
        (calculate_step_points(new_steps) - calculate_step_points(old_steps.unwrap_or(0))).max(0);
    if delta == 0 {
        return Ok(None);
    }

    let result = award_points(
        store,
        notifier,
        user_id,
        AwardInput {
            action_type: ActionType::StepMilestone,
            base_points: delta,
            description: format!("Step milestone: {new_steps} steps"),
            reference_id: None,
            reference_type: None,
            timezone: timezone.map(str::to_owned),
        },
    )
    .await?;

    Ok(Some(result))
}

/// Fixed-catalog milestone award. Unknown keys are a successful no-op.
pub async fn award_milestone_points(
    store: &LogStore,
    notifier: &Notifier,
    user_id: Uuid,
    milestone_key: &str,
    timezone: Option<&str>,
) -> AppResult<Option<AwardResult>> {
    let Some(&(key, points)) = MILESTONE_CATALOG.iter().find(|(k, _)| *k == milestone_key)
    else {
        tracing::debug!(%user_id, milestone = milestone_key, "unknown milestone key, ignoring");
        return Ok(None);
    };

    let result = award_points(
        store,
        notifier,
        user_id,
        AwardInput {
            action_type: ActionType::Milestone,
            base_points: points,
            description: format!("Milestone reached: {key}"),
            reference_id: None,
            reference_type: Some("milestone".into()),
            timezone: timezone.map(str::to_owned),
        },
    )
    .await?;

    Ok(Some(result))
}

/// One-time onboarding bonus. Bypasses the streak multiplier and resets the
/// streak to 1 regardless of prior state.
pub async fn award_welcome_bonus(
    store: &LogStore,
    user_id: Uuid,
    completeness: ProfileCompleteness,
    timezone: Option<&str>,
) -> AppResult<AwardResult> {
    let ledger = match store.get_user_points(user_id).await? {
        Some(ledger) => ledger,
        None => store.create_user_points(user_id).await?,
    };

    if store
        .has_transaction(user_id, ActionType::WelcomeBonus)
        .await?
    {
        return Ok(AwardResult {
            transaction: None,
            ledger,
            points_awarded: 0,
        });
    }

    let today = local_today(timezone);
    let total_points = WELCOME_BONUS_BASE + completeness.bonus();

    let transaction = store
        .create_point_transaction(&NewTransaction {
            user_id,
            action_type: ActionType::WelcomeBonus,
            base_points: total_points,
            multiplier: 1.0,
            total_points,
            description: "Welcome aboard bonus".into(),
            reference_id: None,
            reference_type: None,
        })
        .await?;

    let (reset_daily, reset_weekly, reset_monthly) =
        period_rollovers(ledger.last_activity_date, today);

    let ledger = store
        .update_user_points(
            user_id,
            PointsUpdate {
                points: total_points,
                reset_daily,
                reset_weekly,
                reset_monthly,
                current_streak: 1,
                last_activity_date: today,
            },
        )
        .await?;

    Ok(AwardResult {
        transaction,
        ledger,
        points_awarded: total_points,
    })
}

// ── Daily-log event mapping ─────────────────────────────────────────────

/// Map a daily-log upsert onto awards and notifications by diffing the
/// previous row against the submission. Returns total points awarded.
pub async fn process_daily_log_event(
    store: &LogStore,
    notifier: &Notifier,
    user_id: Uuid,
    previous: Option<&DailyLog>,
    log: &DailyLog,
    body: &UpsertDailyLogRequest,
) -> AppResult<i64> {
    let tz = body.timezone.as_deref();
    let streak_before = store
        .get_user_points(user_id)
        .await?
        .map_or(0, |l| l.current_streak);
    let mut total = 0;

    // Food logged for the first time today.
    let had_calories = previous.is_some_and(|l| l.calories_consumed.is_some());
    if body.calories_consumed.is_some() && !had_calories {
        let first_ever = !store.has_transaction(user_id, ActionType::FoodLog).await?;
        let result = award_points(
            store,
            notifier,
            user_id,
            AwardInput {
                action_type: ActionType::FoodLog,
                base_points: FOOD_LOG_POINTS,
                description: "Logged daily nutrition".into(),
                reference_id: Some(log.id),
                reference_type: Some("daily_log".into()),
                timezone: tz.map(str::to_owned),
            },
        )
        .await?;
        total += result.points_awarded;

        if first_ever {
            if let Some(result) =
                award_milestone_points(store, notifier, user_id, "first_food_log", tz).await?
            {
                total += result.points_awarded;
            }
        }
    }

    // Workout flipped to completed.
    let was_completed = previous.is_some_and(|l| l.workout_completed);
    if log.workout_completed && !was_completed {
        let first_ever = !store
            .has_transaction(user_id, ActionType::WorkoutCompleted)
            .await?;
        let duration = log.workout_duration_minutes.unwrap_or(0);
        let result = award_points(
            store,
            notifier,
            user_id,
            AwardInput {
                action_type: ActionType::WorkoutCompleted,
                base_points: calculate_workout_points(duration),
                description: match &log.workout_type {
                    Some(kind) => format!("Completed {kind} workout"),
                    None => "Completed workout".into(),
                },
                reference_id: Some(log.id),
                reference_type: Some("daily_log".into()),
                timezone: tz.map(str::to_owned),
            },
        )
        .await?;
        total += result.points_awarded;

        if first_ever {
            if let Some(result) =
                award_milestone_points(store, notifier, user_id, "first_workout", tz).await?
            {
                total += result.points_awarded;
            }
        }
    }

    // Biofeedback fields in this submission. The daily-log reference makes
    // repeat submissions for the same day a no-op.
    let fields = BiofeedbackFields::from_request(body);
    let biofeedback_points = calculate_biofeedback_points(&fields);
    if biofeedback_points > 0 {
        let result = award_points(
            store,
            notifier,
            user_id,
            AwardInput {
                action_type: ActionType::BiofeedbackLog,
                base_points: biofeedback_points,
                description: "Logged biofeedback".into(),
                reference_id: Some(log.id),
                reference_type: Some("daily_log".into()),
                timezone: tz.map(str::to_owned),
            },
        )
        .await?;
        total += result.points_awarded;
    }

    // Step tier delta.
    if let Some(new_steps) = body.steps {
        let old_steps = previous.and_then(|l| l.steps);
        if let Some(result) =
            award_step_milestone(store, notifier, user_id, old_steps, new_steps, tz).await?
        {
            total += result.points_awarded;
        }
    }

    // Streak-length milestones unlocked by today's activity.
    let streak_after = store
        .get_user_points(user_id)
        .await?
        .map_or(0, |l| l.current_streak);
    if streak_before < 3 && streak_after >= 3 {
        if let Some(result) = award_milestone_points(store, notifier, user_id, "day_3", tz).await?
        {
            total += result.points_awarded;
        }
    }
    if streak_before < 7 && streak_after >= 7 {
        if let Some(result) =
            award_milestone_points(store, notifier, user_id, "first_week", tz).await?
        {
            total += result.points_awarded;
        }
    }

    // Weight and protein notifications need the profile's targets.
    if body.weight_kg.is_some() || body.protein_grams.is_some() {
        if let Some(profile) = store.get_profile(user_id).await? {
            if let (Some(new_weight), Some(start), Some(target)) = (
                body.weight_kg,
                profile.starting_weight_kg,
                profile.target_weight_kg,
            ) {
                let previous_weight = previous.and_then(|l| l.weight_kg);
                if let Some(progress_kg) = notifications::crossed_weight_milestone(
                    start,
                    target,
                    previous_weight,
                    new_weight,
                ) {
                    notifier.send(Notification::WeightMilestone {
                        user_id,
                        progress_kg,
                    });
                }
            }

            if let (Some(protein_grams), Some(target_g)) =
                (log.protein_grams, profile.protein_target_g)
            {
                let previous_protein = previous.and_then(|l| l.protein_grams);
                if notifications::protein_goal_met(previous_protein, protein_grams, target_g) {
                    notifier.send(Notification::ProteinGoalMet {
                        user_id,
                        protein_grams,
                        target_g,
                    });
                }
            }
        }
    }

    Ok(total)
}

// ── Read surfaces ───────────────────────────────────────────────────────

pub async fn points_summary(store: &LogStore, user_id: Uuid) -> AppResult<PointsSummary> {
    let ledger = store.get_user_points(user_id).await?;

    let (lifetime, spendable, daily, weekly, monthly, current_streak, longest_streak) =
        match &ledger {
            Some(l) => (
                l.lifetime_points,
                l.spendable_points,
                l.daily_points,
                l.weekly_points,
                l.monthly_points,
                l.current_streak,
                l.longest_streak,
            ),
            None => (0, 0, 0, 0, 0, 0, 0),
        };

    Ok(PointsSummary {
        lifetime_points: lifetime,
        spendable_points: spendable,
        daily_points: daily,
        weekly_points: weekly,
        monthly_points: monthly,
        current_streak,
        longest_streak,
        current_multiplier: streak_multiplier(current_streak),
        next_multiplier_info: next_multiplier_info(current_streak),
    })
}

pub async fn leaderboard(
    store: &LogStore,
    period: LeaderboardPeriod,
    limit: i64,
) -> AppResult<Vec<LeaderboardEntry>> {
    let rows = store.get_leaderboard(period, limit).await?;

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i as i64 + 1,
            user_id: row.user_id,
            display_name: row.display_name,
            points: row.points,
        })
        .collect())
}
