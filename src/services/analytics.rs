//! Workout analytics: pure, read-only reducers over a window of daily and
//! exercise logs. Nothing here writes.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::daily_log::DailyLog;
use crate::models::exercise_log::ExerciseLog;
use crate::store::LogStore;

/// Sessions needed before a progress trend can be classified.
const TREND_MIN_SESSIONS: usize = 6;
/// Relative change in mean best weight that counts as a trend.
const TREND_THRESHOLD: f64 = 0.05;
/// Progress output is capped to the most-trained exercises.
const PROGRESS_MAX_EXERCISES: usize = 10;
const PROGRESS_RECENT_SAMPLES: usize = 5;

/// Exercise name → muscle group. Exact match first, then substring in
/// either direction; everything else lands in "other".
const MUSCLE_GROUP_TABLE: &[(&str, &str)] = &[
    ("bench press", "chest"),
    ("incline bench press", "chest"),
    ("incline dumbbell press", "chest"),
    ("chest fly", "chest"),
    ("push-up", "chest"),
    ("dip", "chest"),
    ("squat", "legs"),
    ("front squat", "legs"),
    ("leg press", "legs"),
    ("lunge", "legs"),
    ("leg extension", "legs"),
    ("leg curl", "legs"),
    ("calf raise", "legs"),
    ("romanian deadlift", "legs"),
    ("hip thrust", "legs"),
    ("deadlift", "back"),
    ("barbell row", "back"),
    ("dumbbell row", "back"),
    ("pull-up", "back"),
    ("chin-up", "back"),
    ("lat pulldown", "back"),
    ("seated row", "back"),
    ("overhead press", "shoulders"),
    ("shoulder press", "shoulders"),
    ("lateral raise", "shoulders"),
    ("rear delt fly", "shoulders"),
    ("face pull", "shoulders"),
    ("bicep curl", "arms"),
    ("hammer curl", "arms"),
    ("preacher curl", "arms"),
    ("tricep extension", "arms"),
    ("tricep pushdown", "arms"),
    ("skullcrusher", "arms"),
    ("plank", "core"),
    ("crunch", "core"),
    ("hanging leg raise", "core"),
    ("russian twist", "core"),
    ("ab wheel", "core"),
];

#[derive(Debug, Serialize)]
pub struct WorkoutSummary {
    pub total_workouts: usize,
    pub workouts_this_week: usize,
    pub workouts_this_month: usize,
    pub avg_workouts_per_week: f64,
    pub favorite_workout_type: String,
    pub total_volume_kg: f64,
}

#[derive(Debug, Serialize)]
pub struct WeeklyTrend {
    pub week_start: NaiveDate,
    pub workouts: usize,
    pub total_volume_kg: f64,
    pub avg_duration_minutes: f64,
}

#[derive(Debug, Serialize)]
pub struct MuscleGroupStat {
    pub muscle_group: String,
    pub sessions: usize,
    pub days_since_trained: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProgressTrend {
    Improving,
    Maintaining,
    Declining,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProgressSample {
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub reps: i32,
}

#[derive(Debug, Serialize)]
pub struct ExerciseProgress {
    pub exercise_name: String,
    pub best_weight_kg: f64,
    pub best_reps: i32,
    pub total_sets: i32,
    pub trend: ProgressTrend,
    pub recent_sessions: Vec<ProgressSample>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutStreaks {
    pub current_streak: i32,
    pub longest_streak: i32,
}

#[derive(Debug, Serialize)]
pub struct WorkoutAnalytics {
    pub summary: WorkoutSummary,
    pub weekly_trends: Vec<WeeklyTrend>,
    pub muscle_group_frequency: Vec<MuscleGroupStat>,
    pub exercise_progress: Vec<ExerciseProgress>,
    pub streaks: WorkoutStreaks,
}

// ── Volume ──────────────────────────────────────────────────────────────

/// Σ(reps × weight) over the recorded sets. Bodyweight sets count with
/// weight 1 so reps still contribute. Without structured set data the
/// volume is estimated as completed sets × first prescribed rep count.
pub fn session_volume(log: &ExerciseLog) -> f64 {
    if log.set_details.is_empty() {
        let reps = log
            .prescribed_reps
            .as_deref()
            .and_then(first_number)
            .unwrap_or(0);
        return (log.completed_sets * reps) as f64;
    }

    log.set_details
        .iter()
        .map(|set| set.reps as f64 * set.weight_kg.unwrap_or(1.0))
        .sum()
}

/// Leading integer of a rep prescription like "8-12" or "5x5".
fn first_number(text: &str) -> Option<i32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// ── Summary ─────────────────────────────────────────────────────────────

pub fn calculate_summary(
    daily_logs: &[DailyLog],
    exercise_logs: &[ExerciseLog],
    today: NaiveDate,
) -> WorkoutSummary {
    let workout_days: Vec<&DailyLog> = daily_logs.iter().filter(|l| l.workout_completed).collect();

    let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let month_start = today.with_day(1).unwrap_or(today);

    let workouts_this_week = workout_days
        .iter()
        .filter(|l| l.log_date >= week_start)
        .count();
    let workouts_this_month = workout_days
        .iter()
        .filter(|l| l.log_date >= month_start)
        .count();

    // Average over the observed span of the log window, not calendar weeks.
    let avg_workouts_per_week = match (
        daily_logs.iter().map(|l| l.log_date).min(),
        daily_logs.iter().map(|l| l.log_date).max(),
    ) {
        (Some(first), Some(last)) => {
            let span_days = (last - first).num_days() + 1;
            workout_days.len() as f64 / (span_days as f64 / 7.0)
        }
        _ => 0.0,
    };

    let mut type_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for log in &workout_days {
        if let Some(kind) = log.workout_type.as_deref() {
            *type_counts.entry(kind).or_default() += 1;
        }
    }
    let favorite_workout_type = type_counts
        .iter()
        .max_by_key(|(_, count)| **count)
        .map_or_else(|| "none".to_owned(), |(kind, _)| (*kind).to_owned());

    let total_volume_kg = exercise_logs.iter().map(session_volume).sum();

    WorkoutSummary {
        total_workouts: workout_days.len(),
        workouts_this_week,
        workouts_this_month,
        avg_workouts_per_week,
        favorite_workout_type,
        total_volume_kg,
    }
}

// ── Weekly trends ───────────────────────────────────────────────────────

fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The most recent `weeks` ISO weeks (Monday-anchored), oldest first.
/// Weeks without data appear with zeroed values.
pub fn weekly_trends(
    daily_logs: &[DailyLog],
    exercise_logs: &[ExerciseLog],
    weeks: usize,
    today: NaiveDate,
) -> Vec<WeeklyTrend> {
    let current_week = week_start_of(today);

    (0..weeks)
        .rev()
        .map(|back| {
            let week_start = current_week - Duration::days(7 * back as i64);
            let week_end = week_start + Duration::days(6);
            let in_week = |date: NaiveDate| date >= week_start && date <= week_end;

            let workouts = daily_logs
                .iter()
                .filter(|l| l.workout_completed && in_week(l.log_date))
                .count();

            let total_volume_kg = exercise_logs
                .iter()
                .filter(|l| in_week(l.log_date))
                .map(session_volume)
                .sum();

            let durations: Vec<f64> = daily_logs
                .iter()
                .filter(|l| in_week(l.log_date))
                .filter_map(|l| l.workout_duration_minutes.map(f64::from))
                .collect();
            let avg_duration_minutes = if durations.is_empty() {
                0.0
            } else {
                durations.iter().sum::<f64>() / durations.len() as f64
            };

            WeeklyTrend {
                week_start,
                workouts,
                total_volume_kg,
                avg_duration_minutes,
            }
        })
        .collect()
}

// ── Muscle groups ───────────────────────────────────────────────────────

pub fn classify_muscle_group(exercise_name: &str) -> &'static str {
    let needle = exercise_name.trim().to_lowercase();

    if let Some((_, group)) = MUSCLE_GROUP_TABLE.iter().find(|(name, _)| *name == needle) {
        return group;
    }

    // Heuristic fallback: a known name contained in the logged one
    // ("paused bench press") or the logged one contained in a known name
    // ("bench").
    if let Some((_, group)) = MUSCLE_GROUP_TABLE
        .iter()
        .find(|(name, _)| needle.contains(name) || name.contains(needle.as_str()))
    {
        return group;
    }

    "other"
}

pub fn muscle_group_frequency(
    exercise_logs: &[ExerciseLog],
    today: NaiveDate,
) -> Vec<MuscleGroupStat> {
    let mut groups: BTreeMap<&'static str, (usize, NaiveDate)> = BTreeMap::new();

    for log in exercise_logs {
        let group = classify_muscle_group(&log.exercise_name);
        let entry = groups.entry(group).or_insert((0, log.log_date));
        entry.0 += 1;
        entry.1 = entry.1.max(log.log_date);
    }

    let mut stats: Vec<MuscleGroupStat> = groups
        .into_iter()
        .map(|(group, (sessions, last_trained))| MuscleGroupStat {
            muscle_group: group.to_owned(),
            sessions,
            days_since_trained: (today - last_trained).num_days().max(0),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.sessions
            .cmp(&a.sessions)
            .then(a.muscle_group.cmp(&b.muscle_group))
    });
    stats
}

// ── Exercise progress ───────────────────────────────────────────────────

struct Session {
    date: NaiveDate,
    best_weight: f64,
    best_reps: i32,
    completed_sets: i32,
}

fn session_of(log: &ExerciseLog) -> Session {
    let best_weight = log
        .set_details
        .iter()
        .filter_map(|s| s.weight_kg)
        .fold(0.0_f64, f64::max);
    let best_reps = log.set_details.iter().map(|s| s.reps).max().unwrap_or(0);
    Session {
        date: log.log_date,
        best_weight,
        best_reps,
        completed_sets: log.completed_sets,
    }
}

fn classify_trend(sessions: &[Session]) -> ProgressTrend {
    if sessions.len() < TREND_MIN_SESSIONS {
        return ProgressTrend::Maintaining;
    }

    // Sessions are ascending by date; compare the latest 3 against the 3
    // before them.
    let recent = &sessions[sessions.len() - 3..];
    let prior = &sessions[sessions.len() - 6..sessions.len() - 3];

    let mean = |chunk: &[Session]| {
        chunk.iter().map(|s| s.best_weight).sum::<f64>() / chunk.len() as f64
    };
    let recent_mean = mean(recent);
    let prior_mean = mean(prior);

    if prior_mean <= 0.0 {
        return ProgressTrend::Maintaining;
    }

    let change = (recent_mean - prior_mean) / prior_mean;
    if change > TREND_THRESHOLD {
        ProgressTrend::Improving
    } else if change < -TREND_THRESHOLD {
        ProgressTrend::Declining
    } else {
        ProgressTrend::Maintaining
    }
}

/// Per-exercise progress over the window. Exercises seen fewer than twice
/// are dropped; the result keeps the top 10 by total completed sets.
pub fn exercise_progress(exercise_logs: &[ExerciseLog]) -> Vec<ExerciseProgress> {
    let mut by_name: BTreeMap<&str, Vec<Session>> = BTreeMap::new();
    for log in exercise_logs {
        by_name
            .entry(log.exercise_name.as_str())
            .or_default()
            .push(session_of(log));
    }

    let mut progress: Vec<ExerciseProgress> = by_name
        .into_iter()
        .filter(|(_, sessions)| sessions.len() >= 2)
        .map(|(name, mut sessions)| {
            sessions.sort_by_key(|s| s.date);

            let best_weight_kg = sessions.iter().map(|s| s.best_weight).fold(0.0_f64, f64::max);
            let best_reps = sessions.iter().map(|s| s.best_reps).max().unwrap_or(0);
            let total_sets = sessions.iter().map(|s| s.completed_sets).sum();
            let trend = classify_trend(&sessions);

            let recent_sessions = sessions
                .iter()
                .rev()
                .take(PROGRESS_RECENT_SAMPLES)
                .map(|s| ProgressSample {
                    date: s.date,
                    weight_kg: s.best_weight,
                    reps: s.best_reps,
                })
                .collect();

            ExerciseProgress {
                exercise_name: name.to_owned(),
                best_weight_kg,
                best_reps,
                total_sets,
                trend,
                recent_sessions,
            }
        })
        .collect();

    progress.sort_by(|a, b| {
        b.total_sets
            .cmp(&a.total_sets)
            .then(a.exercise_name.cmp(&b.exercise_name))
    });
    progress.truncate(PROGRESS_MAX_EXERCISES);
    progress
}

// ── Streaks ─────────────────────────────────────────────────────────────

/// Workout-completion streaks, independent of the points streak. The
/// longest streak walks the full ascending history with strict 1-day
/// adjacency; the current streak is the trailing contiguous run and only
/// counts while its newest day is today or yesterday.
pub fn calculate_streaks(daily_logs: &[DailyLog], today: NaiveDate) -> WorkoutStreaks {
    let mut dates: Vec<NaiveDate> = daily_logs
        .iter()
        .filter(|l| l.workout_completed)
        .map(|l| l.log_date)
        .collect();
    dates.sort_unstable();
    dates.dedup();

    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for date in &dates {
        match prev {
            Some(p) if *date == p + Duration::days(1) => run += 1,
            _ => {
                longest = longest.max(run);
                run = 1;
            }
        }
        prev = Some(*date);
    }
    longest = longest.max(run);

    let mut current = 0;
    if let Some(&last) = dates.last() {
        if (today - last).num_days() <= 1 {
            current = 1;
            for pair in dates.windows(2).rev() {
                if pair[1] == pair[0] + Duration::days(1) {
                    current += 1;
                } else {
                    break;
                }
            }
        }
    }

    WorkoutStreaks {
        current_streak: current,
        longest_streak: longest,
    }
}

// ── Orchestration ───────────────────────────────────────────────────────

pub async fn workout_analytics(
    store: &LogStore,
    user_id: Uuid,
    window_days: i64,
    trend_weeks: usize,
) -> AppResult<WorkoutAnalytics> {
    let today = Utc::now().date_naive();
    let window_start = today - Duration::days(window_days);

    let daily_logs = store.get_daily_logs(user_id, window_start, today).await?;
    let exercise_logs = store
        .get_exercise_logs_range(user_id, window_start, today)
        .await?;

    Ok(WorkoutAnalytics {
        summary: calculate_summary(&daily_logs, &exercise_logs, today),
        weekly_trends: weekly_trends(&daily_logs, &exercise_logs, trend_weeks, today),
        muscle_group_frequency: muscle_group_frequency(&exercise_logs, today),
        exercise_progress: exercise_progress(&exercise_logs),
        streaks: calculate_streaks(&daily_logs, today),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bodyweight_set, daily_log, exercise_log, set, workout_day};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_summary_is_zeroed() {
        let summary = calculate_summary(&[], &[], date("2025-06-10"));
        assert_eq!(summary.total_workouts, 0);
        assert_eq!(summary.workouts_this_week, 0);
        assert_eq!(summary.workouts_this_month, 0);
        assert_eq!(summary.avg_workouts_per_week, 0.0);
        assert_eq!(summary.favorite_workout_type, "none");
        assert_eq!(summary.total_volume_kg, 0.0);
    }

    #[test]
    fn test_summary_counts_and_favorite_type() {
        let today = date("2025-06-11"); // Wednesday
        let mut logs = vec![
            workout_day(date("2025-06-09")), // this week (Mon)
            workout_day(date("2025-06-04")), // this month
            workout_day(date("2025-05-28")),
            daily_log(date("2025-06-10")), // rest day
        ];
        logs[0].workout_type = Some("push".into());
        logs[1].workout_type = Some("push".into());
        logs[2].workout_type = Some("legs".into());

        let summary = calculate_summary(&logs, &[], today);
        assert_eq!(summary.total_workouts, 3);
        assert_eq!(summary.workouts_this_week, 1);
        assert_eq!(summary.workouts_this_month, 2);
        assert_eq!(summary.favorite_workout_type, "push");

        // 3 workouts over a 14-day observed span
        let expected = 3.0 / (14.0 / 7.0);
        assert!((summary.avg_workouts_per_week - expected).abs() < 1e-9);
    }

    #[test]
    fn test_session_volume_round_trip() {
        let log = exercise_log(
            "Bench Press",
            date("2025-06-09"),
            vec![set(10, 50.0), set(8, 52.5)],
        );
        assert_eq!(session_volume(&log), 10.0 * 50.0 + 8.0 * 52.5);

        let session = session_of(&log);
        assert_eq!(session.best_weight, 52.5);
        assert_eq!(session.best_reps, 10);
    }

    #[test]
    fn test_session_volume_bodyweight_uses_weight_one() {
        let log = exercise_log(
            "Pull-Up",
            date("2025-06-09"),
            vec![bodyweight_set(12), bodyweight_set(10)],
        );
        assert_eq!(session_volume(&log), 22.0);
    }

    #[test]
    fn test_session_volume_estimated_from_prescription() {
        let mut log = exercise_log("Squat", date("2025-06-09"), vec![]);
        log.completed_sets = 3;
        log.prescribed_reps = Some("8-12".into());
        assert_eq!(session_volume(&log), 24.0);

        log.prescribed_reps = None;
        assert_eq!(session_volume(&log), 0.0);
    }

    #[test]
    fn test_first_number_parses_leading_digits() {
        assert_eq!(first_number("8-12"), Some(8));
        assert_eq!(first_number("10"), Some(10));
        assert_eq!(first_number(" 5x5"), Some(5));
        assert_eq!(first_number("AMRAP"), None);
    }

    #[test]
    fn test_muscle_group_exact_and_fallback() {
        assert_eq!(classify_muscle_group("Bench Press"), "chest");
        // substring: known name inside the logged name
        assert_eq!(classify_muscle_group("Paused Bench Press"), "chest");
        // substring: logged name inside a known name
        assert_eq!(classify_muscle_group("pulldown"), "back");
        assert_eq!(classify_muscle_group("Underwater Basket Weaving"), "other");
    }

    #[test]
    fn test_muscle_group_frequency_counts_and_recency() {
        let logs = vec![
            exercise_log("Bench Press", date("2025-06-01"), vec![set(5, 100.0)]),
            exercise_log("Bench Press", date("2025-06-08"), vec![set(5, 100.0)]),
            exercise_log("Squat", date("2025-06-05"), vec![set(5, 140.0)]),
        ];
        let stats = muscle_group_frequency(&logs, date("2025-06-10"));

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].muscle_group, "chest");
        assert_eq!(stats[0].sessions, 2);
        assert_eq!(stats[0].days_since_trained, 2);
        assert_eq!(stats[1].muscle_group, "legs");
        assert_eq!(stats[1].days_since_trained, 5);
    }

    #[test]
    fn test_exercise_progress_excludes_single_sessions() {
        let logs = vec![
            exercise_log("Deadlift", date("2025-06-01"), vec![set(5, 180.0)]),
            exercise_log("Bench Press", date("2025-06-01"), vec![set(5, 95.0)]),
            exercise_log("Bench Press", date("2025-06-05"), vec![set(5, 100.0)]),
        ];
        let progress = exercise_progress(&logs);
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].exercise_name, "Bench Press");
        assert_eq!(progress[0].best_weight_kg, 100.0);
        assert_eq!(progress[0].total_sets, 2);
        assert_eq!(progress[0].trend, ProgressTrend::Maintaining);
    }

    #[test]
    fn test_exercise_progress_trend_classification() {
        // Six sessions: prior mean 100, recent mean 106 -> +6% improving.
        let weights = [100.0, 100.0, 100.0, 106.0, 106.0, 106.0];
        let logs: Vec<ExerciseLog> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| {
                exercise_log(
                    "Squat",
                    date("2025-05-01") + Duration::days(i as i64 * 3),
                    vec![set(5, *w)],
                )
            })
            .collect();
        assert_eq!(exercise_progress(&logs)[0].trend, ProgressTrend::Improving);

        // -6% declining
        let logs: Vec<ExerciseLog> = weights
            .iter()
            .rev()
            .enumerate()
            .map(|(i, w)| {
                exercise_log(
                    "Squat",
                    date("2025-05-01") + Duration::days(i as i64 * 3),
                    vec![set(5, *w)],
                )
            })
            .collect();
        assert_eq!(exercise_progress(&logs)[0].trend, ProgressTrend::Declining);

        // +4% stays maintaining
        let flat = [100.0, 100.0, 100.0, 104.0, 104.0, 104.0];
        let logs: Vec<ExerciseLog> = flat
            .iter()
            .enumerate()
            .map(|(i, w)| {
                exercise_log(
                    "Squat",
                    date("2025-05-01") + Duration::days(i as i64 * 3),
                    vec![set(5, *w)],
                )
            })
            .collect();
        assert_eq!(exercise_progress(&logs)[0].trend, ProgressTrend::Maintaining);
    }

    #[test]
    fn test_exercise_progress_recent_sample_cap() {
        let logs: Vec<ExerciseLog> = (0..8)
            .map(|i| {
                exercise_log(
                    "Bench Press",
                    date("2025-05-01") + Duration::days(i * 2),
                    vec![set(5, 90.0 + i as f64)],
                )
            })
            .collect();
        let progress = exercise_progress(&logs);
        assert_eq!(progress[0].recent_sessions.len(), 5);
        // Most recent first
        assert_eq!(progress[0].recent_sessions[0].date, date("2025-05-15"));
        assert_eq!(progress[0].recent_sessions[0].weight_kg, 97.0);
    }

    #[test]
    fn test_streaks_with_gap() {
        let today = date("2025-06-04");
        let logs = vec![
            workout_day(date("2025-06-01")),
            workout_day(date("2025-06-02")),
            workout_day(date("2025-06-04")),
        ];
        let streaks = calculate_streaks(&logs, today);
        assert_eq!(streaks.current_streak, 1, "gap at June 3 breaks the trailing run");
        assert_eq!(streaks.longest_streak, 2);
    }

    #[test]
    fn test_current_streak_allows_yesterday_anchor() {
        let logs = vec![
            workout_day(date("2025-06-01")),
            workout_day(date("2025-06-02")),
            workout_day(date("2025-06-03")),
        ];
        let streaks = calculate_streaks(&logs, date("2025-06-04"));
        assert_eq!(streaks.current_streak, 3);

        let streaks = calculate_streaks(&logs, date("2025-06-05"));
        assert_eq!(streaks.current_streak, 0, "two days idle ends the current streak");
        assert_eq!(streaks.longest_streak, 3);
    }

    #[test]
    fn test_streaks_ignore_rest_days() {
        let mut rest = daily_log(date("2025-06-02"));
        rest.workout_completed = false;
        let logs = vec![workout_day(date("2025-06-01")), rest, workout_day(date("2025-06-03"))];
        let streaks = calculate_streaks(&logs, date("2025-06-03"));
        assert_eq!(streaks.longest_streak, 1);
        assert_eq!(streaks.current_streak, 1);
    }

    #[test]
    fn test_weekly_trends_buckets() {
        let today = date("2025-06-11"); // Wednesday, week starts Mon Jun 9
        let mut monday = workout_day(date("2025-06-09"));
        monday.workout_duration_minutes = Some(60);
        let mut last_week = workout_day(date("2025-06-03"));
        last_week.workout_duration_minutes = Some(30);

        let daily = vec![monday, last_week];
        let exercises = vec![exercise_log("Squat", date("2025-06-09"), vec![set(5, 100.0)])];

        let trends = weekly_trends(&daily, &exercises, 3, today);
        assert_eq!(trends.len(), 3);
        // Oldest first
        assert_eq!(trends[0].week_start, date("2025-05-26"));
        assert_eq!(trends[0].workouts, 0);
        assert_eq!(trends[1].week_start, date("2025-06-02"));
        assert_eq!(trends[1].workouts, 1);
        assert_eq!(trends[1].avg_duration_minutes, 30.0);
        assert_eq!(trends[2].week_start, date("2025-06-09"));
        assert_eq!(trends[2].workouts, 1);
        assert_eq!(trends[2].total_volume_kg, 500.0);
        assert_eq!(trends[2].avg_duration_minutes, 60.0);
    }

    #[test]
    fn test_weekly_trend_buckets_cross_year_boundary() {
        // Jan 1 2025 is a Wednesday; its ISO week starts Mon Dec 30 2024.
        let trends = weekly_trends(&[], &[], 2, date("2025-01-01"));
        assert_eq!(trends[1].week_start, date("2024-12-30"));
        assert_eq!(trends[0].week_start, date("2024-12-23"));
    }
}
