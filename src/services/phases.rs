//! Phase transition evaluator: biofeedback score and weight/adherence
//! trends over a trailing window, feeding a guarded four-state machine
//! that recommends and executes coaching-phase changes.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::daily_log::DailyLog;
use crate::models::profile::{ActivityLevel, CoachingPhase, NutritionTargets, Profile, Sex};
use crate::services::notifications::{Notification, Notifier};
use crate::store::LogStore;

// Guard thresholds for phase readiness.
const MIN_RECOVERY_WEEKS: i64 = 8;
const FORCED_TRANSITION_WEEKS: i64 = 12;
const EXTENDED_RECOMP_WEEKS: i64 = 16;
const RECOVERY_EXIT_SCORE: f64 = 6.5;
const RECOMP_EXIT_SCORE: f64 = 7.0;
const CUTTING_FATIGUE_SCORE: f64 = 5.0;
const WEIGHT_TREND_THRESHOLD_KG: f64 = 0.3;
const WEIGHT_TREND_MAX_ENTRIES: usize = 14;
const ADHERENCE_TOLERANCE: f64 = 0.10;

// BMR fallbacks when the profile is incomplete.
const DEFAULT_AGE: i32 = 45;
const DEFAULT_HEIGHT_CM: f64 = 170.0;
const DEFAULT_WEIGHT_KG: f64 = 80.0;

const PROTEIN_G_PER_KG: f64 = 1.8;
const FAT_G_PER_KG: f64 = 0.8;
const MIN_CARBS_G: i32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeightTrend {
    Gaining,
    Losing,
    Stable,
}

#[derive(Debug, Serialize)]
pub struct PhaseMetrics {
    pub weight_trend: WeightTrend,
    pub calorie_adherence: f64,
    pub avg_energy: Option<f64>,
    pub avg_stress: Option<f64>,
    pub current_weight_kg: Option<f64>,
    pub logged_days: usize,
}

#[derive(Debug, Serialize)]
pub struct PhaseEvaluation {
    pub current_phase: CoachingPhase,
    pub weeks_in_phase: i64,
    pub ready_for_transition: bool,
    pub suggested_phase: Option<CoachingPhase>,
    /// True when readiness came from a time-limit rule rather than the
    /// biofeedback/weight guards; forced transitions keep maintenance
    /// calories.
    pub forced: bool,
    pub reason: String,
    pub biofeedback_score: f64,
    pub metrics: PhaseMetrics,
}

#[derive(Debug, Serialize)]
pub struct PhaseTransitionResult {
    pub previous_phase: CoachingPhase,
    pub new_phase: CoachingPhase,
    pub phase_start_date: chrono::NaiveDate,
    pub targets: NutritionTargets,
}

#[derive(Debug)]
pub struct TransitionCheck {
    pub ready: bool,
    pub suggested: Option<CoachingPhase>,
    pub forced: bool,
    pub reason: String,
}

// ── Pure window reducers ────────────────────────────────────────────────

/// Mean over every present sample of energy, sleep quality, mood and
/// inverted stress across the window. 5.0 when no samples exist.
pub fn biofeedback_score(logs: &[DailyLog]) -> f64 {
    let mut samples: Vec<f64> = Vec::new();
    for log in logs {
        if let Some(energy) = log.energy_level {
            samples.push(energy as f64);
        }
        if let Some(sleep) = log.sleep_quality {
            samples.push(sleep as f64);
        }
        if let Some(mood) = log.mood_rating {
            samples.push(mood as f64);
        }
        if let Some(stress) = log.stress_level {
            samples.push((11 - stress) as f64);
        }
    }
    if samples.is_empty() {
        return 5.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Compare the mean of the most recent 3 weighed entries against the mean
/// of the oldest 3, within the last 14 weighed entries. Expects logs in
/// descending date order (as the store returns them).
pub fn weight_trend(logs: &[DailyLog]) -> WeightTrend {
    let weights: Vec<f64> = logs
        .iter()
        .filter_map(|l| l.weight_kg)
        .take(WEIGHT_TREND_MAX_ENTRIES)
        .collect();

    if weights.len() < 2 {
        return WeightTrend::Stable;
    }

    let ends = weights.len().min(3);
    let recent: f64 = weights[..ends].iter().sum::<f64>() / ends as f64;
    let oldest: f64 = weights[weights.len() - ends..].iter().sum::<f64>() / ends as f64;

    let diff = recent - oldest;
    if diff > WEIGHT_TREND_THRESHOLD_KG {
        WeightTrend::Gaining
    } else if diff < -WEIGHT_TREND_THRESHOLD_KG {
        WeightTrend::Losing
    } else {
        WeightTrend::Stable
    }
}

/// Percentage of calorie-logged days within 10% of the target.
pub fn calorie_adherence(logs: &[DailyLog], calorie_target: Option<i32>) -> f64 {
    let Some(target) = calorie_target.filter(|t| *t > 0) else {
        return 0.0;
    };

    let logged: Vec<i32> = logs.iter().filter_map(|l| l.calories_consumed).collect();
    if logged.is_empty() {
        return 0.0;
    }

    let tolerance = target as f64 * ADHERENCE_TOLERANCE;
    let within = logged
        .iter()
        .filter(|c| ((**c - target) as f64).abs() <= tolerance)
        .count();

    within as f64 / logged.len() as f64 * 100.0
}

fn average_of(logs: &[DailyLog], field: impl Fn(&DailyLog) -> Option<i32>) -> Option<f64> {
    let values: Vec<f64> = logs.iter().filter_map(|l| field(l).map(f64::from)).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// The one legal successor of each phase in the cycle.
pub fn next_phase(phase: CoachingPhase) -> CoachingPhase {
    match phase {
        CoachingPhase::Assessment => CoachingPhase::Recovery,
        CoachingPhase::Recovery => CoachingPhase::Recomp,
        CoachingPhase::Recomp => CoachingPhase::Cutting,
        CoachingPhase::Cutting => CoachingPhase::Recovery,
    }
}

/// Phase-specific guard rules.
pub fn check_transition(
    phase: CoachingPhase,
    weeks_in_phase: i64,
    score: f64,
    current_weight_kg: Option<f64>,
    target_weight_kg: Option<f64>,
    avg_stress: Option<f64>,
    avg_energy: Option<f64>,
) -> TransitionCheck {
    match phase {
        CoachingPhase::Assessment => TransitionCheck {
            ready: true,
            suggested: Some(CoachingPhase::Recovery),
            forced: false,
            reason: "Assessment complete, ready to start the recovery phase".into(),
        },

        CoachingPhase::Recovery => {
            if weeks_in_phase >= FORCED_TRANSITION_WEEKS {
                TransitionCheck {
                    ready: true,
                    suggested: Some(CoachingPhase::Recomp),
                    forced: true,
                    reason: format!(
                        "{weeks_in_phase} weeks in recovery reached the 12-week limit"
                    ),
                }
            } else if weeks_in_phase >= MIN_RECOVERY_WEEKS && score >= RECOVERY_EXIT_SCORE {
                TransitionCheck {
                    ready: true,
                    suggested: Some(CoachingPhase::Recomp),
                    forced: false,
                    reason: format!(
                        "Biofeedback score {score:.1} after {weeks_in_phase} weeks indicates full recovery"
                    ),
                }
            } else if weeks_in_phase < MIN_RECOVERY_WEEKS {
                TransitionCheck {
                    ready: false,
                    suggested: None,
                    forced: false,
                    reason: format!(
                        "Only {weeks_in_phase} of the minimum {MIN_RECOVERY_WEEKS} recovery weeks completed"
                    ),
                }
            } else {
                TransitionCheck {
                    ready: false,
                    suggested: None,
                    forced: false,
                    reason: format!(
                        "Biofeedback score {score:.1} is below the {RECOVERY_EXIT_SCORE} needed to leave recovery"
                    ),
                }
            }
        }

        CoachingPhase::Recomp => {
            let above_target = match (current_weight_kg, target_weight_kg) {
                (Some(current), Some(target)) => current > target + 2.0,
                _ => false,
            };

            if weeks_in_phase >= FORCED_TRANSITION_WEEKS && above_target {
                TransitionCheck {
                    ready: true,
                    suggested: Some(CoachingPhase::Cutting),
                    forced: false,
                    reason: format!(
                        "Still more than 2 kg above target after {weeks_in_phase} weeks of recomp"
                    ),
                }
            } else if weeks_in_phase >= EXTENDED_RECOMP_WEEKS && score >= RECOMP_EXIT_SCORE {
                TransitionCheck {
                    ready: true,
                    suggested: Some(CoachingPhase::Cutting),
                    forced: false,
                    reason: format!(
                        "Extended recomp ({weeks_in_phase} weeks) with strong biofeedback {score:.1}"
                    ),
                }
            } else {
                TransitionCheck {
                    ready: false,
                    suggested: None,
                    forced: false,
                    reason: format!(
                        "Recomp is progressing ({weeks_in_phase} weeks in); conditions for cutting not met"
                    ),
                }
            }
        }

        CoachingPhase::Cutting => {
            let overstressed = matches!(
                (avg_stress, avg_energy),
                (Some(stress), Some(energy)) if stress > 7.0 && energy < 5.0
            );

            if weeks_in_phase >= FORCED_TRANSITION_WEEKS {
                TransitionCheck {
                    ready: true,
                    suggested: Some(CoachingPhase::Recovery),
                    forced: true,
                    reason: format!(
                        "{weeks_in_phase} weeks of cutting reached the 12-week limit"
                    ),
                }
            } else if weeks_in_phase >= MIN_RECOVERY_WEEKS && score < CUTTING_FATIGUE_SCORE {
                TransitionCheck {
                    ready: true,
                    suggested: Some(CoachingPhase::Recovery),
                    forced: false,
                    reason: format!(
                        "Biofeedback score {score:.1} shows accumulating fatigue after {weeks_in_phase} weeks"
                    ),
                }
            } else if overstressed {
                TransitionCheck {
                    ready: true,
                    suggested: Some(CoachingPhase::Recovery),
                    forced: false,
                    reason: "High stress and low energy call for a recovery break".into(),
                }
            } else {
                TransitionCheck {
                    ready: false,
                    suggested: None,
                    forced: false,
                    reason: format!(
                        "Cutting is sustainable ({weeks_in_phase} weeks in, biofeedback {score:.1})"
                    ),
                }
            }
        }
    }
}

// ── Nutrition target recomputation ──────────────────────────────────────

pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age: i32, sex: Sex) -> f64 {
    let sex_constant = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64 + sex_constant
}

pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::LightlyActive => 1.375,
        ActivityLevel::ModeratelyActive => 1.55,
        ActivityLevel::VeryActive => 1.725,
    }
}

/// Recompute targets for the destination phase. Missing profile fields use
/// the neutral defaults; the calorie floor is 85% of BMR.
pub fn nutrition_targets_for(
    profile: &Profile,
    new_phase: CoachingPhase,
    forced: bool,
) -> NutritionTargets {
    let weight = profile.current_weight_kg.unwrap_or(DEFAULT_WEIGHT_KG);
    let height = profile.height_cm.unwrap_or(DEFAULT_HEIGHT_CM);
    let age = profile.age.unwrap_or(DEFAULT_AGE);
    let sex = profile.sex.unwrap_or(Sex::Male);
    let level = profile.activity_level.unwrap_or(ActivityLevel::Sedentary);

    let bmr = mifflin_st_jeor(weight, height, age, sex);
    let tdee = bmr * activity_multiplier(level);

    let adjustment = if forced {
        1.0
    } else {
        match new_phase {
            CoachingPhase::Cutting => 0.85,
            CoachingPhase::Recomp => 0.95,
            CoachingPhase::Recovery | CoachingPhase::Assessment => 1.0,
        }
    };

    let calories = (tdee * adjustment).max(bmr * 0.85);
    let protein_g = (weight * PROTEIN_G_PER_KG).round() as i32;
    let fat_g = (weight * FAT_G_PER_KG).round() as i32;
    let remaining = calories - (protein_g * 4 + fat_g * 9) as f64;
    let carbs_g = ((remaining / 4.0).round() as i32).max(MIN_CARBS_G);

    NutritionTargets {
        calories: calories.round() as i32,
        protein_g,
        carbs_g,
        fat_g,
    }
}

// ── Orchestration ───────────────────────────────────────────────────────

pub async fn evaluate_phase_transition(
    store: &LogStore,
    user_id: Uuid,
    window_days: i64,
) -> AppResult<PhaseEvaluation> {
    let profile = store
        .get_profile(user_id)
        .await?
        .ok_or(AppError::NotFound("Profile not found".into()))?;

    let today = Utc::now().date_naive();
    let window_start = today - Duration::days(window_days);
    let logs = store.get_daily_logs(user_id, window_start, today).await?;

    let weeks_in_phase = (today - profile.phase_start_date).num_days().max(0) / 7;
    let score = biofeedback_score(&logs);
    let trend = weight_trend(&logs);
    let adherence = calorie_adherence(&logs, profile.calorie_target);
    let avg_stress = average_of(&logs, |l| l.stress_level);
    let avg_energy = average_of(&logs, |l| l.energy_level);

    // Most recent weigh-in wins; the stored profile weight is the fallback.
    let current_weight_kg = logs
        .iter()
        .find_map(|l| l.weight_kg)
        .or(profile.current_weight_kg);

    let check = check_transition(
        profile.current_phase,
        weeks_in_phase,
        score,
        current_weight_kg,
        profile.target_weight_kg,
        avg_stress,
        avg_energy,
    );

    Ok(PhaseEvaluation {
        current_phase: profile.current_phase,
        weeks_in_phase,
        ready_for_transition: check.ready,
        suggested_phase: check.suggested,
        forced: check.forced,
        reason: check.reason,
        biofeedback_score: score,
        metrics: PhaseMetrics {
            weight_trend: trend,
            calorie_adherence: adherence,
            avg_energy,
            avg_stress,
            current_weight_kg,
            logged_days: logs.len(),
        },
    })
}

pub async fn execute_phase_transition(
    store: &LogStore,
    notifier: &Notifier,
    user_id: Uuid,
    new_phase: CoachingPhase,
    forced: bool,
) -> AppResult<PhaseTransitionResult> {
    let profile = store
        .get_profile(user_id)
        .await?
        .ok_or(AppError::NotFound("Profile not found".into()))?;

    if new_phase != next_phase(profile.current_phase) {
        return Err(AppError::Validation(format!(
            "Cannot transition from {} to {}",
            profile.current_phase, new_phase
        )));
    }

    let targets = nutrition_targets_for(&profile, new_phase, forced);
    let updated = store.set_phase(user_id, new_phase, targets).await?;

    notifier.send(Notification::PhaseChanged {
        user_id,
        from: profile.current_phase,
        to: new_phase,
        calorie_target: targets.calories,
    });

    tracing::info!(
        %user_id,
        from = %profile.current_phase,
        to = %new_phase,
        calories = targets.calories,
        "phase transition executed"
    );

    Ok(PhaseTransitionResult {
        previous_phase: profile.current_phase,
        new_phase,
        phase_start_date: updated.phase_start_date,
        targets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::daily_log;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_assessment_is_always_ready() {
        for weeks in [0, 1, 50] {
            let check = check_transition(
                CoachingPhase::Assessment,
                weeks,
                5.0,
                None,
                None,
                None,
                None,
            );
            assert!(check.ready);
            assert_eq!(check.suggested, Some(CoachingPhase::Recovery));
            assert!(!check.forced);
        }
    }

    #[test]
    fn test_recovery_guards() {
        // Too early regardless of score
        let check =
            check_transition(CoachingPhase::Recovery, 7, 9.0, None, None, None, None);
        assert!(!check.ready);

        // Old enough and recovered
        let check =
            check_transition(CoachingPhase::Recovery, 8, 6.5, None, None, None, None);
        assert!(check.ready);
        assert_eq!(check.suggested, Some(CoachingPhase::Recomp));
        assert!(!check.forced);

        // Old enough but not recovered
        let check =
            check_transition(CoachingPhase::Recovery, 8, 6.4, None, None, None, None);
        assert!(!check.ready);

        // Hard time limit overrides the score
        let check =
            check_transition(CoachingPhase::Recovery, 12, 2.0, None, None, None, None);
        assert!(check.ready);
        assert!(check.forced);
    }

    #[test]
    fn test_recomp_guards() {
        // 12 weeks + still >2 kg above target
        let check = check_transition(
            CoachingPhase::Recomp,
            12,
            5.0,
            Some(85.0),
            Some(82.0),
            None,
            None,
        );
        assert!(check.ready);
        assert_eq!(check.suggested, Some(CoachingPhase::Cutting));

        // Exactly 2 kg above is not enough
        let check = check_transition(
            CoachingPhase::Recomp,
            12,
            5.0,
            Some(84.0),
            Some(82.0),
            None,
            None,
        );
        assert!(!check.ready);

        // Extended recomp with strong biofeedback
        let check =
            check_transition(CoachingPhase::Recomp, 16, 7.0, None, None, None, None);
        assert!(check.ready);

        let check =
            check_transition(CoachingPhase::Recomp, 16, 6.9, None, None, None, None);
        assert!(!check.ready);
    }

    #[test]
    fn test_cutting_guards() {
        // Fatigue exit
        let check =
            check_transition(CoachingPhase::Cutting, 8, 4.9, None, None, None, None);
        assert!(check.ready);
        assert_eq!(check.suggested, Some(CoachingPhase::Recovery));

        let check =
            check_transition(CoachingPhase::Cutting, 8, 5.0, None, None, None, None);
        assert!(!check.ready);

        // Hard time limit
        let check =
            check_transition(CoachingPhase::Cutting, 12, 8.0, None, None, None, None);
        assert!(check.ready);
        assert!(check.forced);

        // Stress/energy override fires at any week count
        let check = check_transition(
            CoachingPhase::Cutting,
            2,
            6.0,
            None,
            None,
            Some(7.1),
            Some(4.9),
        );
        assert!(check.ready);
        assert!(!check.forced);
    }

    #[test]
    fn test_phase_cycle() {
        assert_eq!(next_phase(CoachingPhase::Assessment), CoachingPhase::Recovery);
        assert_eq!(next_phase(CoachingPhase::Recovery), CoachingPhase::Recomp);
        assert_eq!(next_phase(CoachingPhase::Recomp), CoachingPhase::Cutting);
        assert_eq!(next_phase(CoachingPhase::Cutting), CoachingPhase::Recovery);
    }

    #[test]
    fn test_biofeedback_score_defaults_to_five() {
        assert_eq!(biofeedback_score(&[]), 5.0);

        let log = daily_log(date("2025-03-01"));
        assert_eq!(biofeedback_score(&[log]), 5.0, "log without samples contributes nothing");
    }

    #[test]
    fn test_biofeedback_score_pools_all_samples() {
        let mut log = daily_log(date("2025-03-01"));
        log.energy_level = Some(8);
        log.stress_level = Some(3); // contributes 11 - 3 = 8

        let mut other = daily_log(date("2025-03-02"));
        other.sleep_quality = Some(6);
        other.mood_rating = Some(6);

        let score = biofeedback_score(&[log, other]);
        assert!((score - 7.0).abs() < 1e-9, "expected 7.0, got {score}");
    }

    #[test]
    fn test_weight_trend_needs_two_entries() {
        assert_eq!(weight_trend(&[]), WeightTrend::Stable);

        let mut log = daily_log(date("2025-03-01"));
        log.weight_kg = Some(80.0);
        assert_eq!(weight_trend(&[log]), WeightTrend::Stable);
    }

    #[test]
    fn test_weight_trend_directions() {
        // Descending order, as the store returns. Recent mean 79.0 vs
        // oldest mean 80.0 -> losing.
        let mut logs = Vec::new();
        for (i, w) in [79.0, 79.0, 79.0, 80.0, 80.0, 80.0].iter().enumerate() {
            let mut log = daily_log(date("2025-03-20") - Duration::days(i as i64));
            log.weight_kg = Some(*w);
            logs.push(log);
        }
        assert_eq!(weight_trend(&logs), WeightTrend::Losing);

        for log in &mut logs {
            log.weight_kg = log.weight_kg.map(|w| 160.0 - w);
        }
        assert_eq!(weight_trend(&logs), WeightTrend::Gaining);

        // Within the +-0.3 kg band
        let mut close = Vec::new();
        for (i, w) in [80.2, 80.1, 80.0, 80.0].iter().enumerate() {
            let mut log = daily_log(date("2025-03-20") - Duration::days(i as i64));
            log.weight_kg = Some(*w);
            close.push(log);
        }
        assert_eq!(weight_trend(&close), WeightTrend::Stable);
    }

    #[test]
    fn test_calorie_adherence() {
        let mut logs = Vec::new();
        for (i, kcal) in [2000, 2150, 2600].iter().enumerate() {
            let mut log = daily_log(date("2025-03-10") - Duration::days(i as i64));
            log.calories_consumed = Some(*kcal);
            logs.push(log);
        }
        // Target 2000: 2000 and 2150 are within 10%, 2600 is not.
        let rate = calorie_adherence(&logs, Some(2000));
        assert!((rate - 66.666).abs() < 0.01, "got {rate}");

        assert_eq!(calorie_adherence(&logs, None), 0.0);
        assert_eq!(calorie_adherence(&[], Some(2000)), 0.0);
    }

    #[test]
    fn test_nutrition_targets_default_profile() {
        let profile = crate::test_support::profile(CoachingPhase::Recovery);
        // Defaults: 80 kg, 170 cm, age 45, male, sedentary.
        // BMR = 800 + 1062.5 - 225 + 5 = 1642.5; TDEE = 1971.
        let targets = nutrition_targets_for(&profile, CoachingPhase::Recovery, false);
        assert_eq!(targets.calories, 1971);
        assert_eq!(targets.protein_g, 144);
        assert_eq!(targets.fat_g, 64);
        assert_eq!(targets.carbs_g, 205);
    }

    #[test]
    fn test_nutrition_targets_cutting_and_forced() {
        let profile = crate::test_support::profile(CoachingPhase::Recomp);

        let cutting = nutrition_targets_for(&profile, CoachingPhase::Cutting, false);
        assert_eq!(cutting.calories, (1971.0_f64 * 0.85).round() as i32);

        let forced = nutrition_targets_for(&profile, CoachingPhase::Cutting, true);
        assert_eq!(forced.calories, 1971, "forced transitions keep maintenance calories");
    }

    #[test]
    fn test_nutrition_targets_calorie_floor_and_carb_floor() {
        let mut profile = crate::test_support::profile(CoachingPhase::Recomp);
        // A light, short, older female profile pushes the cut below the
        // 0.85 * BMR floor and the carb budget below 100 g.
        profile.sex = Some(Sex::Female);
        profile.age = Some(60);
        profile.height_cm = Some(150.0);
        profile.current_weight_kg = Some(50.0);

        let bmr = mifflin_st_jeor(50.0, 150.0, 60, Sex::Female);
        let targets = nutrition_targets_for(&profile, CoachingPhase::Cutting, false);
        let floor = (bmr * 0.85).round() as i32;
        assert!(targets.calories >= floor, "calories {} below floor {}", targets.calories, floor);
        assert!(targets.carbs_g >= MIN_CARBS_G);
    }
}
