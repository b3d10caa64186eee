use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::profile::CoachingPhase;

/// Streak lengths that earn a celebration notification.
pub const STREAK_MILESTONES: &[i32] = &[3, 7, 14, 30, 60, 90];

/// Weight progress is celebrated every 2.5 kg toward the target.
pub const WEIGHT_MILESTONE_KG: f64 = 2.5;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    PhaseChanged {
        user_id: Uuid,
        from: CoachingPhase,
        to: CoachingPhase,
        calorie_target: i32,
    },
    StreakMilestone {
        user_id: Uuid,
        days: i32,
    },
    WeightMilestone {
        user_id: Uuid,
        progress_kg: f64,
    },
    ProteinGoalMet {
        user_id: Uuid,
        protein_grams: i32,
        target_g: i32,
    },
}

/// Fire-and-forget fan-out to whatever delivery transport is subscribed.
/// Dropped messages (no receivers) are not an error.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<String>,
}

impl Notifier {
    pub fn new(tx: broadcast::Sender<String>) -> Self {
        Self { tx }
    }

    pub fn send(&self, notification: Notification) {
        tracing::info!(event = ?notification, "notification");
        if let Ok(payload) = serde_json::to_string(&notification) {
            let _ = self.tx.send(payload);
        }
    }
}

/// Returns the milestone length when a streak has just reached one.
pub fn crossed_streak_milestone(old_streak: i32, new_streak: i32) -> Option<i32> {
    if new_streak != old_streak && STREAK_MILESTONES.contains(&new_streak) {
        Some(new_streak)
    } else {
        None
    }
}

/// Progress is measured from the starting weight in the direction of the
/// target. Returns the new total progress when this weigh-in crosses a
/// 2.5 kg increment the previous weigh-in had not reached.
pub fn crossed_weight_milestone(
    starting_kg: f64,
    target_kg: f64,
    previous_kg: Option<f64>,
    new_kg: f64,
) -> Option<f64> {
    let progress = |weight: f64| -> f64 {
        if target_kg < starting_kg {
            starting_kg - weight
        } else {
            weight - starting_kg
        }
    };

    let old_progress = progress(previous_kg.unwrap_or(starting_kg)).max(0.0);
    let new_progress = progress(new_kg).max(0.0);

    let old_increments = (old_progress / WEIGHT_MILESTONE_KG).floor() as i64;
    let new_increments = (new_progress / WEIGHT_MILESTONE_KG).floor() as i64;

    (new_increments > old_increments).then_some(new_progress)
}

/// True when this submission crosses the protein target from below.
pub fn protein_goal_met(previous_grams: Option<i32>, new_grams: i32, target_g: i32) -> bool {
    new_grams >= target_g && previous_grams.map_or(true, |p| p < target_g)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_milestone_fires_only_on_listed_lengths() {
        assert_eq!(crossed_streak_milestone(2, 3), Some(3));
        assert_eq!(crossed_streak_milestone(6, 7), Some(7));
        assert_eq!(crossed_streak_milestone(3, 4), None);
        assert_eq!(crossed_streak_milestone(7, 7), None, "unchanged streak must not re-fire");
    }

    #[test]
    fn test_weight_milestone_cut_direction() {
        // 90 -> 80 target: losing weight is progress
        assert!(crossed_weight_milestone(90.0, 80.0, Some(89.0), 87.0).is_some());
        assert!(crossed_weight_milestone(90.0, 80.0, Some(88.0), 87.9).is_none());
        // regaining weight is not a milestone
        assert!(crossed_weight_milestone(90.0, 80.0, Some(85.0), 88.0).is_none());
    }

    #[test]
    fn test_weight_milestone_gain_direction() {
        assert!(crossed_weight_milestone(60.0, 70.0, Some(61.0), 62.5).is_some());
        assert!(crossed_weight_milestone(60.0, 70.0, None, 61.0).is_none());
    }

    #[test]
    fn test_protein_goal_crossing() {
        assert!(protein_goal_met(Some(120), 160, 150));
        assert!(protein_goal_met(None, 150, 150));
        assert!(!protein_goal_met(Some(155), 160, 150), "already above target yesterday's entry");
        assert!(!protein_goal_met(None, 140, 150));
    }
}
