//! Static reward amounts and badge thresholds.

use fittrack_core::kinds::{BadgeCode, RewardKind};

/// Streak-length thresholds, ascending.
pub const STREAK_BADGES: [(u32, BadgeCode); 3] = [
    (3, BadgeCode::Streak3),
    (7, BadgeCode::Streak7),
    (30, BadgeCode::Streak30),
];

/// XP thresholds, ascending.
pub const XP_BADGES: [(u32, BadgeCode); 2] = [(100, BadgeCode::Xp100), (500, BadgeCode::Xp500)];

/// Returns the XP granted for one occurrence of `kind`.
#[must_use]
pub const fn xp_for(kind: RewardKind) -> u32 {
    match kind {
        RewardKind::WeeklyProgress => 25,
        RewardKind::MealPlanCreated => 15,
        RewardKind::BodyAnalysisCreated => 20,
        RewardKind::DailyChallengeCompleted => 10,
    }
}
