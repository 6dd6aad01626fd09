//! The user's gamification aggregate.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::kinds::BadgeCode;

/// Day-streak bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakState {
    /// Consecutive UTC days with at least one rewarded activity.
    pub current_days: u32,
    /// Best streak ever reached. Never below `current_days`.
    pub longest_days: u32,
    /// UTC date of the most recent rewarded activity.
    pub last_activity_date: Option<NaiveDate>,
}

/// The subset of a user's profile mutated by the reward engine.
///
/// `xp` only grows and `badges` only gains members; both are changed in
/// lock-step with the reward event that justifies the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamificationProfile {
    /// Owner of the profile.
    pub user_id: Uuid,
    /// Accumulated experience points.
    pub xp: u32,
    /// Day-streak state.
    pub streak: StreakState,
    /// Earned badges.
    pub badges: BTreeSet<BadgeCode>,
}

impl GamificationProfile {
    /// Creates the profile of a user with no rewarded activity.
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            xp: 0,
            streak: StreakState::default(),
            badges: BTreeSet::new(),
        }
    }

    /// Returns `true` once any activity has been rewarded.
    #[must_use]
    pub fn has_activity(&self) -> bool {
        self.streak.last_activity_date.is_some()
    }

    /// Returns badge codes sorted lexicographically, the form used at the
    /// JSON and storage boundaries.
    #[must_use]
    pub fn sorted_badge_codes(&self) -> Vec<&'static str> {
        let mut codes: Vec<&'static str> = self.badges.iter().map(|b| b.as_str()).collect();
        codes.sort_unstable();
        codes
    }
}
