//! Badge derivation.

use std::collections::BTreeSet;

use fittrack_core::kinds::BadgeCode;

use super::reward_table::{STREAK_BADGES, XP_BADGES};

/// Adds every badge the given progress qualifies for and returns the badges
/// that were not already held. Existing badges are never removed.
pub fn evaluate(
    badges: &mut BTreeSet<BadgeCode>,
    xp: u32,
    current_streak_days: u32,
    has_activity: bool,
) -> Vec<BadgeCode> {
    let first_log = has_activity.then_some(BadgeCode::FirstLog);
    let by_streak = STREAK_BADGES
        .iter()
        .filter(|(threshold, _)| current_streak_days >= *threshold)
        .map(|(_, badge)| *badge);
    let by_xp = XP_BADGES
        .iter()
        .filter(|(threshold, _)| xp >= *threshold)
        .map(|(_, badge)| *badge);

    first_log
        .into_iter()
        .chain(by_streak)
        .chain(by_xp)
        .filter(|badge| badges.insert(*badge))
        .collect()
}
