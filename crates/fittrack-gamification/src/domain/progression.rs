//! Applying a granted reward to a user's profile.

use chrono::NaiveDate;
use fittrack_core::kinds::BadgeCode;
use fittrack_core::profile::GamificationProfile;
use tracing::{debug, warn};

use super::badges;
use super::streak::{self, StreakTransition};

/// Summary of what a single reward changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardApplied {
    /// XP added.
    pub xp_awarded: u32,
    /// Streak branch taken.
    pub transition: StreakTransition,
    /// Badges earned by this reward.
    pub new_badges: Vec<BadgeCode>,
}

/// Adds `xp` to the profile, advances the streak for `today` and derives
/// badges from the resulting totals, in that order.
pub fn apply_reward(
    profile: &mut GamificationProfile,
    xp: u32,
    today: NaiveDate,
) -> RewardApplied {
    profile.xp = profile.xp.saturating_add(xp);

    let last_activity_date = profile.streak.last_activity_date;
    let transition = streak::advance(&mut profile.streak, today);
    if transition == StreakTransition::ClockAnomaly {
        warn!(
            user_id = %profile.user_id,
            %today,
            ?last_activity_date,
            "activity date precedes last activity date; streak reset"
        );
    }

    let has_activity = profile.has_activity();
    let new_badges = badges::evaluate(
        &mut profile.badges,
        profile.xp,
        profile.streak.current_days,
        has_activity,
    );

    debug!(
        user_id = %profile.user_id,
        xp_awarded = xp,
        ?transition,
        ?new_badges,
        "reward applied"
    );

    RewardApplied {
        xp_awarded: xp,
        transition,
        new_badges,
    }
}
