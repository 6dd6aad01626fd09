//! Query handlers for the Gamification context.
//!
//! Read-only lookups over the profile and the reward log. None of these
//! mutate state.

use chrono::{DateTime, NaiveDate, Utc};
use fittrack_core::clock::Clock;
use fittrack_core::error::DomainError;
use fittrack_core::event::RewardEvent;
use fittrack_core::kinds::RewardKind;
use fittrack_core::profile::GamificationProfile;
use fittrack_core::repository::RewardRepository;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::application::command_handlers::daily_challenge_key;

/// Read-only view of a user's gamification progress.
#[derive(Debug, Serialize)]
pub struct GamificationStatusView {
    /// The user identifier.
    pub user_id: Uuid,
    /// Accumulated experience points.
    pub xp: u32,
    /// Current day streak.
    pub current_streak_days: u32,
    /// Best day streak ever.
    pub longest_streak_days: u32,
    /// UTC date of the most recent rewarded activity.
    pub last_activity_date: Option<NaiveDate>,
    /// Earned badge codes, sorted.
    pub badges: Vec<&'static str>,
}

impl From<GamificationProfile> for GamificationStatusView {
    fn from(profile: GamificationProfile) -> Self {
        Self {
            user_id: profile.user_id,
            xp: profile.xp,
            current_streak_days: profile.streak.current_days,
            longest_streak_days: profile.streak.longest_days,
            last_activity_date: profile.streak.last_activity_date,
            badges: profile.sorted_badge_codes(),
        }
    }
}

/// Read-only view of a reward log entry.
#[derive(Debug, Serialize)]
pub struct RewardEventView {
    /// The event identifier.
    pub event_id: Uuid,
    /// Kind of rewarded activity.
    pub kind: RewardKind,
    /// Occurrence identifier.
    pub source_id: String,
    /// UTC date the reward was granted on.
    pub event_date: NaiveDate,
    /// XP granted.
    pub xp_awarded: u32,
    /// Timestamp of event creation.
    pub created_at: DateTime<Utc>,
}

impl From<RewardEvent> for RewardEventView {
    fn from(event: RewardEvent) -> Self {
        Self {
            event_id: event.id,
            kind: event.kind,
            source_id: event.source_id.as_str().to_owned(),
            event_date: event.event_date,
            xp_awarded: event.xp_awarded,
            created_at: event.created_at,
        }
    }
}

/// Returns whether the user's daily challenge has been rewarded for the
/// clock's current UTC day.
///
/// # Errors
///
/// Returns `DomainError` if the repository lookup fails.
#[instrument(skip(clock, repo))]
pub async fn is_daily_challenge_completed_today(
    user_id: Uuid,
    clock: &dyn Clock,
    repo: &dyn RewardRepository,
) -> Result<bool, DomainError> {
    let key = daily_challenge_key(user_id, clock.today())?;
    repo.exists(&key).await
}

/// Retrieves a user's gamification status. Users without any reward get the
/// zero status.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the profile cannot be loaded.
/// Returns `DomainError::CorruptRecord` if the stored profile is invalid.
#[instrument(skip(repo))]
pub async fn get_gamification_status(
    user_id: Uuid,
    repo: &dyn RewardRepository,
) -> Result<GamificationStatusView, DomainError> {
    let profile = repo.load_profile(user_id).await?;
    Ok(GamificationStatusView::from(profile))
}

/// Lists a user's reward events, newest first.
///
/// # Errors
///
/// Returns `DomainError` if the events cannot be loaded.
#[instrument(skip(repo))]
pub async fn list_reward_events(
    user_id: Uuid,
    repo: &dyn RewardRepository,
) -> Result<Vec<RewardEventView>, DomainError> {
    let events = repo.list_events(user_id).await?;
    Ok(events.into_iter().map(RewardEventView::from).collect())
}
