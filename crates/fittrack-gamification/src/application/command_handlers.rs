//! Command handlers for the Gamification context.
//!
//! This module contains application-level command handler functions that
//! orchestrate the reward rules: deduplicate, price the reward, persist the
//! event together with the updated profile.

use chrono::{DateTime, NaiveDate, Utc};
use fittrack_core::clock::Clock;
use fittrack_core::error::DomainError;
use fittrack_core::event::{PendingReward, RewardEvent};
use fittrack_core::kinds::{IdempotencyKey, RewardKind, SourceId};
use fittrack_core::profile::GamificationProfile;
use fittrack_core::repository::{RecordResult, RewardRepository};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::commands::{CompleteDailyChallenge, RecordReward};
use crate::domain::{progression, reward_table};

/// Result of a successfully handled reward command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The occurrence was rewarded now.
    Recorded {
        /// The stored event.
        event: RewardEvent,
        /// The profile after the reward.
        profile: GamificationProfile,
    },
    /// The occurrence had already been rewarded; nothing changed.
    AlreadyRecorded,
}

impl RecordOutcome {
    /// Returns `true` if this call granted the reward.
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

/// Returns the idempotency key of a user's daily challenge on `day`.
///
/// The source id is the ISO date, so one key exists per UTC day.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the date cannot form a source id.
pub fn daily_challenge_key(user_id: Uuid, day: NaiveDate) -> Result<IdempotencyKey, DomainError> {
    let source_id = SourceId::new(day.format("%Y-%m-%d").to_string())?;
    Ok(IdempotencyKey::new(
        user_id,
        RewardKind::DailyChallengeCompleted,
        source_id,
    ))
}

/// Handles the `RecordReward` command: rewards the occurrence unless its
/// idempotency key has been rewarded before.
///
/// The reward is always dated with the clock's UTC date; `activity_date` on
/// the command does not influence it.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `source_id` is blank or too long.
/// Returns `DomainError` if the repository fails. Nothing is persisted in
/// either case.
#[instrument(
    skip(command, clock, repo),
    fields(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        user_id = %command.user_id,
        kind = %command.kind,
    )
)]
pub async fn handle_record_reward(
    command: &RecordReward,
    clock: &dyn Clock,
    repo: &dyn RewardRepository,
) -> Result<RecordOutcome, DomainError> {
    let now = clock.now();
    if let Some(activity_date) = command.activity_date
        && activity_date != now.date_naive()
    {
        debug!(%activity_date, today = %now.date_naive(), "ignoring caller-supplied activity date");
    }

    let source_id = SourceId::new(command.source_id.as_str())?;
    let key = IdempotencyKey::new(command.user_id, command.kind, source_id);
    record(key, now, repo).await
}

/// Handles the `CompleteDailyChallenge` command: rewards at most one daily
/// challenge per user per UTC day.
///
/// # Errors
///
/// Returns `DomainError` if the repository fails.
#[instrument(
    skip(command, clock, repo),
    fields(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        user_id = %command.user_id,
    )
)]
pub async fn handle_complete_daily_challenge(
    command: &CompleteDailyChallenge,
    clock: &dyn Clock,
    repo: &dyn RewardRepository,
) -> Result<RecordOutcome, DomainError> {
    let now = clock.now();
    let key = daily_challenge_key(command.user_id, now.date_naive())?;
    record(key, now, repo).await
}

async fn record(
    key: IdempotencyKey,
    now: DateTime<Utc>,
    repo: &dyn RewardRepository,
) -> Result<RecordOutcome, DomainError> {
    if repo.exists(&key).await? {
        debug!(%key, "occurrence already rewarded");
        return Ok(RecordOutcome::AlreadyRecorded);
    }

    let today = now.date_naive();
    let xp = reward_table::xp_for(key.kind);
    let pending = PendingReward {
        event_id: Uuid::now_v7(),
        key,
        event_date: today,
        xp,
        created_at: now,
    };
    let update = move |profile: &mut GamificationProfile| {
        progression::apply_reward(profile, xp, today);
    };

    match repo.record_reward(&pending, &update).await? {
        RecordResult::Recorded { event, profile } => {
            info!(
                event_id = %event.id,
                source_id = %event.source_id,
                xp_awarded = event.xp_awarded,
                xp = profile.xp,
                current_streak_days = profile.streak.current_days,
                "reward recorded"
            );
            Ok(RecordOutcome::Recorded { event, profile })
        }
        RecordResult::Duplicate => {
            debug!(key = %pending.key, "concurrent duplicate rejected by store");
            Ok(RecordOutcome::AlreadyRecorded)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fittrack_core::error::DomainError;
    use fittrack_core::kinds::{BadgeCode, RewardKind};
    use fittrack_core::profile::{GamificationProfile, StreakState};
    use fittrack_test_support::{
        FailingRewardRepository, FixedClock, InMemoryRewardRepository, utc_day,
    };
    use uuid::Uuid;

    use super::{RecordOutcome, handle_complete_daily_challenge, handle_record_reward};
    use crate::application::query_handlers::is_daily_challenge_completed_today;
    use crate::domain::commands::{CompleteDailyChallenge, RecordReward};

    fn record_command(user_id: Uuid, kind: RewardKind, source: &str) -> RecordReward {
        RecordReward {
            correlation_id: Uuid::new_v4(),
            user_id,
            kind,
            source_id: source.to_owned(),
            activity_date: None,
        }
    }

    fn challenge_command(user_id: Uuid) -> CompleteDailyChallenge {
        CompleteDailyChallenge {
            correlation_id: Uuid::new_v4(),
            user_id,
        }
    }

    fn recorded_profile(outcome: RecordOutcome) -> GamificationProfile {
        match outcome {
            RecordOutcome::Recorded { profile, .. } => profile,
            RecordOutcome::AlreadyRecorded => panic!("expected Recorded, got AlreadyRecorded"),
        }
    }

    #[tokio::test]
    async fn test_first_weekly_progress_grants_xp_streak_and_first_log() {
        // Arrange
        let user_id = Uuid::new_v4();
        let clock = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::new();

        // Act
        let outcome = handle_record_reward(
            &record_command(user_id, RewardKind::WeeklyProgress, "wp-1"),
            &clock,
            &repo,
        )
        .await
        .unwrap();

        // Assert
        let profile = recorded_profile(outcome);
        assert_eq!(profile.xp, 25);
        assert_eq!(profile.streak.current_days, 1);
        assert_eq!(profile.streak.longest_days, 1);
        assert_eq!(profile.streak.last_activity_date, Some(utc_day(2026, 1, 15)));
        assert_eq!(profile.badges.iter().copied().collect::<Vec<_>>(), vec![BadgeCode::FirstLog]);

        let events = repo.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, RewardKind::WeeklyProgress);
        assert_eq!(events[0].source_id.as_str(), "wp-1");
        assert_eq!(events[0].event_date, utc_day(2026, 1, 15));
        assert_eq!(events[0].xp_awarded, 25);
        assert_eq!(events[0].created_at, clock.0);
    }

    #[tokio::test]
    async fn test_repeated_occurrence_is_an_idempotent_no_op() {
        // Arrange
        let user_id = Uuid::new_v4();
        let clock = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::new();
        let command = record_command(user_id, RewardKind::WeeklyProgress, "wp-1");
        handle_record_reward(&command, &clock, &repo).await.unwrap();
        let after_first = repo.stored_profile(user_id).unwrap();

        // Act
        let mut outcomes = Vec::new();
        for _ in 0..3 {
            outcomes.push(handle_record_reward(&command, &clock, &repo).await.unwrap());
        }

        // Assert
        assert!(outcomes.iter().all(|o| *o == RecordOutcome::AlreadyRecorded));
        assert_eq!(repo.stored_profile(user_id).unwrap(), after_first);
        assert_eq!(repo.events().len(), 1);
    }

    #[tokio::test]
    async fn test_repeat_on_a_later_day_still_no_op() {
        // Arrange
        let user_id = Uuid::new_v4();
        let day_one = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::new();
        let command = record_command(user_id, RewardKind::MealPlanCreated, "mp-1");
        handle_record_reward(&command, &day_one, &repo).await.unwrap();

        // Act
        let outcome = handle_record_reward(&command, &day_one.plus_days(1), &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome, RecordOutcome::AlreadyRecorded);
        let profile = repo.stored_profile(user_id).unwrap();
        assert_eq!(profile.streak.last_activity_date, Some(utc_day(2026, 1, 15)));
    }

    #[tokio::test]
    async fn test_same_source_id_under_different_kinds_are_distinct_occurrences() {
        // Arrange
        let user_id = Uuid::new_v4();
        let clock = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::new();

        // Act
        handle_record_reward(
            &record_command(user_id, RewardKind::WeeklyProgress, "42"),
            &clock,
            &repo,
        )
        .await
        .unwrap();
        let outcome = handle_record_reward(
            &record_command(user_id, RewardKind::BodyAnalysisCreated, "42"),
            &clock,
            &repo,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(recorded_profile(outcome).xp, 45);
    }

    #[tokio::test]
    async fn test_same_source_id_for_different_users_are_distinct_occurrences() {
        // Arrange
        let clock = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        // Act
        handle_record_reward(
            &record_command(alice, RewardKind::WeeklyProgress, "wp-1"),
            &clock,
            &repo,
        )
        .await
        .unwrap();
        let outcome = handle_record_reward(
            &record_command(bob, RewardKind::WeeklyProgress, "wp-1"),
            &clock,
            &repo,
        )
        .await
        .unwrap();

        // Assert
        assert!(outcome.is_recorded());
        assert_eq!(repo.stored_profile(alice).unwrap().xp, 25);
        assert_eq!(repo.stored_profile(bob).unwrap().xp, 25);
    }

    #[tokio::test]
    async fn test_reward_sequence_across_days_with_gap() {
        let user_id = Uuid::new_v4();
        let day_d = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::new();

        // First weekly progress on day D.
        handle_record_reward(
            &record_command(user_id, RewardKind::WeeklyProgress, "wp-1"),
            &day_d,
            &repo,
        )
        .await
        .unwrap();
        let a = repo.stored_profile(user_id).unwrap();
        assert_eq!((a.xp, a.streak.current_days, a.streak.longest_days), (25, 1, 1));
        assert_eq!(a.sorted_badge_codes(), vec!["FIRST_LOG"]);

        // Same occurrence again.
        let b = handle_record_reward(
            &record_command(user_id, RewardKind::WeeklyProgress, "wp-1"),
            &day_d,
            &repo,
        )
        .await
        .unwrap();
        assert_eq!(b, RecordOutcome::AlreadyRecorded);
        assert_eq!(repo.stored_profile(user_id).unwrap(), a);

        // Meal plan on D+1.
        handle_record_reward(
            &record_command(user_id, RewardKind::MealPlanCreated, "mp-1"),
            &day_d.plus_days(1),
            &repo,
        )
        .await
        .unwrap();
        let c = repo.stored_profile(user_id).unwrap();
        assert_eq!((c.xp, c.streak.current_days, c.streak.longest_days), (40, 2, 2));

        // Next event on D+4, after a three-day gap.
        handle_record_reward(
            &record_command(user_id, RewardKind::WeeklyProgress, "wp-2"),
            &day_d.plus_days(4),
            &repo,
        )
        .await
        .unwrap();
        let d = repo.stored_profile(user_id).unwrap();
        assert_eq!((d.streak.current_days, d.streak.longest_days), (1, 2));
        assert_eq!(d.streak.last_activity_date, Some(utc_day(2026, 1, 19)));
    }

    #[tokio::test]
    async fn test_consecutive_days_build_streak_and_badges() {
        // Arrange
        let user_id = Uuid::new_v4();
        let start = FixedClock::on(2026, 2, 1);
        let repo = InMemoryRewardRepository::new();

        // Act
        for day in 0..7 {
            handle_record_reward(
                &record_command(user_id, RewardKind::WeeklyProgress, &format!("wp-{day}")),
                &start.plus_days(day),
                &repo,
            )
            .await
            .unwrap();
        }

        // Assert
        let profile = repo.stored_profile(user_id).unwrap();
        assert_eq!(profile.streak.current_days, 7);
        assert_eq!(profile.streak.longest_days, 7);
        assert_eq!(profile.xp, 175);
        assert_eq!(
            profile.sorted_badge_codes(),
            vec!["FIRST_LOG", "STREAK_3", "STREAK_7", "XP_100"]
        );
    }

    #[tokio::test]
    async fn test_same_day_second_activity_grants_xp_without_streak_progress() {
        // Arrange
        let user_id = Uuid::new_v4();
        let clock = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::new();
        handle_record_reward(
            &record_command(user_id, RewardKind::WeeklyProgress, "wp-1"),
            &clock,
            &repo,
        )
        .await
        .unwrap();

        // Act
        let later_same_day = FixedClock(clock.0 + chrono::Duration::hours(13));
        handle_record_reward(
            &record_command(user_id, RewardKind::MealPlanCreated, "mp-1"),
            &later_same_day,
            &repo,
        )
        .await
        .unwrap();

        // Assert
        let profile = repo.stored_profile(user_id).unwrap();
        assert_eq!(profile.xp, 40);
        assert_eq!(profile.streak.current_days, 1);
        assert_eq!(profile.streak.last_activity_date, Some(utc_day(2026, 1, 15)));
    }

    #[tokio::test]
    async fn test_badges_remain_after_streak_breaks() {
        // Arrange
        let user_id = Uuid::new_v4();
        let repo = InMemoryRewardRepository::new();
        let mut seeded = GamificationProfile::new(user_id);
        seeded.xp = 60;
        seeded.streak = StreakState {
            current_days: 3,
            longest_days: 3,
            last_activity_date: Some(utc_day(2026, 1, 10)),
        };
        seeded.badges.extend([BadgeCode::FirstLog, BadgeCode::Streak3]);
        repo.seed_profile(seeded);

        // Act
        handle_record_reward(
            &record_command(user_id, RewardKind::MealPlanCreated, "mp-9"),
            &FixedClock::on(2026, 1, 20),
            &repo,
        )
        .await
        .unwrap();

        // Assert
        let profile = repo.stored_profile(user_id).unwrap();
        assert_eq!(profile.streak.current_days, 1);
        assert_eq!(profile.streak.longest_days, 3);
        assert!(profile.badges.contains(&BadgeCode::Streak3));
    }

    #[tokio::test]
    async fn test_caller_activity_date_is_ignored() {
        // Arrange
        let user_id = Uuid::new_v4();
        let clock = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::new();
        let mut command = record_command(user_id, RewardKind::WeeklyProgress, "wp-1");
        command.activity_date = Some(utc_day(2025, 12, 1));

        // Act
        handle_record_reward(&command, &clock, &repo).await.unwrap();

        // Assert
        assert_eq!(repo.events()[0].event_date, utc_day(2026, 1, 15));
        assert_eq!(
            repo.stored_profile(user_id).unwrap().streak.last_activity_date,
            Some(utc_day(2026, 1, 15))
        );
    }

    #[tokio::test]
    async fn test_duplicate_rejected_by_store_is_not_an_error() {
        // Arrange
        let user_id = Uuid::new_v4();
        let clock = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::with_stale_exists();
        let command = record_command(user_id, RewardKind::WeeklyProgress, "wp-1");
        handle_record_reward(&command, &clock, &repo).await.unwrap();

        // Act
        let outcome = handle_record_reward(&command, &clock, &repo).await;

        // Assert
        assert_eq!(outcome.unwrap(), RecordOutcome::AlreadyRecorded);
        assert_eq!(repo.stored_profile(user_id).unwrap().xp, 25);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_reward_once() {
        // Arrange
        let user_id = Uuid::new_v4();
        let repo = Arc::new(InMemoryRewardRepository::with_stale_exists());
        let command = record_command(user_id, RewardKind::WeeklyProgress, "wp-1");

        // Act
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            let command = command.clone();
            tasks.push(tokio::spawn(async move {
                handle_record_reward(&command, &FixedClock::on(2026, 1, 15), repo.as_ref())
                    .await
                    .unwrap()
            }));
        }
        let mut recorded = 0;
        for task in tasks {
            if task.await.unwrap().is_recorded() {
                recorded += 1;
            }
        }

        // Assert
        assert_eq!(recorded, 1);
        assert_eq!(repo.events().len(), 1);
        assert_eq!(repo.stored_profile(user_id).unwrap().xp, 25);
    }

    #[tokio::test]
    async fn test_failed_persistence_leaves_profile_and_log_untouched() {
        // Arrange
        let user_id = Uuid::new_v4();
        let clock = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::with_failing_writes();

        // Act
        let result = handle_record_reward(
            &record_command(user_id, RewardKind::WeeklyProgress, "wp-1"),
            &clock,
            &repo,
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert!(repo.events().is_empty());
        assert!(repo.stored_profile(user_id).is_none());
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let result = handle_record_reward(
            &record_command(Uuid::new_v4(), RewardKind::WeeklyProgress, "wp-1"),
            &FixedClock::on(2026, 1, 15),
            &FailingRewardRepository,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_daily_challenge_rewarded_once_per_day() {
        // Arrange
        let user_id = Uuid::new_v4();
        let clock = FixedClock::on(2026, 1, 15);
        let repo = InMemoryRewardRepository::new();
        assert!(!is_daily_challenge_completed_today(user_id, &clock, &repo).await.unwrap());

        // Act
        let first = handle_complete_daily_challenge(&challenge_command(user_id), &clock, &repo)
            .await
            .unwrap();
        let completed_after_first = is_daily_challenge_completed_today(user_id, &clock, &repo)
            .await
            .unwrap();
        let second = handle_complete_daily_challenge(&challenge_command(user_id), &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert!(first.is_recorded());
        assert!(completed_after_first);
        assert_eq!(second, RecordOutcome::AlreadyRecorded);
        assert!(is_daily_challenge_completed_today(user_id, &clock, &repo).await.unwrap());
        assert_eq!(repo.stored_profile(user_id).unwrap().xp, 10);

        let events = repo.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, RewardKind::DailyChallengeCompleted);
        assert_eq!(events[0].source_id.as_str(), "2026-01-15");
    }

    #[tokio::test]
    async fn test_daily_challenge_available_again_next_day() {
        // Arrange
        let user_id = Uuid::new_v4();
        let today = FixedClock::on(2026, 1, 15);
        let tomorrow = today.plus_days(1);
        let repo = InMemoryRewardRepository::new();
        handle_complete_daily_challenge(&challenge_command(user_id), &today, &repo)
            .await
            .unwrap();

        // Act
        let pending_tomorrow = is_daily_challenge_completed_today(user_id, &tomorrow, &repo)
            .await
            .unwrap();
        let outcome = handle_complete_daily_challenge(&challenge_command(user_id), &tomorrow, &repo)
            .await
            .unwrap();

        // Assert
        assert!(!pending_tomorrow);
        let profile = recorded_profile(outcome);
        assert_eq!(profile.xp, 20);
        assert_eq!(profile.streak.current_days, 2);
    }

    #[tokio::test]
    async fn test_blank_source_id_is_rejected_before_touching_the_store() {
        // Arrange
        let user_id = Uuid::new_v4();
        let repo = InMemoryRewardRepository::new();

        // Act
        let result = handle_record_reward(
            &record_command(user_id, RewardKind::WeeklyProgress, "   "),
            &FixedClock::on(2026, 1, 15),
            &repo,
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.events().is_empty());
        assert!(repo.stored_profile(user_id).is_none());
    }

    #[tokio::test]
    async fn test_oversized_source_id_is_rejected() {
        // Arrange
        let user_id = Uuid::new_v4();
        let repo = InMemoryRewardRepository::new();
        let source = "x".repeat(256);

        // Act
        let result = handle_record_reward(
            &record_command(user_id, RewardKind::MealPlanCreated, &source),
            &FixedClock::on(2026, 1, 15),
            &repo,
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.events().is_empty());
    }
}
