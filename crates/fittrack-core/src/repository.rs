//! Reward repository abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::{PendingReward, RewardEvent};
use crate::kinds::IdempotencyKey;
use crate::profile::GamificationProfile;

/// Mutation applied to a user's profile while the store holds it locked.
pub type ProfileUpdate<'a> = &'a (dyn Fn(&mut GamificationProfile) + Send + Sync);

/// Outcome of [`RewardRepository::record_reward`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordResult {
    /// The event was inserted and the profile updated in the same unit.
    Recorded {
        /// The stored event.
        event: RewardEvent,
        /// The profile as committed.
        profile: GamificationProfile,
    },
    /// An event with the same idempotency key already exists. Nothing was
    /// written.
    Duplicate,
}

/// Durable store for the reward log and the gamification profile.
///
/// Implementations must enforce key uniqueness in the store itself (a unique
/// index or equivalent), so that two concurrent `record_reward` calls for the
/// same key yield exactly one `Recorded`.
#[async_trait]
pub trait RewardRepository: Send + Sync {
    /// Returns whether an event exists for `key`.
    async fn exists(&self, key: &IdempotencyKey) -> Result<bool, DomainError>;

    /// Inserts the event if its key is absent and, in the same atomic unit,
    /// applies `update` to the user's profile under a per-user lock.
    ///
    /// A rejected duplicate is reported as `RecordResult::Duplicate`, not as
    /// an error. On any error nothing is persisted.
    async fn record_reward(
        &self,
        reward: &PendingReward,
        update: ProfileUpdate<'_>,
    ) -> Result<RecordResult, DomainError>;

    /// Loads a user's profile, returning the empty profile for unknown users.
    async fn load_profile(&self, user_id: Uuid) -> Result<GamificationProfile, DomainError>;

    /// Lists a user's reward events, newest first.
    async fn list_events(&self, user_id: Uuid) -> Result<Vec<RewardEvent>, DomainError>;
}
