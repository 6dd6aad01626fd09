//! Test repositories — mock `RewardRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fittrack_core::error::DomainError;
use fittrack_core::event::{PendingReward, RewardEvent};
use fittrack_core::kinds::IdempotencyKey;
use fittrack_core::profile::GamificationProfile;
use fittrack_core::repository::{ProfileUpdate, RecordResult, RewardRepository};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    events: Vec<RewardEvent>,
    profiles: HashMap<Uuid, GamificationProfile>,
}

/// An in-memory repository honoring the same contract as the PostgreSQL
/// store: one event per idempotency key, and the event insert and profile
/// update either both happen or neither does.
///
/// A single mutex plays the role of the per-user row lock.
#[derive(Debug, Default)]
pub struct InMemoryRewardRepository {
    tables: Mutex<Tables>,
    stale_exists: bool,
    fail_writes: bool,
}

impl InMemoryRewardRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository whose `exists` always answers `false`, as if every
    /// lookup raced a concurrent insert. Deduplication then rests entirely on
    /// `record_reward`.
    #[must_use]
    pub fn with_stale_exists() -> Self {
        Self {
            stale_exists: true,
            ..Self::default()
        }
    }

    /// Creates a repository that accepts reads but aborts every
    /// `record_reward` after the profile update has been computed.
    #[must_use]
    pub fn with_failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Stores `profile` as the current state of its user.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_profile(&self, profile: GamificationProfile) {
        self.tables
            .lock()
            .unwrap()
            .profiles
            .insert(profile.user_id, profile);
    }

    /// Returns a snapshot of all stored events in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn events(&self) -> Vec<RewardEvent> {
        self.tables.lock().unwrap().events.clone()
    }

    /// Returns the stored profile of `user_id`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored_profile(&self, user_id: Uuid) -> Option<GamificationProfile> {
        self.tables.lock().unwrap().profiles.get(&user_id).cloned()
    }
}

#[async_trait]
impl RewardRepository for InMemoryRewardRepository {
    async fn exists(&self, key: &IdempotencyKey) -> Result<bool, DomainError> {
        if self.stale_exists {
            return Ok(false);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables.events.iter().any(|e| e.key() == *key))
    }

    async fn record_reward(
        &self,
        reward: &PendingReward,
        update: ProfileUpdate<'_>,
    ) -> Result<RecordResult, DomainError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.events.iter().any(|e| e.key() == reward.key) {
            return Ok(RecordResult::Duplicate);
        }

        let user_id = reward.key.user_id;
        let mut profile = tables
            .profiles
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| GamificationProfile::new(user_id));
        update(&mut profile);

        if self.fail_writes {
            return Err(DomainError::Infrastructure(
                "transaction aborted: connection reset".into(),
            ));
        }

        let event = reward.clone().into_event();
        tables.events.push(event.clone());
        tables.profiles.insert(user_id, profile.clone());
        Ok(RecordResult::Recorded { event, profile })
    }

    async fn load_profile(&self, user_id: Uuid) -> Result<GamificationProfile, DomainError> {
        Ok(self
            .stored_profile(user_id)
            .unwrap_or_else(|| GamificationProfile::new(user_id)))
    }

    async fn list_events(&self, user_id: Uuid) -> Result<Vec<RewardEvent>, DomainError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .events
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// A reward repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingRewardRepository;

#[async_trait]
impl RewardRepository for FailingRewardRepository {
    async fn exists(&self, _key: &IdempotencyKey) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn record_reward(
        &self,
        _reward: &PendingReward,
        _update: ProfileUpdate<'_>,
    ) -> Result<RecordResult, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn load_profile(&self, _user_id: Uuid) -> Result<GamificationProfile, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn list_events(&self, _user_id: Uuid) -> Result<Vec<RewardEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
