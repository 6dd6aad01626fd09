//! Reward event log entries.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::kinds::{IdempotencyKey, RewardKind, SourceId};

/// A reward that has been decided but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReward {
    /// Identifier the event row will carry.
    pub event_id: Uuid,
    /// Deduplication key.
    pub key: IdempotencyKey,
    /// UTC date the reward is granted on.
    pub event_date: NaiveDate,
    /// XP granted by this reward.
    pub xp: u32,
    /// Timestamp of the decision.
    pub created_at: DateTime<Utc>,
}

impl PendingReward {
    /// Converts the pending reward into the log entry it becomes once stored.
    #[must_use]
    pub fn into_event(self) -> RewardEvent {
        RewardEvent {
            id: self.event_id,
            user_id: self.key.user_id,
            kind: self.key.kind,
            source_id: self.key.source_id,
            event_date: self.event_date,
            xp_awarded: self.xp,
            created_at: self.created_at,
        }
    }
}

/// Append-only record of a granted reward. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// Owner of the reward.
    pub user_id: Uuid,
    /// Kind of rewarded activity.
    pub kind: RewardKind,
    /// Occurrence identifier.
    pub source_id: SourceId,
    /// UTC date the reward was granted on.
    pub event_date: NaiveDate,
    /// XP granted.
    pub xp_awarded: u32,
    /// Timestamp of event creation.
    pub created_at: DateTime<Utc>,
}

impl RewardEvent {
    /// Returns the deduplication key of this event.
    #[must_use]
    pub fn key(&self) -> IdempotencyKey {
        IdempotencyKey::new(self.user_id, self.kind, self.source_id.clone())
    }
}
