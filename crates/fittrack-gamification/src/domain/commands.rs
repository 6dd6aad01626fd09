//! Commands for the Gamification context.

use chrono::NaiveDate;
use fittrack_core::kinds::RewardKind;
use uuid::Uuid;

/// Command to reward one occurrence of an activity.
#[derive(Debug, Clone)]
pub struct RecordReward {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user being rewarded.
    pub user_id: Uuid,
    /// Kind of activity.
    pub kind: RewardKind,
    /// Identifier of the occurrence, e.g. the weekly-progress record id.
    /// Validated by the handler.
    pub source_id: String,
    /// Date the caller associates with the activity. Informational only:
    /// rewards are always dated with the server's UTC date.
    pub activity_date: Option<NaiveDate>,
}

impl RecordReward {
    /// Returns the command type name (for logging/routing).
    #[must_use]
    pub const fn command_type(&self) -> &'static str {
        "gamification.record_reward"
    }
}

/// Command to reward today's daily challenge.
#[derive(Debug, Clone)]
pub struct CompleteDailyChallenge {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user completing the challenge.
    pub user_id: Uuid,
}

impl CompleteDailyChallenge {
    /// Returns the command type name (for logging/routing).
    #[must_use]
    pub const fn command_type(&self) -> &'static str {
        "gamification.complete_daily_challenge"
    }
}
