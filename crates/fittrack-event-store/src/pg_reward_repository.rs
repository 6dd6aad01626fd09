//! `PostgreSQL` implementation of the `RewardRepository` trait.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use fittrack_core::error::DomainError;
use fittrack_core::event::{PendingReward, RewardEvent};
use fittrack_core::kinds::{BadgeCode, IdempotencyKey, RewardKind, SourceId};
use fittrack_core::profile::{GamificationProfile, StreakState};
use fittrack_core::repository::{ProfileUpdate, RecordResult, RewardRepository};

const EXISTS_SQL: &str = r"
SELECT EXISTS (
    SELECT 1 FROM reward_events
    WHERE user_id = $1 AND kind = $2 AND source_id = $3
)";

const INSERT_EVENT_SQL: &str = r"
INSERT INTO reward_events (event_id, user_id, kind, source_id, event_date, xp_awarded, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (user_id, kind, source_id) DO NOTHING
RETURNING event_id";

const ENSURE_PROFILE_SQL: &str = r"
INSERT INTO user_gamification (user_id) VALUES ($1)
ON CONFLICT (user_id) DO NOTHING";

const SELECT_PROFILE_SQL: &str = r"
SELECT user_id, xp, current_streak_days, longest_streak_days, last_activity_date, badges
FROM user_gamification
WHERE user_id = $1";

const LOCK_PROFILE_SQL: &str = r"
SELECT user_id, xp, current_streak_days, longest_streak_days, last_activity_date, badges
FROM user_gamification
WHERE user_id = $1
FOR UPDATE";

const UPDATE_PROFILE_SQL: &str = r"
UPDATE user_gamification
SET xp = $2,
    current_streak_days = $3,
    longest_streak_days = $4,
    last_activity_date = $5,
    badges = $6,
    updated_at = NOW()
WHERE user_id = $1";

const LIST_EVENTS_SQL: &str = r"
SELECT event_id, user_id, kind, source_id, event_date, xp_awarded, created_at
FROM reward_events
WHERE user_id = $1
ORDER BY created_at DESC, event_id DESC";

/// PostgreSQL-backed reward repository.
///
/// `reward_events` carries a unique constraint over the idempotency key, and
/// `record_reward` runs the event insert and the profile read-modify-write in
/// one transaction holding the profile row lock.
#[derive(Debug, Clone)]
pub struct PgRewardRepository {
    pool: PgPool,
}

impl PgRewardRepository {
    /// Creates a new `PgRewardRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

fn to_db_int(value: u32, column: &str) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| {
        DomainError::Infrastructure(format!("{column} value {value} exceeds column range"))
    })
}

fn from_db_int<T>(value: T, column: &str, user_id: Uuid) -> Result<u32, DomainError>
where
    T: Copy + std::fmt::Display,
    u32: TryFrom<T>,
{
    u32::try_from(value).map_err(|_| {
        DomainError::CorruptRecord(format!("{column} is {value} for user {user_id}"))
    })
}

fn profile_from_row(row: &PgRow) -> Result<GamificationProfile, DomainError> {
    let user_id: Uuid = row.try_get("user_id").map_err(infrastructure)?;
    let xp: i64 = row.try_get("xp").map_err(infrastructure)?;
    let current: i32 = row.try_get("current_streak_days").map_err(infrastructure)?;
    let longest: i32 = row.try_get("longest_streak_days").map_err(infrastructure)?;
    let last_activity_date: Option<NaiveDate> =
        row.try_get("last_activity_date").map_err(infrastructure)?;
    let codes: Vec<String> = row.try_get("badges").map_err(infrastructure)?;

    let badges = codes
        .iter()
        .map(|code| code.parse::<BadgeCode>())
        .collect::<Result<BTreeSet<_>, _>>()
        .map_err(|e| DomainError::CorruptRecord(format!("user {user_id}: {e}")))?;

    Ok(GamificationProfile {
        user_id,
        xp: from_db_int(xp, "xp", user_id)?,
        streak: StreakState {
            current_days: from_db_int(current, "current_streak_days", user_id)?,
            longest_days: from_db_int(longest, "longest_streak_days", user_id)?,
            last_activity_date,
        },
        badges,
    })
}

fn event_from_row(row: &PgRow) -> Result<RewardEvent, DomainError> {
    let id: Uuid = row.try_get("event_id").map_err(infrastructure)?;
    let user_id: Uuid = row.try_get("user_id").map_err(infrastructure)?;
    let kind: String = row.try_get("kind").map_err(infrastructure)?;
    let source_id: String = row.try_get("source_id").map_err(infrastructure)?;
    let event_date: NaiveDate = row.try_get("event_date").map_err(infrastructure)?;
    let xp_awarded: i32 = row.try_get("xp_awarded").map_err(infrastructure)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(infrastructure)?;

    let corrupt = |detail: String| DomainError::CorruptRecord(format!("event {id}: {detail}"));

    Ok(RewardEvent {
        id,
        user_id,
        kind: kind
            .parse::<RewardKind>()
            .map_err(|e| corrupt(e.to_string()))?,
        source_id: SourceId::new(source_id).map_err(|e| corrupt(e.to_string()))?,
        event_date,
        xp_awarded: from_db_int(xp_awarded, "xp_awarded", user_id)?,
        created_at,
    })
}

#[async_trait]
impl RewardRepository for PgRewardRepository {
    #[instrument(skip(self, key), fields(key = %key))]
    async fn exists(&self, key: &IdempotencyKey) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(EXISTS_SQL)
            .bind(key.user_id)
            .bind(key.kind.as_str())
            .bind(key.source_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(infrastructure)
    }

    #[instrument(
        skip(self, reward, update),
        fields(key = %reward.key, event_id = %reward.event_id)
    )]
    async fn record_reward(
        &self,
        reward: &PendingReward,
        update: ProfileUpdate<'_>,
    ) -> Result<RecordResult, DomainError> {
        let user_id = reward.key.user_id;
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;

        let inserted: Option<Uuid> = sqlx::query_scalar(INSERT_EVENT_SQL)
            .bind(reward.event_id)
            .bind(user_id)
            .bind(reward.key.kind.as_str())
            .bind(reward.key.source_id.as_str())
            .bind(reward.event_date)
            .bind(to_db_int(reward.xp, "xp_awarded")?)
            .bind(reward.created_at)
            .fetch_optional(&mut *tx)
            .await
            .map_err(infrastructure)?;

        if inserted.is_none() {
            tx.rollback().await.map_err(infrastructure)?;
            debug!("idempotency key already present");
            return Ok(RecordResult::Duplicate);
        }

        sqlx::query(ENSURE_PROFILE_SQL)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(infrastructure)?;

        let row = sqlx::query(LOCK_PROFILE_SQL)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(infrastructure)?;
        let mut profile = profile_from_row(&row)?;

        update(&mut profile);

        let badge_codes: Vec<String> = profile
            .sorted_badge_codes()
            .into_iter()
            .map(str::to_owned)
            .collect();

        sqlx::query(UPDATE_PROFILE_SQL)
            .bind(user_id)
            .bind(i64::from(profile.xp))
            .bind(to_db_int(profile.streak.current_days, "current_streak_days")?)
            .bind(to_db_int(profile.streak.longest_days, "longest_streak_days")?)
            .bind(profile.streak.last_activity_date)
            .bind(badge_codes)
            .execute(&mut *tx)
            .await
            .map_err(infrastructure)?;

        tx.commit().await.map_err(infrastructure)?;

        Ok(RecordResult::Recorded {
            event: reward.clone().into_event(),
            profile,
        })
    }

    #[instrument(skip(self))]
    async fn load_profile(&self, user_id: Uuid) -> Result<GamificationProfile, DomainError> {
        let row = sqlx::query(SELECT_PROFILE_SQL)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;

        match row {
            Some(row) => profile_from_row(&row),
            None => Ok(GamificationProfile::new(user_id)),
        }
    }

    #[instrument(skip(self))]
    async fn list_events(&self, user_id: Uuid) -> Result<Vec<RewardEvent>, DomainError> {
        let rows = sqlx::query(LIST_EVENTS_SQL)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;

        rows.iter().map(event_from_row).collect()
    }
}
