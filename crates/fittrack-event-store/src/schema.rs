//! Reward store database schema.
//!
//! The SQL lives in the workspace `migrations/` directory so that the server
//! and `#[sqlx::test]` apply the same schema.

use sqlx::migrate::Migrator;

/// Migrations creating `user_gamification` and `reward_events`.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Unique constraint over `(user_id, kind, source_id)` on `reward_events`.
pub const IDEMPOTENCY_CONSTRAINT: &str = "uq_reward_events_idempotency_key";
