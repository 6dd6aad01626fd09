//! `PostgreSQL` storage for the FitTrack reward engine.

pub mod pg_reward_repository;
pub mod schema;
