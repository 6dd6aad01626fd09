//! FitTrack — Gamification bounded context.
//!
//! Turns user activity into experience points, a day streak and badges.
//! Every rewardable occurrence is identified by an idempotency key and is
//! rewarded at most once.

pub mod application;
pub mod domain;
