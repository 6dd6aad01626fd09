//! Shared test mocks and utilities for the FitTrack reward engine.

mod clock;
mod repository;

pub use clock::{FixedClock, utc_day};
pub use repository::{FailingRewardRepository, InMemoryRewardRepository};
