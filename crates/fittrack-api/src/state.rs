//! Shared application state.

use std::sync::Arc;

use fittrack_core::clock::Clock;
use fittrack_core::repository::RewardRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of the current UTC date for reward dating.
    pub clock: Arc<dyn Clock>,
    /// Reward log and profile store.
    pub reward_repository: Arc<dyn RewardRepository>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        reward_repository: Arc<dyn RewardRepository>,
    ) -> Self {
        Self {
            clock,
            reward_repository,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
