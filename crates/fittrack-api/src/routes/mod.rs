//! Route modules.

pub mod gamification;
pub mod health;
