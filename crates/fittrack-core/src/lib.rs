//! FitTrack Core — shared domain abstractions.
//!
//! This crate defines the reward engine's data model, the repository port
//! that storage adapters implement, and the clock seam. It contains no
//! reward logic and no infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod kinds;
pub mod profile;
pub mod repository;
