//! Day-streak state transitions.

use chrono::NaiveDate;
use fittrack_core::profile::StreakState;

/// Which branch a streak update took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// First ever activity.
    Started,
    /// Another activity on the day already counted. Nothing changed.
    SameDay,
    /// Activity on the day after the last one.
    Extended,
    /// Activity after a gap of at least one empty day.
    Broken,
    /// Today precedes the last activity date. Treated as a fresh start.
    ClockAnomaly,
}

/// Advances `state` for an activity on `today`.
///
/// A same-day activity returns before anything is written, so it never counts
/// as streak progress.
pub fn advance(state: &mut StreakState, today: NaiveDate) -> StreakTransition {
    let entry_days = state.current_days;

    let transition = match state.last_activity_date {
        None => StreakTransition::Started,
        Some(last) if today == last => return StreakTransition::SameDay,
        Some(last) if last.succ_opt() == Some(today) => StreakTransition::Extended,
        Some(last) if today > last => StreakTransition::Broken,
        Some(_) => StreakTransition::ClockAnomaly,
    };

    state.current_days = match transition {
        StreakTransition::Extended => state.current_days.saturating_add(1),
        _ => 1,
    };

    if state.current_days > entry_days && state.current_days > state.longest_days {
        state.longest_days = state.current_days;
    }
    state.last_activity_date = Some(today);

    transition
}
