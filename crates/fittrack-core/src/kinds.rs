//! Closed code sets and identifiers shared by the reward engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::DomainError;

/// Maximum length of a source id, matching the storage column width.
pub const MAX_SOURCE_ID_LEN: usize = 255;

/// A stored or transmitted code that does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {set} code: {code:?}")]
pub struct UnknownCode {
    /// Which code set was being parsed.
    pub set: &'static str,
    /// The offending code.
    pub code: String,
}

/// The kind of activity being rewarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardKind {
    /// A weekly progress record was saved.
    WeeklyProgress,
    /// A meal plan was generated.
    MealPlanCreated,
    /// A body analysis was created.
    BodyAnalysisCreated,
    /// The daily challenge was completed.
    DailyChallengeCompleted,
}

impl RewardKind {
    /// Every reward kind, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::WeeklyProgress,
        Self::MealPlanCreated,
        Self::BodyAnalysisCreated,
        Self::DailyChallengeCompleted,
    ];

    /// Returns the wire/storage code for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WeeklyProgress => "WEEKLY_PROGRESS",
            Self::MealPlanCreated => "MEAL_PLAN_CREATED",
            Self::BodyAnalysisCreated => "BODY_ANALYSIS_CREATED",
            Self::DailyChallengeCompleted => "DAILY_CHALLENGE_COMPLETED",
        }
    }
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardKind {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownCode {
                set: "reward kind",
                code: s.to_owned(),
            })
    }
}

/// A permanent achievement unlocked by crossing an XP or streak threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BadgeCode {
    /// Any activity has ever been rewarded.
    #[serde(rename = "FIRST_LOG")]
    FirstLog,
    /// Three-day streak.
    #[serde(rename = "STREAK_3")]
    Streak3,
    /// Seven-day streak.
    #[serde(rename = "STREAK_7")]
    Streak7,
    /// Thirty-day streak.
    #[serde(rename = "STREAK_30")]
    Streak30,
    /// 100 XP earned.
    #[serde(rename = "XP_100")]
    Xp100,
    /// 500 XP earned.
    #[serde(rename = "XP_500")]
    Xp500,
}

impl BadgeCode {
    /// Every badge code, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::FirstLog,
        Self::Streak3,
        Self::Streak7,
        Self::Streak30,
        Self::Xp100,
        Self::Xp500,
    ];

    /// Returns the wire/storage code for this badge.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstLog => "FIRST_LOG",
            Self::Streak3 => "STREAK_3",
            Self::Streak7 => "STREAK_7",
            Self::Streak30 => "STREAK_30",
            Self::Xp100 => "XP_100",
            Self::Xp500 => "XP_500",
        }
    }
}

impl fmt::Display for BadgeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeCode {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|badge| badge.as_str() == s)
            .ok_or_else(|| UnknownCode {
                set: "badge",
                code: s.to_owned(),
            })
    }
}

/// Caller-supplied identifier of the occurrence being rewarded, e.g. a
/// weekly-progress record id or, for daily challenges, the ISO date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Creates a source id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the value is blank or longer than
    /// [`MAX_SOURCE_ID_LEN`] bytes.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::Validation("source_id must not be empty".into()));
        }
        if value.len() > MAX_SOURCE_ID_LEN {
            return Err(DomainError::Validation(format!(
                "source_id must be at most {MAX_SOURCE_ID_LEN} bytes, got {}",
                value.len()
            )));
        }
        Ok(Self(value))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// The `(user, kind, source)` triple that identifies a rewardable occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey {
    /// Owner of the occurrence.
    pub user_id: Uuid,
    /// Kind of activity.
    pub kind: RewardKind,
    /// Occurrence identifier.
    pub source_id: SourceId,
}

impl IdempotencyKey {
    /// Creates a key.
    #[must_use]
    pub fn new(user_id: Uuid, kind: RewardKind, source_id: SourceId) -> Self {
        Self {
            user_id,
            kind,
            source_id,
        }
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.user_id, self.kind, self.source_id)
    }
}
