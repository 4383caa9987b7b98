//! Catalog enums for tasks and achievements.
//!
//! Catalog rows store these as plain TEXT; the `as_str`/`FromStr` pairs are
//! the single source of truth for the wire and storage spelling.

use serde::{Deserialize, Serialize};

/// Error returned when a stored or submitted enum value is not recognized.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    /// Which enum failed to parse.
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}

/// Task category in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Cardio,
    Strength,
    Flexibility,
    Wellness,
}

impl TaskCategory {
    /// Storage/wire spelling of this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cardio => "cardio",
            Self::Strength => "strength",
            Self::Flexibility => "flexibility",
            Self::Wellness => "wellness",
        }
    }
}

impl std::str::FromStr for TaskCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cardio" => Ok(Self::Cardio),
            "strength" => Ok(Self::Strength),
            "flexibility" => Ok(Self::Flexibility),
            "wellness" => Ok(Self::Wellness),
            other => Err(UnknownVariant {
                kind: "task category",
                value: other.to_owned(),
            }),
        }
    }
}

/// Task difficulty in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDifficulty {
    Easy,
    Medium,
    Hard,
}

impl TaskDifficulty {
    /// Storage/wire spelling of this difficulty.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::str::FromStr for TaskDifficulty {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(UnknownVariant {
                kind: "task difficulty",
                value: other.to_owned(),
            }),
        }
    }
}

/// What unlocking an achievement does to the user beyond the point debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    /// Unlock sets the user's display character to the achievement title.
    Character,
    /// Unlock maps the achievement title through the job-title table.
    JobTitle,
    /// Cosmetic only - no side effect.
    Badge,
}

impl AchievementKind {
    /// Storage/wire spelling of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::JobTitle => "job_title",
            Self::Badge => "badge",
        }
    }
}

impl std::str::FromStr for AchievementKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "character" => Ok(Self::Character),
            "job_title" => Ok(Self::JobTitle),
            "badge" => Ok(Self::Badge),
            other => Err(UnknownVariant {
                kind: "achievement kind",
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for cat in [
            TaskCategory::Cardio,
            TaskCategory::Strength,
            TaskCategory::Flexibility,
            TaskCategory::Wellness,
        ] {
            assert_eq!(cat.as_str().parse::<TaskCategory>().unwrap(), cat);
        }
    }

    #[test]
    fn test_difficulty_roundtrip() {
        for diff in [
            TaskDifficulty::Easy,
            TaskDifficulty::Medium,
            TaskDifficulty::Hard,
        ] {
            assert_eq!(diff.as_str().parse::<TaskDifficulty>().unwrap(), diff);
        }
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            AchievementKind::Character,
            AchievementKind::JobTitle,
            AchievementKind::Badge,
        ] {
            assert_eq!(kind.as_str().parse::<AchievementKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_variant() {
        let err = "sprinting".parse::<TaskCategory>().unwrap_err();
        assert_eq!(err.kind, "task category");
        assert_eq!(err.value, "sprinting");
    }

    #[test]
    fn test_serde_spelling_matches_as_str() {
        let json = serde_json::to_string(&AchievementKind::JobTitle).unwrap();
        assert_eq!(json, "\"job_title\"");
    }
}
