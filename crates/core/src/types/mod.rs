//! Core types for FitHero.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod points;

pub use catalog::{AchievementKind, TaskCategory, TaskDifficulty, UnknownVariant};
pub use email::{Email, EmailError};
pub use id::*;
pub use points::{Points, PointsError};
