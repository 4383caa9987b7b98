//! FitHero Core - Shared types library.
//!
//! This crate provides common types used across all FitHero components:
//! - `server` - Public JSON API (progression engine, tasks, achievements)
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, points, emails, and
//!   catalog enums
//! - [`progression`] - The level/character/job-title mapping tables

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod progression;
pub mod types;

pub use types::*;
