//! selquest-core — Progress and assessment scoring engine.
//!
//! This crate defines the data model, the pure rule components (streaks, XP,
//! badges, assessment scoring and comparison), the collaborator traits, and
//! the `ProgressEngine` that ties them together.

pub mod badges;
pub mod comparison;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod streak;
pub mod traits;
pub mod xp;
