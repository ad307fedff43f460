//! selquest-store — Collaborator implementations for the progress engine.
//!
//! Provides in-memory and JSON-file stores with compare-and-swap progress
//! writes, a TTL read cache, config-driven feature flags, a mock text
//! analyzer, and configuration loading.

pub mod cache;
pub mod config;
pub mod file;
pub mod flags;
pub mod memory;
pub mod mock;

pub use cache::CachedStore;
pub use config::{load_config, load_config_from, SelquestConfig};
pub use file::JsonFileStore;
pub use flags::StaticFlags;
pub use memory::MemoryStore;
pub use mock::MockAnalyzer;
