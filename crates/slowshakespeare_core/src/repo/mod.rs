//! Repository layer for persisted settings.
//!
//! # Responsibility
//! - Define the storage contract used by services.
//! - Isolate SQLite query details from use-case orchestration.

pub mod settings_repo;
