//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate settings storage and progress evaluation into use-case APIs.
//! - Keep CLI/FFI layers decoupled from storage details.

pub mod progress_service;
