//! Domain model shared by all front ends.
//!
//! # Responsibility
//! - Define the sonnet corpus and its embedded text.
//! - Define the persisted settings record and its input validation.
//!
//! # Invariants
//! - Sonnet text exists in exactly one place (`sonnets`), so both front ends
//!   render identical lines.

pub mod corpus;
pub mod settings;
pub mod sonnets;
