//! Reading-cycle progress.
//!
//! # Responsibility
//! - Own the single advancement formula consumed by every front end.
//!
//! # Invariants
//! - One cycle is 14 days; after the last corpus entry, advancement wraps to
//!   the first.

pub mod calculator;
