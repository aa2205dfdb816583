//! Pixel-display front end planning.
//!
//! # Responsibility
//! - Produce renderer-agnostic layout plans for the LED tile.
//!
//! # Invariants
//! - Pixel rendering stays with the external display runtime; plans carry
//!   text, markers, styling constants and frame timing only.

pub mod plan;
