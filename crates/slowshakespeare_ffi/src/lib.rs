//! Flutter bridge for Slow Shakespeare.

pub mod api;
