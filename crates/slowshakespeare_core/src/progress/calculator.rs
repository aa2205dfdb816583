//! Day/sonnet advancement calculator.
//!
//! # Responsibility
//! - Map `(corpus, cycle config, today)` to the sonnet and line count to show.
//!
//! # Invariants
//! - Total: every input yields a `Progress`, never an error.
//! - Pure: no I/O, no logging, no retained state between calls.
//! - `lines_revealed` is in `[1, 14]`, `day_within_cycle` is in `[0, 13]`.
//! - A future start date counts as day 0; an unknown initial sonnet counts as
//!   the first corpus entry.

use crate::model::corpus::{Sonnet, SonnetCorpus, SONNET_LINE_COUNT};
use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Days spent on one sonnet before advancing to the next.
pub const CYCLE_DAYS: u64 = SONNET_LINE_COUNT as u64;

/// User-chosen starting point of a reading cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Calendar day on which `initial_sonnet_id` showed its first line.
    pub start_date: NaiveDate,
    pub initial_sonnet_id: String,
}

impl CycleConfig {
    pub fn new(start_date: NaiveDate, initial_sonnet_id: impl Into<String>) -> Self {
        Self {
            start_date,
            initial_sonnet_id: initial_sonnet_id.into(),
        }
    }
}

/// Computed reading position for one day. A value, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current_sonnet_id: String,
    /// Number of leading lines visible today, `1..=14`.
    pub lines_revealed: u32,
    /// Zero-based day inside the current sonnet's cycle, `0..=13`.
    pub day_within_cycle: u32,
    pub elapsed_days_clamped: u64,
}

impl Progress {
    /// Returns the revealed prefix of the current sonnet's lines.
    ///
    /// Returns an empty slice when `corpus` does not contain the current
    /// sonnet (i.e. the progress was computed against another corpus).
    pub fn revealed_lines<'c>(&self, corpus: &'c SonnetCorpus) -> &'c [String] {
        match corpus.get(&self.current_sonnet_id) {
            Some(sonnet) => {
                let end = (self.lines_revealed as usize).min(sonnet.lines.len());
                &sonnet.lines[..end]
            }
            None => &[],
        }
    }
}

/// Which defensive clamps were applied while computing a `Progress`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recovery {
    /// Start date was after today; elapsed days were clamped to 0.
    pub future_start: bool,
    /// Initial sonnet id was not in the corpus; index 0 was used.
    pub unknown_sonnet: bool,
}

impl Recovery {
    /// Returns whether the inputs were used as given.
    pub fn is_clean(&self) -> bool {
        !self.future_start && !self.unknown_sonnet
    }
}

/// `Progress` together with the clamps that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub progress: Progress,
    pub recovery: Recovery,
}

/// Computes today's reading position.
///
/// Equivalent to `evaluate(..).progress`.
pub fn compute_progress(corpus: &SonnetCorpus, config: &CycleConfig, today: NaiveDate) -> Progress {
    evaluate(corpus, config, today).progress
}

/// Computes the reading position for the calendar date of `now`.
///
/// The day boundary is that of `now`'s time zone, so callers pick local or
/// UTC midnight by choosing the zone.
pub fn compute_progress_at<Tz: TimeZone>(
    corpus: &SonnetCorpus,
    config: &CycleConfig,
    now: &DateTime<Tz>,
) -> Progress {
    compute_progress(corpus, config, now.date_naive())
}

/// Computes today's reading position and reports applied clamps.
pub fn evaluate(corpus: &SonnetCorpus, config: &CycleConfig, today: NaiveDate) -> Evaluation {
    let elapsed_days = today.signed_duration_since(config.start_date).num_days();
    let elapsed_days_clamped = elapsed_days.max(0).unsigned_abs();

    let start_index = corpus.position(&config.initial_sonnet_id);

    let cycles_completed = elapsed_days_clamped / CYCLE_DAYS;
    let day_within_cycle = elapsed_days_clamped % CYCLE_DAYS;

    let len = corpus.len() as u64;
    let current_index = (start_index.unwrap_or(0) as u64 + cycles_completed % len) % len;
    let current: &Sonnet = corpus.at_wrapping(current_index as usize);

    let lines_revealed = (day_within_cycle + 1).min(CYCLE_DAYS);

    Evaluation {
        progress: Progress {
            current_sonnet_id: current.id.clone(),
            lines_revealed: lines_revealed as u32,
            day_within_cycle: day_within_cycle as u32,
            elapsed_days_clamped,
        },
        recovery: Recovery {
            future_start: elapsed_days < 0,
            unknown_sonnet: start_index.is_none(),
        },
    }
}
