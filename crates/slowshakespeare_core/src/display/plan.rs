//! Pixel-display layout planning.
//!
//! # Responsibility
//! - Resolve the tile's configuration (`sonnet`, `color`, `start_date`).
//! - Turn one progress snapshot into either a static page of revealed lines
//!   or the top-of-the-hour review animation.
//!
//! # Invariants
//! - Review mode fires only when the minute of `now` is zero.
//! - Review replays lines `1..=revealed` three times, one line per frame,
//!   5000 ms per frame, from a single progress snapshot.
//! - Line index 0 is always the marked line.

use crate::model::corpus::SonnetCorpus;
use crate::model::settings::{parse_start_date, DEFAULT_COLOR, DEFAULT_SONNET_ID};
use crate::progress::calculator::{compute_progress, CycleConfig, Progress};
use chrono::{DateTime, NaiveDate, TimeZone, Timelike};
use log::debug;
use serde::{Deserialize, Serialize};

/// Minute of the hour that switches the tile into review mode.
pub const REVIEW_MINUTE: u32 = 0;
/// How many times review replays the revealed lines.
pub const REVIEW_PASSES: usize = 3;
/// Per-frame delay of the review animation.
pub const REVIEW_FRAME_DELAY_MS: u32 = 5000;

/// Tile configuration as delivered by the display runtime.
///
/// Every field is optional; missing values take the tile defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub sonnet: Option<String>,
    pub color: Option<String>,
    /// RFC 3339 timestamp (date pickers send midnight of the chosen day).
    /// A bare `YYYY-MM-DD` is accepted too.
    pub start_date: Option<String>,
}

impl DisplayConfig {
    /// Resolves the cycle configuration relative to `now`.
    ///
    /// A missing or unreadable start date starts the cycle today. The start
    /// timestamp is moved into `now`'s zone before taking its calendar date.
    pub fn cycle_config<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> CycleConfig {
        let start_date = self
            .start_date
            .as_deref()
            .and_then(|raw| parse_start_timestamp(raw, now))
            .unwrap_or_else(|| now.date_naive());
        let sonnet = self
            .sonnet
            .clone()
            .unwrap_or_else(|| DEFAULT_SONNET_ID.to_string());
        CycleConfig::new(start_date, sonnet)
    }

    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_COLOR)
    }
}

fn parse_start_timestamp<Tz: TimeZone>(raw: &str, now: &DateTime<Tz>) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&now.timezone()).date_naive());
    }
    parse_start_date(raw).ok()
}

/// Fixed text styling handed to the renderer with every plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayStyle {
    pub color: String,
    pub font: String,
    pub align: String,
    /// Left, top, right, bottom.
    pub padding: [u8; 4],
    /// Diameter of the dot drawn next to the first line.
    pub marker_diameter: u8,
}

impl DisplayStyle {
    fn with_color(color: &str) -> Self {
        Self {
            color: color.to_string(),
            font: "tom-thumb".to_string(),
            align: "left".to_string(),
            padding: [2, 2, 2, 2],
            marker_diameter: 3,
        }
    }
}

/// One line of sonnet text placed on the tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLine {
    /// Zero-based line index inside the sonnet.
    pub index: usize,
    pub text: String,
    /// `true` for the sonnet's first line.
    pub marked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DisplayMode {
    /// All revealed lines at once.
    Static { lines: Vec<DisplayLine> },
    /// One line per frame, advancing every `delay_ms`.
    Review {
        frames: Vec<DisplayLine>,
        delay_ms: u32,
    },
}

/// Layout plan for one render pass of the tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPlan {
    pub progress: Progress,
    pub style: DisplayStyle,
    #[serde(flatten)]
    pub mode: DisplayMode,
}

impl DisplayPlan {
    pub fn is_review(&self) -> bool {
        matches!(self.mode, DisplayMode::Review { .. })
    }
}

/// Plans one render pass of the pixel display.
pub fn plan_display<Tz: TimeZone>(
    corpus: &SonnetCorpus,
    config: &DisplayConfig,
    now: &DateTime<Tz>,
) -> DisplayPlan {
    let cycle = config.cycle_config(now);
    let progress = compute_progress(corpus, &cycle, now.date_naive());
    let sonnet = corpus
        .get(&progress.current_sonnet_id)
        .unwrap_or_else(|| corpus.first());

    let mut lines_learned = progress.lines_revealed as usize;
    if lines_learned > sonnet.lines.len() {
        lines_learned = sonnet.lines.len();
    }
    if lines_learned < 1 {
        lines_learned = 1;
    }

    let lines = sonnet
        .lines
        .iter()
        .take(lines_learned)
        .enumerate()
        .map(|(i, text)| DisplayLine {
            index: i,
            text: text.clone(),
            marked: i == 0,
        })
        .collect::<Vec<_>>();

    let current_minute = now.minute();
    let mode = if current_minute == REVIEW_MINUTE {
        let mut frames = Vec::with_capacity(lines.len() * REVIEW_PASSES);
        for _ in 0..REVIEW_PASSES {
            frames.extend(lines.iter().cloned());
        }
        DisplayMode::Review {
            frames,
            delay_ms: REVIEW_FRAME_DELAY_MS,
        }
    } else {
        DisplayMode::Static { lines }
    };

    debug!(
        "event=display_plan module=display status=ok mode={} sonnet={} lines={}",
        if current_minute == REVIEW_MINUTE { "review" } else { "static" },
        progress.current_sonnet_id,
        lines_learned
    );

    DisplayPlan {
        progress,
        style: DisplayStyle::with_color(config.color()),
        mode,
    }
}
