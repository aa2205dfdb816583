//! Core logic for Slow Shakespeare.
//!
//! One sonnet line more per day, fourteen days per sonnet. This crate is the
//! single source of the corpus text and the advancement formula; the pixel
//! display, CLI and app front ends all go through it.

pub mod db;
pub mod display;
pub mod logging;
pub mod model;
pub mod progress;
pub mod repo;
pub mod service;

pub use display::plan::{
    plan_display, DisplayConfig, DisplayLine, DisplayMode, DisplayPlan, DisplayStyle,
    REVIEW_FRAME_DELAY_MS, REVIEW_MINUTE, REVIEW_PASSES,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::corpus::{CorpusError, Sonnet, SonnetCorpus, SONNET_LINE_COUNT};
pub use model::settings::{
    format_date, parse_start_date, DateParseError, Settings, DEFAULT_COLOR, DEFAULT_SONNET_ID,
    SETTINGS_STORAGE_KEY,
};
pub use model::sonnets::SONNET_ORDER;
pub use progress::calculator::{
    compute_progress, compute_progress_at, evaluate, CycleConfig, Evaluation, Progress, Recovery,
    CYCLE_DAYS,
};
pub use repo::settings_repo::{RepoError, RepoResult, SettingsRepository, SqliteSettingsRepository};
pub use service::progress_service::{
    build_today_view, ProgressService, ServiceError, ServiceResult, SettingsPatch, TodayView,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
