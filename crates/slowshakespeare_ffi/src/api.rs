//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose reading progress, settings and share links to Dart via FRB.
//! - Flatten core types into plain envelopes the generated bindings can carry.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures come back as `ok = false` plus a UTF-8 message, never as errors.
//! - Dates cross the boundary as `YYYY-MM-DD` strings.

use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use log::warn;
use slowshakespeare_core::db::open_db;
use slowshakespeare_core::{
    core_version as core_version_inner, format_date, init_logging as init_logging_inner,
    parse_start_date, plan_display, DisplayConfig, DisplayLine, DisplayMode, ProgressService,
    ServiceResult, Settings, SettingsPatch, SonnetCorpus, SqliteSettingsRepository, TodayView,
};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use url::Url;

const SETTINGS_DB_FILE_NAME: &str = "slowshakespeare.sqlite3";
static SETTINGS_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Sonnet entry for the selector control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SonnetItem {
    pub id: String,
    pub first_line: String,
}

/// Reader settings as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsItem {
    pub sonnet: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    pub color: String,
    pub show_lines: bool,
    /// Lines stay hidden until the reader taps to reveal them.
    pub self_test: bool,
}

/// Settings response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsResponse {
    pub ok: bool,
    pub settings: Option<SettingsItem>,
    pub message: String,
}

impl SettingsResponse {
    fn success(message: impl Into<String>, settings: &Settings) -> Self {
        Self {
            ok: true,
            settings: Some(to_settings_item(settings)),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            settings: None,
            message: message.into(),
        }
    }
}

/// Everything the reading page draws for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayResponse {
    pub ok: bool,
    pub settings: Option<SettingsItem>,
    /// Sonnet being read today (after auto-advance).
    pub selected_sonnet: String,
    /// Zero-based day inside the fourteen-day cycle.
    pub day_within_cycle: u32,
    pub lines_revealed: u32,
    pub lines: Vec<String>,
    /// Stored start date lies after today; progress was clamped.
    pub future_start: bool,
    /// Stored sonnet is not in the corpus; reading started from the first.
    pub unknown_sonnet: bool,
    pub message: String,
}

impl TodayResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            settings: None,
            selected_sonnet: String::new(),
            day_within_cycle: 0,
            lines_revealed: 0,
            lines: Vec::new(),
            future_start: false,
            unknown_sonnet: false,
            message: message.into(),
        }
    }
}

/// Share link response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinkResponse {
    pub ok: bool,
    pub url: Option<String>,
    pub message: String,
}

/// One line placed on the pixel tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLineItem {
    pub index: u32,
    pub text: String,
    pub marked: bool,
}

/// Pixel-display plan for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPlanResponse {
    pub ok: bool,
    /// `true` when `lines` are frames shown one at a time.
    pub review: bool,
    /// Per-frame delay in review mode, `0` otherwise.
    pub delay_ms: u32,
    pub sonnet_id: String,
    pub color: String,
    pub lines: Vec<DisplayLineItem>,
    pub message: String,
}

/// Lists the corpus in reading order.
///
/// # FFI contract
/// - Sync call, in-memory only.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn list_sonnets() -> Vec<SonnetItem> {
    SonnetCorpus::builtin()
        .iter()
        .map(|sonnet| SonnetItem {
            id: sonnet.id.clone(),
            first_line: sonnet.first_line().to_string(),
        })
        .collect()
}

/// Checks a start-date input field.
///
/// Returns empty string when `raw` is a valid `YYYY-MM-DD` calendar date and
/// the reason otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn validate_start_date(raw: String) -> String {
    match parse_start_date(&raw) {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Loads stored settings, defaulting missing or invalid values.
///
/// `today`: optional `YYYY-MM-DD`; the local date when absent.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn load_settings(today: Option<String>) -> SettingsResponse {
    load_settings_at(&resolve_settings_db_path(), today.as_deref())
}

/// Updates the given settings fields and persists the result.
///
/// `None` keeps the stored value.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; invalid sonnet, date or blank color return `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn update_settings(
    sonnet: Option<String>,
    start_date: Option<String>,
    color: Option<String>,
    show_lines: Option<bool>,
    self_test: Option<bool>,
) -> SettingsResponse {
    let request = SettingsRequest {
        sonnet,
        start_date,
        color,
        show_lines,
        self_test,
    };
    update_settings_at(&resolve_settings_db_path(), &request, None)
}

/// Builds today's reading page from stored settings.
///
/// `today`: optional `YYYY-MM-DD`; the local date when absent.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn today_view(today: Option<String>) -> TodayResponse {
    today_view_at(&resolve_settings_db_path(), today.as_deref())
}

/// Builds a share link for the stored settings on top of `base`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; an unparsable `base` returns `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn share_link(base: String) -> ShareLinkResponse {
    share_link_at(&resolve_settings_db_path(), &base, None)
}

/// Applies settings carried by an opened share link and persists them.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; a link without usable values returns `ok = false` and
///   leaves the store untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn import_link(link: String) -> SettingsResponse {
    import_link_at(&resolve_settings_db_path(), &link, None)
}

/// Plans one render pass of the pixel display.
///
/// `start_date` accepts RFC 3339 or `YYYY-MM-DD`; `at` is an RFC 3339
/// instant and defaults to now in the local zone.
///
/// # FFI contract
/// - Sync call, in-memory only.
/// - Never panics; only an unparsable `at` returns `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn display_plan(
    sonnet: Option<String>,
    color: Option<String>,
    start_date: Option<String>,
    at: Option<String>,
) -> DisplayPlanResponse {
    let now = match at.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match DateTime::parse_from_rfc3339(raw) {
            Ok(now) => now,
            Err(err) => {
                let message = failure_message("display_plan", format!("bad instant: {err}"));
                return display_failure(message);
            }
        },
        _ => Local::now().fixed_offset(),
    };
    let config = DisplayConfig {
        sonnet,
        color,
        start_date,
    };
    build_display_plan(&config, &now)
}

struct SettingsRequest {
    sonnet: Option<String>,
    start_date: Option<String>,
    color: Option<String>,
    show_lines: Option<bool>,
    self_test: Option<bool>,
}

fn load_settings_at(db_path: &Path, today: Option<&str>) -> SettingsResponse {
    let today = match resolve_today(today) {
        Ok(today) => today,
        Err(err) => return SettingsResponse::failure(failure_message("load_settings", err)),
    };
    match with_progress_service(db_path, |service| service.load_settings(today)) {
        Ok(settings) => SettingsResponse::success("Settings loaded.", &settings),
        Err(err) => SettingsResponse::failure(failure_message("load_settings", err)),
    }
}

fn update_settings_at(
    db_path: &Path,
    request: &SettingsRequest,
    today: Option<&str>,
) -> SettingsResponse {
    let start_date = match request.start_date.as_deref() {
        Some(raw) => match parse_start_date(raw) {
            Ok(date) => Some(date),
            Err(err) => {
                return SettingsResponse::failure(failure_message("update_settings", err));
            }
        },
        None => None,
    };
    let patch = SettingsPatch {
        sonnet: request.sonnet.as_ref().map(|value| value.trim().to_string()),
        start_date,
        color: request.color.as_ref().map(|value| value.trim().to_string()),
        show_lines: request.show_lines,
        self_test: request.self_test,
    };
    if patch.is_empty() {
        let message = failure_message("update_settings", "nothing to change");
        return SettingsResponse::failure(message);
    }

    let today = match resolve_today(today) {
        Ok(today) => today,
        Err(err) => return SettingsResponse::failure(failure_message("update_settings", err)),
    };
    match with_progress_service(db_path, |service| service.update_settings(today, &patch)) {
        Ok(settings) => SettingsResponse::success("Settings saved.", &settings),
        Err(err) => SettingsResponse::failure(failure_message("update_settings", err)),
    }
}

fn today_view_at(db_path: &Path, today: Option<&str>) -> TodayResponse {
    let today = match resolve_today(today) {
        Ok(today) => today,
        Err(err) => return TodayResponse::failure(failure_message("today_view", err)),
    };
    match with_progress_service(db_path, |service| service.today_view(today)) {
        Ok(view) => to_today_response(view),
        Err(err) => TodayResponse::failure(failure_message("today_view", err)),
    }
}

fn share_link_at(db_path: &Path, base: &str, today: Option<&str>) -> ShareLinkResponse {
    let failure = |message: String| ShareLinkResponse {
        ok: false,
        url: None,
        message,
    };
    let base = match Url::parse(base.trim()) {
        Ok(base) => base,
        Err(err) => {
            return failure(failure_message(
                "share_link",
                format!("bad base url: {err}"),
            ))
        }
    };
    let today = match resolve_today(today) {
        Ok(today) => today,
        Err(err) => return failure(failure_message("share_link", err)),
    };
    match with_progress_service(db_path, |service| service.load_settings(today)) {
        Ok(settings) => ShareLinkResponse {
            ok: true,
            url: Some(settings.share_url(&base).to_string()),
            message: "Share link ready.".to_string(),
        },
        Err(err) => failure(failure_message("share_link", err)),
    }
}

fn import_link_at(db_path: &Path, link: &str, today: Option<&str>) -> SettingsResponse {
    let link = match Url::parse(link.trim()) {
        Ok(link) => link,
        Err(err) => return SettingsResponse::failure(failure_message("import_link", err)),
    };
    let today = match resolve_today(today) {
        Ok(today) => today,
        Err(err) => return SettingsResponse::failure(failure_message("import_link", err)),
    };
    match with_progress_service(db_path, |service| service.import_link(today, &link)) {
        Ok((_, 0)) => {
            SettingsResponse::failure(failure_message("import_link", "link carried no settings"))
        }
        Ok((settings, applied)) => {
            SettingsResponse::success(format!("Applied {applied} setting(s)."), &settings)
        }
        Err(err) => SettingsResponse::failure(failure_message("import_link", err)),
    }
}

fn build_display_plan(config: &DisplayConfig, now: &DateTime<FixedOffset>) -> DisplayPlanResponse {
    let plan = plan_display(SonnetCorpus::builtin(), config, now);
    let (review, delay_ms, lines) = match plan.mode {
        DisplayMode::Static { lines } => (false, 0, lines),
        DisplayMode::Review { frames, delay_ms } => (true, delay_ms, frames),
    };
    DisplayPlanResponse {
        ok: true,
        review,
        delay_ms,
        sonnet_id: plan.progress.current_sonnet_id,
        color: plan.style.color,
        lines: lines.into_iter().map(to_display_line_item).collect(),
        message: String::new(),
    }
}

fn display_failure(message: String) -> DisplayPlanResponse {
    DisplayPlanResponse {
        ok: false,
        review: false,
        delay_ms: 0,
        sonnet_id: String::new(),
        color: String::new(),
        lines: Vec::new(),
        message,
    }
}

fn failure_message(operation: &str, err: impl Display) -> String {
    warn!("event=ffi_call module=ffi status=error op={operation} error={err}");
    format!("{operation} failed: {err}")
}

fn resolve_today(raw: Option<&str>) -> Result<NaiveDate, String> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_start_date(raw).map_err(|err| err.to_string()),
        _ => Ok(Local::now().date_naive()),
    }
}

fn resolve_settings_db_path() -> PathBuf {
    SETTINGS_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("SLOWSHAKESPEARE_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(SETTINGS_DB_FILE_NAME)
        })
        .clone()
}

fn with_progress_service<T>(
    db_path: &Path,
    f: impl FnOnce(&ProgressService<'static, SqliteSettingsRepository<'_>>) -> ServiceResult<T>,
) -> Result<T, String> {
    let conn = open_db(db_path).map_err(|err| format!("settings DB open failed: {err}"))?;
    let service = ProgressService::new(SqliteSettingsRepository::new(&conn));
    f(&service).map_err(|err| err.to_string())
}

fn to_settings_item(settings: &Settings) -> SettingsItem {
    SettingsItem {
        sonnet: settings.sonnet.clone(),
        start_date: format_date(settings.start_date),
        color: settings.color.clone(),
        show_lines: settings.show_lines,
        self_test: settings.self_test,
    }
}

fn to_today_response(view: TodayView) -> TodayResponse {
    TodayResponse {
        ok: true,
        settings: Some(to_settings_item(&view.settings)),
        selected_sonnet: view.selected_sonnet,
        day_within_cycle: view.progress.day_within_cycle,
        lines_revealed: view.progress.lines_revealed,
        lines: view.lines,
        future_start: view.recovery.future_start,
        unknown_sonnet: view.recovery.unknown_sonnet,
        message: String::new(),
    }
}

fn to_display_line_item(line: DisplayLine) -> DisplayLineItem {
    DisplayLineItem {
        index: line.index as u32,
        text: line.text,
        marked: line.marked,
    }
}
