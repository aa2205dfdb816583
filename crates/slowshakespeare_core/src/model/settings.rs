//! Persisted reader settings.
//!
//! # Responsibility
//! - Define the single settings record stored under `SETTINGS_STORAGE_KEY`.
//! - Validate user-, storage- and link-supplied values before they are used.
//! - Build and read share links carrying the same settings.
//!
//! # Invariants
//! - A `Settings` value always names a sonnet contained in the corpus it was
//!   validated against.
//! - Start dates come only from strict `YYYY-MM-DD` input naming a real
//!   calendar day.
//! - Loading never fails: invalid fields fall back to defaults one by one.

use crate::model::corpus::SonnetCorpus;
use crate::progress::calculator::CycleConfig;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

/// Storage key of the serialized settings record.
pub const SETTINGS_STORAGE_KEY: &str = "slowshakespeare";
/// Sonnet used when none (or an unknown one) is configured.
pub const DEFAULT_SONNET_ID: &str = "18";
/// "Salad Days" green; the pixel display's default text color.
pub const DEFAULT_COLOR: &str = "#6B8E6B";

const DATE_FORMAT: &str = "%Y-%m-%d";

const PARAM_SONNET: &str = "sonnet";
const PARAM_START: &str = "start";
const PARAM_COLOR: &str = "color";
const PARAM_LINES: &str = "lines";

const FIELD_SONNET: &str = "sonnet";
const FIELD_START_DATE: &str = "startDate";
const FIELD_COLOR: &str = "color";
const FIELD_SHOW_LINES: &str = "showLines";
const FIELD_SELF_TEST: &str = "selfTest";

// ASCII only; `\d` would also admit other scripts' digits.
static DATE_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date shape regex")
});

/// Reader settings shared by the app front ends.
///
/// Serialized as `{ "sonnet", "startDate", "color", "showLines", "selfTest" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Sonnet the cycle started on. Not rewritten by auto-advancement.
    pub sonnet: String,
    pub start_date: NaiveDate,
    /// Opaque color token handed to the renderer.
    pub color: String,
    /// Whether the revealed lines are listed on the reading page.
    pub show_lines: bool,
    /// Self-test: revealed lines stay hidden until the reader reveals them.
    #[serde(default)]
    pub self_test: bool,
}

impl Settings {
    /// Default settings for a cycle starting on `today`.
    pub fn defaults(today: NaiveDate) -> Self {
        Self {
            sonnet: DEFAULT_SONNET_ID.to_string(),
            start_date: today,
            color: DEFAULT_COLOR.to_string(),
            show_lines: true,
            self_test: false,
        }
    }

    /// Restores settings from a stored JSON record.
    ///
    /// Each field is checked on its own: an unknown sonnet, a malformed
    /// date, a blank color or a value of the wrong JSON type falls back to
    /// its default without touching the others. A numeric sonnet id is read
    /// through its decimal form. Unparseable JSON yields
    /// `Settings::defaults(today)`.
    pub fn from_stored_json(json: &str, corpus: &SonnetCorpus, today: NaiveDate) -> Self {
        let mut settings = Self::defaults(today);
        let Ok(Value::Object(stored)) = serde_json::from_str::<Value>(json) else {
            return settings;
        };

        if let Some(sonnet) = stored
            .get(FIELD_SONNET)
            .and_then(stored_sonnet_id)
            .filter(|id| corpus.contains(id))
        {
            settings.sonnet = sonnet;
        }
        if let Some(start) = stored
            .get(FIELD_START_DATE)
            .and_then(Value::as_str)
            .and_then(|raw| parse_start_date(raw).ok())
        {
            settings.start_date = start;
        }
        if let Some(color) = stored
            .get(FIELD_COLOR)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
        {
            settings.color = color.to_string();
        }
        if let Some(show_lines) = stored.get(FIELD_SHOW_LINES).and_then(Value::as_bool) {
            settings.show_lines = show_lines;
        }
        if let Some(self_test) = stored.get(FIELD_SELF_TEST).and_then(Value::as_bool) {
            settings.self_test = self_test;
        }
        settings
    }

    /// Serializes this record for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Overlays share-link query parameters (`sonnet`, `start`, `color`,
    /// `lines=on|off`). A leading `?` is accepted.
    ///
    /// Invalid or unknown parameters are ignored. Returns how many values
    /// were applied.
    pub fn apply_query(&mut self, query: &str, corpus: &SonnetCorpus) -> usize {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut applied = 0;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let accepted = match &*key {
                PARAM_SONNET if corpus.contains(&value) => {
                    self.sonnet = value.into_owned();
                    true
                }
                PARAM_START => match parse_start_date(&value) {
                    Ok(date) => {
                        self.start_date = date;
                        true
                    }
                    Err(_) => false,
                },
                PARAM_COLOR if !value.trim().is_empty() => {
                    self.color = value.into_owned();
                    true
                }
                PARAM_LINES => match &*value {
                    "on" => {
                        self.show_lines = true;
                        true
                    }
                    "off" => {
                        self.show_lines = false;
                        true
                    }
                    _ => false,
                },
                _ => false,
            };
            if accepted {
                applied += 1;
            }
        }
        applied
    }

    /// Overlays the query of a share link; see `apply_query`.
    pub fn apply_link(&mut self, link: &Url, corpus: &SonnetCorpus) -> usize {
        self.apply_query(link.query().unwrap_or_default(), corpus)
    }

    /// Builds a share link on top of `base`.
    ///
    /// Any query or fragment already on `base` is dropped. `lines` is always
    /// written explicitly as `on` or `off`. Works for `file://` bases, where
    /// the link keeps the local path.
    pub fn share_url(&self, base: &Url) -> Url {
        let mut link = base.clone();
        link.set_fragment(None);
        link.set_query(None);
        link.query_pairs_mut()
            .append_pair(PARAM_SONNET, &self.sonnet)
            .append_pair(PARAM_START, &format_date(self.start_date))
            .append_pair(PARAM_COLOR, &self.color)
            .append_pair(PARAM_LINES, if self.show_lines { "on" } else { "off" });
        link
    }

    /// Cycle configuration described by these settings.
    pub fn cycle_config(&self) -> CycleConfig {
        CycleConfig::new(self.start_date, self.sonnet.clone())
    }
}

fn stored_sonnet_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(number) => number.as_u64().map(|id| id.to_string()),
        _ => None,
    }
}

/// Parses a start date given as strict `YYYY-MM-DD`.
///
/// # Errors
/// - `Empty` for empty input.
/// - `BadShape` when the text is not exactly four, two and two digits.
/// - `NotACalendarDate` for shapes like `2025-02-30`.
pub fn parse_start_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    if raw.is_empty() {
        return Err(DateParseError::Empty);
    }
    if !DATE_SHAPE_RE.is_match(raw) {
        return Err(DateParseError::BadShape(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| DateParseError::NotACalendarDate(raw.to_string()))
}

/// Formats a date the way `parse_start_date` reads it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Start-date validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    Empty,
    BadShape(String),
    NotACalendarDate(String),
}

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "start date must not be empty"),
            Self::BadShape(value) => {
                write!(f, "start date is malformed: {value} (expected YYYY-MM-DD)")
            }
            Self::NotACalendarDate(value) => {
                write!(f, "start date is not a calendar date: {value}")
            }
        }
    }
}

impl Error for DateParseError {}

#[cfg(test)]
mod tests {
    use super::{format_date, parse_start_date, DateParseError, Settings, DEFAULT_COLOR};
    use crate::model::corpus::SonnetCorpus;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
    }

    #[test]
    fn parse_start_date_accepts_strict_shape() {
        let date = parse_start_date("2024-01-01").expect("valid date");
        assert_eq!(format_date(date), "2024-01-01");
    }

    #[test]
    fn parse_start_date_rejects_loose_shapes() {
        for raw in [
            "garbage",
            "2025-6-15",
            "06-15-2025",
            " 2025-06-15",
            "2025-06-15T00:00",
            "\u{662}\u{660}\u{662}\u{665}-\u{660}\u{666}-\u{661}\u{665}",
        ] {
            let err = parse_start_date(raw).expect_err("loose shape must be rejected");
            assert!(matches!(err, DateParseError::BadShape(_)), "{raw}");
        }
        assert_eq!(parse_start_date(""), Err(DateParseError::Empty));
    }

    #[test]
    fn parse_start_date_rejects_impossible_days() {
        let err = parse_start_date("2025-02-30").unwrap_err();
        assert_eq!(err, DateParseError::NotACalendarDate("2025-02-30".to_string()));
        assert!(parse_start_date("2024-02-29").is_ok());
        assert!(parse_start_date("2025-13-01").is_err());
    }

    #[test]
    fn stored_json_round_trips_through_wire_names() {
        let settings = Settings {
            sonnet: "73".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"),
            color: "damask".to_string(),
            show_lines: false,
            self_test: true,
        };
        let json = settings.to_json().expect("serialize settings");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["sonnet"], "73");
        assert_eq!(value["startDate"], "2025-05-01");
        assert_eq!(value["showLines"], false);
        assert_eq!(value["selfTest"], true);

        let restored = Settings::from_stored_json(&json, SonnetCorpus::builtin(), today());
        assert_eq!(restored, settings);
    }

    #[test]
    fn stored_json_with_unknown_sonnet_keeps_other_fields() {
        let json = r#"{"sonnet":"999","startDate":"2025-05-01","color":"ink"}"#;
        let settings = Settings::from_stored_json(json, SonnetCorpus::builtin(), today());
        assert_eq!(settings.sonnet, "18");
        assert_eq!(settings.start_date.to_string(), "2025-05-01");
        assert_eq!(settings.color, "ink");
        assert!(settings.show_lines);
        assert!(!settings.self_test);
    }

    #[test]
    fn record_without_self_test_flag_still_deserializes() {
        let json = r#"{"sonnet":"30","startDate":"2025-05-01","color":"ink","showLines":true}"#;
        let settings: Settings = serde_json::from_str(json).expect("older record");
        assert!(!settings.self_test);
    }

    #[test]
    fn corrupted_stored_json_yields_defaults() {
        let settings = Settings::from_stored_json("{not json", SonnetCorpus::builtin(), today());
        assert_eq!(settings, Settings::defaults(today()));

        let settings = Settings::from_stored_json(
            r#"{"startDate":"2025-02-30","color":"  "}"#,
            SonnetCorpus::builtin(),
            today(),
        );
        assert_eq!(settings.start_date, today());
        assert_eq!(settings.color, DEFAULT_COLOR);
    }
}
