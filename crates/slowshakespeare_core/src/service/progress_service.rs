//! Reading-progress use-case service.
//!
//! # Responsibility
//! - Load, update and persist reader settings through a repository.
//! - Assemble the "today" view front ends display.
//!
//! # Invariants
//! - Stored settings always name a sonnet in the service's corpus.
//! - Auto-advancement is reflected in `TodayView::selected_sonnet` only; the
//!   stored starting sonnet is never rewritten, since that would advance the
//!   cycle twice.

use crate::model::corpus::SonnetCorpus;
use crate::model::settings::{Settings, SETTINGS_STORAGE_KEY};
use crate::progress::calculator::{evaluate, Progress, Recovery};
use crate::repo::settings_repo::{RepoError, SettingsRepository};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from settings/progress use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Sonnet id is not part of the corpus.
    UnknownSonnet(String),
    /// Color token is blank after trim.
    BlankColor,
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSonnet(id) => write!(f, "unknown sonnet: {id}"),
            Self::BlankColor => write!(f, "color must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UnknownSonnet(_) | Self::BlankColor => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Partial settings update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub sonnet: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub color: Option<String>,
    pub show_lines: Option<bool>,
    pub self_test: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Everything a front end needs to draw today's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodayView {
    pub settings: Settings,
    pub progress: Progress,
    pub recovery: Recovery,
    /// Sonnet the selector control should show (the auto-advanced one).
    pub selected_sonnet: String,
    /// Revealed lines of the current sonnet.
    pub lines: Vec<String>,
}

/// Use-case service over a settings repository and a sonnet corpus.
pub struct ProgressService<'c, R: SettingsRepository> {
    repo: R,
    corpus: &'c SonnetCorpus,
}

impl<R: SettingsRepository> ProgressService<'static, R> {
    /// Creates a service over the built-in corpus.
    pub fn new(repo: R) -> Self {
        Self::with_corpus(repo, SonnetCorpus::builtin())
    }
}

impl<'c, R: SettingsRepository> ProgressService<'c, R> {
    pub fn with_corpus(repo: R, corpus: &'c SonnetCorpus) -> Self {
        Self { repo, corpus }
    }

    /// Loads stored settings, falling back to defaults for missing records
    /// and invalid fields.
    pub fn load_settings(&self, today: NaiveDate) -> ServiceResult<Settings> {
        let settings = match self.repo.load_raw(SETTINGS_STORAGE_KEY)? {
            Some(json) => Settings::from_stored_json(&json, self.corpus, today),
            None => Settings::defaults(today),
        };
        Ok(settings)
    }

    /// Validates and persists `settings`.
    ///
    /// # Errors
    /// - `UnknownSonnet` / `BlankColor` for invalid values.
    /// - `Repo` when encoding or storage fails.
    pub fn save_settings(&self, settings: &Settings) -> ServiceResult<()> {
        self.validate(settings)?;
        let json = settings.to_json().map_err(RepoError::from)?;
        self.repo.save_raw(SETTINGS_STORAGE_KEY, &json)?;
        info!(
            "event=settings_save module=service status=ok sonnet={} start_date={}",
            settings.sonnet, settings.start_date
        );
        Ok(())
    }

    /// Applies `patch` on top of the stored settings and persists the result.
    pub fn update_settings(
        &self,
        today: NaiveDate,
        patch: &SettingsPatch,
    ) -> ServiceResult<Settings> {
        let mut settings = self.load_settings(today)?;
        if let Some(sonnet) = &patch.sonnet {
            settings.sonnet = sonnet.clone();
        }
        if let Some(start_date) = patch.start_date {
            settings.start_date = start_date;
        }
        if let Some(color) = &patch.color {
            settings.color = color.clone();
        }
        if let Some(show_lines) = patch.show_lines {
            settings.show_lines = show_lines;
        }
        if let Some(self_test) = patch.self_test {
            settings.self_test = self_test;
        }
        self.save_settings(&settings)?;
        Ok(settings)
    }

    /// Overlays a share link onto the stored settings and persists them.
    ///
    /// Returns the resulting settings and how many link values were applied.
    pub fn import_link(&self, today: NaiveDate, link: &Url) -> ServiceResult<(Settings, usize)> {
        let mut settings = self.load_settings(today)?;
        let applied = settings.apply_link(link, self.corpus);
        if applied > 0 {
            self.save_settings(&settings)?;
        }
        info!("event=link_import module=service status=ok applied={applied}");
        Ok((settings, applied))
    }

    /// Builds the view for `today` from stored settings.
    pub fn today_view(&self, today: NaiveDate) -> ServiceResult<TodayView> {
        let settings = self.load_settings(today)?;
        Ok(self.view_for(settings, today))
    }

    /// Builds the view for `today` from explicit settings without storage.
    pub fn view_for(&self, settings: Settings, today: NaiveDate) -> TodayView {
        build_today_view(self.corpus, settings, today)
    }

    fn validate(&self, settings: &Settings) -> ServiceResult<()> {
        if !self.corpus.contains(&settings.sonnet) {
            return Err(ServiceError::UnknownSonnet(settings.sonnet.clone()));
        }
        if settings.color.trim().is_empty() {
            return Err(ServiceError::BlankColor);
        }
        Ok(())
    }
}

/// Evaluates `settings` for `today` against `corpus`.
///
/// Recovery clamps are logged at `warn`; the view still carries a usable
/// sonnet and line count.
pub fn build_today_view(corpus: &SonnetCorpus, settings: Settings, today: NaiveDate) -> TodayView {
    let evaluation = evaluate(corpus, &settings.cycle_config(), today);
    if !evaluation.recovery.is_clean() {
        warn!(
            "event=progress_recovered module=service status=recovered future_start={} unknown_sonnet={}",
            evaluation.recovery.future_start, evaluation.recovery.unknown_sonnet
        );
    }

    let progress = evaluation.progress;
    let lines = progress.revealed_lines(corpus).to_vec();
    info!(
        "event=today_view module=service status=ok sonnet={} day={} lines={}",
        progress.current_sonnet_id, progress.day_within_cycle, progress.lines_revealed
    );

    TodayView {
        selected_sonnet: progress.current_sonnet_id.clone(),
        settings,
        progress,
        recovery: evaluation.recovery,
        lines,
    }
}
