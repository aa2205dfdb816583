//! Sonnet corpus model.
//!
//! # Responsibility
//! - Hold the ordered set of sonnets a reading cycle advances through.
//! - Expose the embedded built-in corpus shared by every front end.
//!
//! # Invariants
//! - A corpus is never empty.
//! - Every sonnet has exactly `SONNET_LINE_COUNT` lines.
//! - Sonnet ids are unique and non-blank; corpus order is advancement order.

use crate::model::sonnets::SONNET_TEXT;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of lines in one sonnet, which is also the length of one cycle.
pub const SONNET_LINE_COUNT: usize = 14;

static BUILTIN_CORPUS: Lazy<SonnetCorpus> = Lazy::new(|| SonnetCorpus {
    sonnets: SONNET_TEXT
        .iter()
        .map(|(id, lines)| Sonnet::new(*id, lines.iter().copied()))
        .collect(),
});

/// One sonnet: an ordinal id (e.g. `"18"`) and its lines in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sonnet {
    pub id: String,
    pub lines: Vec<String>,
}

impl Sonnet {
    pub fn new<I, S>(id: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the first line, used as the sonnet's display title.
    pub fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }
}

/// Ordered, validated sequence of sonnets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SonnetCorpus {
    sonnets: Vec<Sonnet>,
}

impl SonnetCorpus {
    /// Builds a corpus after checking the shape invariants.
    ///
    /// # Errors
    /// - `Empty` when no sonnets are supplied.
    /// - `BlankId` / `PaddedId` / `DuplicateId` for invalid identifiers.
    /// - `WrongLineCount` when a sonnet does not have 14 lines.
    pub fn new(sonnets: Vec<Sonnet>) -> Result<Self, CorpusError> {
        if sonnets.is_empty() {
            return Err(CorpusError::Empty);
        }

        let mut seen = BTreeSet::<&str>::new();
        for sonnet in &sonnets {
            let id = sonnet.id.as_str();
            if id.trim().is_empty() {
                return Err(CorpusError::BlankId);
            }
            if id.trim() != id {
                return Err(CorpusError::PaddedId(id.to_string()));
            }
            if !seen.insert(id) {
                return Err(CorpusError::DuplicateId(id.to_string()));
            }
            if sonnet.lines.len() != SONNET_LINE_COUNT {
                return Err(CorpusError::WrongLineCount {
                    id: id.to_string(),
                    actual: sonnet.lines.len(),
                });
            }
        }

        Ok(Self { sonnets })
    }

    /// Returns the embedded corpus of ten sonnets.
    pub fn builtin() -> &'static SonnetCorpus {
        &BUILTIN_CORPUS
    }

    pub fn len(&self) -> usize {
        self.sonnets.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.sonnets.is_empty()
    }

    /// Sonnet ids in advancement order.
    pub fn order(&self) -> impl Iterator<Item = &str> + '_ {
        self.sonnets.iter().map(|sonnet| sonnet.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sonnet> + '_ {
        self.sonnets.iter()
    }

    /// Position of `id` in advancement order, if present.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.sonnets.iter().position(|sonnet| sonnet.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Sonnet> {
        self.sonnets.iter().find(|sonnet| sonnet.id == id)
    }

    pub fn first(&self) -> &Sonnet {
        &self.sonnets[0]
    }

    /// Returns the sonnet at `index` modulo corpus length.
    pub fn at_wrapping(&self, index: usize) -> &Sonnet {
        &self.sonnets[index % self.sonnets.len()]
    }
}

/// Corpus construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusError {
    Empty,
    BlankId,
    /// Id carries leading or trailing whitespace, so lookups would miss it.
    PaddedId(String),
    DuplicateId(String),
    WrongLineCount { id: String, actual: usize },
}

impl Display for CorpusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "corpus must contain at least one sonnet"),
            Self::BlankId => write!(f, "sonnet id must not be blank"),
            Self::PaddedId(id) => write!(f, "sonnet id has surrounding whitespace: {id:?}"),
            Self::DuplicateId(id) => write!(f, "sonnet id is duplicated: {id}"),
            Self::WrongLineCount { id, actual } => write!(
                f,
                "sonnet {id} has {actual} lines (expected {SONNET_LINE_COUNT})"
            ),
        }
    }
}

impl Error for CorpusError {}
