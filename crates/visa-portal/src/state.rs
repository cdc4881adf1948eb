//! The explicit state object the portal mutates.
//!
//! Everything the page shows is derived from a [`PortalState`]. Handlers
//! take short write locks on it and never hold them across an await.

use serde::Serialize;
use std::sync::Arc;
use visa_data::{Activity, IndexEntry, IndexStore, Inspection, RegulatedEntity};

/// Severity of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    /// Neutral progress or result message
    Info,
    /// Something failed
    Error,
}

/// The single status line under the search box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    /// Message text
    pub text: String,
    /// Severity
    pub level: StatusLevel,
    /// A persistent line is not replaced by later messages
    pub persistent: bool,
}

impl StatusLine {
    /// A transient informational line.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Info,
            persistent: false,
        }
    }

    /// A transient error line.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Error,
            persistent: false,
        }
    }

    /// An error line that stays until the page is reloaded.
    #[must_use]
    pub fn persistent_error(text: impl Into<String>) -> Self {
        Self {
            persistent: true,
            ..Self::error(text)
        }
    }
}

/// The result list.
#[derive(Debug, Clone, Default)]
pub struct ResultList {
    /// Matching index entries, in index order
    pub entries: Vec<IndexEntry>,
    /// More matches existed than were kept
    pub truncated: bool,
    /// The last query was long enough to run
    pub searched: bool,
    /// Hidden until the index loads
    pub visible: bool,
}

/// What the modal dialog currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalContent {
    /// Activity table of the open entity
    Activities(Vec<Activity>),
    /// Inspection table of the open entity
    Inspections(Vec<Inspection>),
    /// Waiting for a history memo
    Loading,
    /// A loaded history memo
    Memo(Option<String>),
    /// A non-error message (e.g. memo not yet published)
    Notice(String),
    /// An error message
    Error(String),
}

/// The modal dialog. `None` in [`PortalState::modal`] means hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct Modal {
    /// Dialog title
    pub title: String,
    /// Optional line under the title
    pub subtitle: Option<String>,
    /// Dialog body
    pub content: ModalContent,
}

/// Monotonic tokens identifying the latest request of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestTokens {
    /// Latest search (bumped on every query change)
    pub search: u64,
    /// Latest detail selection
    pub detail: u64,
    /// Latest history request
    pub history: u64,
}

/// Full page state.
#[derive(Debug, Clone, Default)]
pub struct PortalState {
    /// The loaded index, written once
    pub index: Option<Arc<IndexStore>>,
    /// Status line, if any
    pub status: Option<StatusLine>,
    /// Current query text as typed
    pub query: String,
    /// Result list
    pub results: ResultList,
    /// Last loaded entity
    pub detail: Option<RegulatedEntity>,
    /// Whether the detail panel is shown
    pub detail_visible: bool,
    /// Modal dialog, `None` when hidden
    pub modal: Option<Modal>,
    /// Request tokens
    pub tokens: RequestTokens,
}

impl PortalState {
    /// Replace the status line unless a persistent one is showing.
    ///
    /// Returns whether the line was replaced.
    pub fn set_status(&mut self, line: StatusLine) -> bool {
        if self.status.as_ref().is_some_and(|s| s.persistent) {
            return false;
        }
        self.status = Some(line);
        true
    }

    /// Whether a persistent error is showing.
    #[must_use]
    pub fn has_persistent_error(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.persistent)
    }

    /// Clear results and hide the detail panel.
    pub fn clear_results(&mut self) {
        self.results.entries.clear();
        self.results.truncated = false;
        self.results.searched = false;
        self.detail_visible = false;
    }

    /// Open the modal, replacing whatever it showed.
    pub fn open_modal(&mut self, title: impl Into<String>, subtitle: Option<String>, content: ModalContent) {
        self.modal = Some(Modal {
            title: title.into(),
            subtitle,
            content,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistent_status_sticks() {
        let mut state = PortalState::default();
        assert!(state.set_status(StatusLine::info("a")));
        assert!(state.set_status(StatusLine::persistent_error("index down")));
        assert!(!state.set_status(StatusLine::info("3 encontrado(s).")));

        let status = state.status.expect("status set");
        assert_eq!(status.text, "index down");
        assert_eq!(status.level, StatusLevel::Error);
    }

    #[test]
    fn test_open_modal_replaces_content() {
        let mut state = PortalState::default();
        state.open_modal("Atividades", None, ModalContent::Activities(Vec::new()));
        state.open_modal("Erro", None, ModalContent::Error("x".into()));

        let modal = state.modal.expect("modal open");
        assert_eq!(modal.title, "Erro");
        assert_eq!(modal.content, ModalContent::Error("x".into()));
    }

    #[test]
    fn test_clear_results_hides_detail() {
        let mut state = PortalState::default();
        state.results.truncated = true;
        state.detail_visible = true;
        state.clear_results();
        assert!(!state.detail_visible);
        assert!(!state.results.truncated);
        assert!(state.results.entries.is_empty());
    }
}
