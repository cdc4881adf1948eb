//! Page events understood by [`Portal::dispatch`](crate::Portal::dispatch).

use crate::hooks::Hook;
use serde::{Deserialize, Serialize};
use visa_core::{Codigo, Ndoc};

/// Keys the portal reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// Closes the modal
    Escape,
    /// Submits the query immediately
    Enter,
    /// Anything else
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            _ => Key::Other,
        }
    }
}

/// A user or lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    /// Page ready: load the index
    Init,
    /// Search input changed
    QueryChanged(String),
    /// Clear button pressed
    ClearClicked,
    /// A result was picked
    ResultSelected(Codigo),
    /// Detail panel close button
    CloseDetail,
    /// Show the open entity's activities
    ShowActivities,
    /// Show the open entity's inspections
    ShowInspections,
    /// Show the memo of one inspection
    HistoryRequested(Ndoc),
    /// Modal close button
    CloseModal,
    /// Click outside the modal
    BackdropClicked,
    /// Key pressed
    KeyDown(Key),
}

impl UiEvent {
    /// Translate a click on `hook` carrying optional `data` (a `data-*`
    /// attribute of the clicked element) into an event.
    ///
    /// Returns `None` for clicks the portal does not handle, including
    /// result and history clicks whose data does not parse.
    #[must_use]
    pub fn from_click(hook: Hook, data: Option<&str>) -> Option<Self> {
        match hook {
            Hook::ClearButton => Some(UiEvent::ClearClicked),
            Hook::CloseDetail => Some(UiEvent::CloseDetail),
            Hook::ActivitiesButton => Some(UiEvent::ShowActivities),
            Hook::InspectionsButton => Some(UiEvent::ShowInspections),
            Hook::CloseModal => Some(UiEvent::CloseModal),
            Hook::ModalBackdrop => Some(UiEvent::BackdropClicked),
            Hook::Results => data?.parse().ok().map(UiEvent::ResultSelected),
            Hook::ModalBody | Hook::InspectionsList => {
                data?.parse().ok().map(UiEvent::HistoryRequested)
            }
            _ => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::Init => "init",
            UiEvent::QueryChanged(_) => "query_changed",
            UiEvent::ClearClicked => "clear_clicked",
            UiEvent::ResultSelected(_) => "result_selected",
            UiEvent::CloseDetail => "close_detail",
            UiEvent::ShowActivities => "show_activities",
            UiEvent::ShowInspections => "show_inspections",
            UiEvent::HistoryRequested(_) => "history_requested",
            UiEvent::CloseModal => "close_modal",
            UiEvent::BackdropClicked => "backdrop_clicked",
            UiEvent::KeyDown(_) => "key_down",
        }
    }
}

/// What a dispatched event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The state was updated
    Applied,
    /// A newer request superseded this one; its result was discarded
    Stale,
    /// The event had nothing to act on
    Ignored,
}
