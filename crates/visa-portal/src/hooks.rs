//! Named hooks on the host page.
//!
//! A page may carry any subset of hooks. Rendering writes only to hooks
//! that are present and silently skips the rest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A named element on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hook {
    /// Search input
    Query,
    /// Clear button
    ClearButton,
    /// Status line
    Status,
    /// Result list
    Results,
    /// Detail panel container
    DetailPanel,
    /// Detail panel close button
    CloseDetail,
    /// Detail title (legal name)
    DetailTitle,
    /// Detail subtitle (trade name)
    DetailSubtitle,
    /// Establishment code
    DetailCodigo,
    /// Tax document
    DetailDocumento,
    /// Street address
    DetailEndereco,
    /// District
    DetailBairro,
    /// Permit year
    DetailAlvaraNumero,
    /// Permit issuing year label
    DetailAlvaraEmissao,
    /// Permit validity
    DetailAlvaraValidade,
    /// "Activities" button
    ActivitiesButton,
    /// "Inspections" button
    InspectionsButton,
    /// Inline activity list
    ActivitiesList,
    /// Inline inspection list
    InspectionsList,
    /// Modal backdrop
    ModalBackdrop,
    /// Modal container
    Modal,
    /// Modal title
    ModalTitle,
    /// Modal subtitle
    ModalSubtitle,
    /// Modal body
    ModalBody,
    /// Modal memo area
    ModalMemo,
    /// Modal close button
    CloseModal,
}

impl Hook {
    /// Every hook, in page order.
    pub const ALL: [Hook; 26] = [
        Hook::Query,
        Hook::ClearButton,
        Hook::Status,
        Hook::Results,
        Hook::DetailPanel,
        Hook::CloseDetail,
        Hook::DetailTitle,
        Hook::DetailSubtitle,
        Hook::DetailCodigo,
        Hook::DetailDocumento,
        Hook::DetailEndereco,
        Hook::DetailBairro,
        Hook::DetailAlvaraNumero,
        Hook::DetailAlvaraEmissao,
        Hook::DetailAlvaraValidade,
        Hook::ActivitiesButton,
        Hook::InspectionsButton,
        Hook::ActivitiesList,
        Hook::InspectionsList,
        Hook::ModalBackdrop,
        Hook::Modal,
        Hook::ModalTitle,
        Hook::ModalSubtitle,
        Hook::ModalBody,
        Hook::ModalMemo,
        Hook::CloseModal,
    ];

    /// The element id this hook is bound to.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Hook::Query => "q",
            Hook::ClearButton => "btnClear",
            Hook::Status => "status",
            Hook::Results => "results",
            Hook::DetailPanel => "detailPanel",
            Hook::CloseDetail => "btnCloseDetail",
            Hook::DetailTitle => "dTitle",
            Hook::DetailSubtitle => "dSub",
            Hook::DetailCodigo => "dCodigo",
            Hook::DetailDocumento => "dDoc",
            Hook::DetailEndereco => "dEnd",
            Hook::DetailBairro => "dBairro",
            Hook::DetailAlvaraNumero => "dAlvNum",
            Hook::DetailAlvaraEmissao => "dAlvEmi",
            Hook::DetailAlvaraValidade => "dAlvVal",
            Hook::ActivitiesButton => "btnAtividades",
            Hook::InspectionsButton => "btnInspecoes",
            Hook::ActivitiesList => "atividadesList",
            Hook::InspectionsList => "inspecoesList",
            Hook::ModalBackdrop => "modalBackdrop",
            Hook::Modal => "modal",
            Hook::ModalTitle => "modalTitle",
            Hook::ModalSubtitle => "modalSub",
            Hook::ModalBody => "modalBody",
            Hook::ModalMemo => "modalMemo",
            Hook::CloseModal => "btnCloseModal",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Unknown element id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown page hook: {0}")]
pub struct UnknownHook(pub String);

impl FromStr for Hook {
    type Err = UnknownHook;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hook::ALL
            .into_iter()
            .find(|hook| hook.id() == s)
            .ok_or_else(|| UnknownHook(s.to_string()))
    }
}

/// The hooks present on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageHooks {
    present: BTreeSet<Hook>,
}

impl PageHooks {
    /// A page carrying every hook.
    #[must_use]
    pub fn all() -> Self {
        Self {
            present: Hook::ALL.into_iter().collect(),
        }
    }

    /// A page carrying no hooks.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from the element ids found on a page. Unknown ids are ignored.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            present: ids.into_iter().filter_map(|id| id.parse().ok()).collect(),
        }
    }

    /// Drop `hook` from the page.
    #[must_use]
    pub fn without(mut self, hook: Hook) -> Self {
        self.present.remove(&hook);
        self
    }

    /// Whether `hook` is present.
    #[must_use]
    pub fn contains(&self, hook: Hook) -> bool {
        self.present.contains(&hook)
    }

    /// Present hooks, in page order.
    pub fn iter(&self) -> impl Iterator<Item = Hook> + '_ {
        self.present.iter().copied()
    }
}

impl FromIterator<Hook> for PageHooks {
    fn from_iter<I: IntoIterator<Item = Hook>>(iter: I) -> Self {
        Self {
            present: iter.into_iter().collect(),
        }
    }
}
