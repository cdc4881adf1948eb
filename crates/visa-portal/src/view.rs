//! View model: every value the page shows, already resolved to text.
//!
//! Optional fields become [`PLACEHOLDER`] here, so renderers never deal
//! with missing data.

use crate::messages::{self, PLACEHOLDER};
use crate::state::{ModalContent, PortalState, StatusLine};
use serde::Serialize;
use visa_core::{Codigo, Ndoc};
use visa_data::{Activity, IndexEntry, Inspection, RegulatedEntity};

fn or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(PLACEHOLDER).to_string()
}

/// One row of the result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    /// Code, carried as the click payload
    pub codigo: Codigo,
    /// Legal name
    pub title: String,
    /// Trade name and document
    pub subtitle: String,
    /// `#<codigo>` tag
    pub tag: String,
}

impl From<&IndexEntry> for ResultItem {
    fn from(entry: &IndexEntry) -> Self {
        Self {
            codigo: entry.codigo,
            title: or_placeholder(entry.razao.as_deref()),
            subtitle: format!(
                "Fantasia: {} · Documento: {}",
                or_placeholder(entry.fantasia.as_deref()),
                or_placeholder(entry.documento.as_deref()),
            ),
            tag: format!("#{}", entry.codigo),
        }
    }
}

/// The result list section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultsView {
    /// Hidden until the index loads
    pub visible: bool,
    /// Rows, in index order
    pub items: Vec<ResultItem>,
    /// Shown instead of rows when a search matched nothing
    pub empty_message: Option<String>,
}

/// One activity row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRow {
    /// CNAE subclass
    pub title: String,
    /// Activity type tag
    pub badge: String,
    /// Description, team and complexity
    pub line: String,
}

impl From<&Activity> for ActivityRow {
    fn from(activity: &Activity) -> Self {
        let line = [
            activity.atividade.clone(),
            activity.equipe.as_ref().map(|e| format!("Equipe: {e}")),
            activity
                .complexidade
                .as_ref()
                .map(|c| format!("Complexidade: {c}")),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" · ");

        Self {
            title: or_placeholder(activity.subclasse.as_deref()),
            badge: or_placeholder(activity.tipo.as_deref()),
            line: if line.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                line
            },
        }
    }
}

/// One inspection row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionRow {
    /// `<tipo> <numer> · <dt_visita>`
    pub title: String,
    /// Return deadline
    pub badge: String,
    /// Memo to offer, when the inspection has one
    pub ndoc: Option<Ndoc>,
}

impl From<&Inspection> for InspectionRow {
    fn from(inspection: &Inspection) -> Self {
        Self {
            title: format!(
                "{} {} · {}",
                or_placeholder(inspection.tipo.as_deref()),
                or_placeholder(inspection.numer.as_deref()),
                or_placeholder(inspection.dt_visita.as_deref()),
            ),
            badge: match inspection.pz_retorno {
                Some(days) => format!("Prazo: {days} dia(s)"),
                None => format!("Prazo: {PLACEHOLDER}"),
            },
            ndoc: inspection.ndoc,
        }
    }
}

/// The detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    /// Legal name
    pub title: String,
    /// Trade name
    pub subtitle: String,
    /// Establishment code
    pub codigo: String,
    /// CNPJ or CPF
    pub documento: String,
    /// Street, complement and phones
    pub endereco: String,
    /// District name
    pub bairro: String,
    /// Permit year
    pub alvara_numero: String,
    /// Permit issue date (not published)
    pub alvara_emissao: String,
    /// Permit validity
    pub alvara_validade: String,
    /// Activity rows
    pub activities: Vec<ActivityRow>,
    /// Inspection rows
    pub inspections: Vec<InspectionRow>,
}

fn format_address(entity: &RegulatedEntity) -> String {
    let e = &entity.endereco;
    let street: Vec<&str> = [e.logradouro.as_deref(), e.complemento.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    let phones: Vec<String> = [
        e.fone.as_ref().map(|f| format!("Fone: {f}")),
        e.celular.as_ref().map(|c| format!("Celular: {c}")),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut parts = vec![if street.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        street.join(" · ")
    }];
    if !phones.is_empty() {
        parts.push(phones.join(" · "));
    }
    parts.join(" · ")
}

impl From<&RegulatedEntity> for DetailView {
    fn from(entity: &RegulatedEntity) -> Self {
        let permit = entity.alvara_ultimo.as_ref();
        Self {
            title: or_placeholder(entity.razao.as_deref()),
            subtitle: or_placeholder(entity.fantasia.as_deref()),
            codigo: entity
                .codigo
                .map_or_else(|| PLACEHOLDER.to_string(), |c| c.to_string()),
            documento: or_placeholder(entity.documento.as_deref()),
            endereco: format_address(entity),
            bairro: or_placeholder(entity.bairro.nome.as_deref()),
            alvara_numero: or_placeholder(permit.and_then(|p| p.exercicio.as_deref())),
            alvara_emissao: PLACEHOLDER.to_string(),
            alvara_validade: or_placeholder(permit.and_then(|p| p.dt_validade.as_deref())),
            activities: entity.atividades.iter().map(ActivityRow::from).collect(),
            inspections: entity.inspecoes.iter().map(InspectionRow::from).collect(),
        }
    }
}

/// Body of the modal dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ModalBody {
    /// Activity rows (or an empty-list message)
    Activities(Vec<ActivityRow>),
    /// Inspection rows (or an empty-list message)
    Inspections(Vec<InspectionRow>),
    /// Plain text: memo, loading or notice
    Text(String),
    /// Error text
    Error(String),
}

/// The modal dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalView {
    /// Title
    pub title: String,
    /// Subtitle, empty when absent
    pub subtitle: String,
    /// Body
    pub body: ModalBody,
}

/// Everything the page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageView {
    /// Search input value
    pub query: String,
    /// Status line
    pub status: Option<StatusLine>,
    /// Result list
    pub results: ResultsView,
    /// Detail panel, `None` when hidden
    pub detail: Option<DetailView>,
    /// Modal, `None` when hidden
    pub modal: Option<ModalView>,
}

impl PageView {
    /// Resolve `state` into text.
    #[must_use]
    pub fn from_state(state: &PortalState) -> Self {
        let results = ResultsView {
            visible: state.results.visible,
            items: state.results.entries.iter().map(ResultItem::from).collect(),
            empty_message: (state.results.searched && state.results.entries.is_empty())
                .then(|| messages::NONE_FOUND.to_string()),
        };

        let detail = state
            .detail
            .as_ref()
            .filter(|_| state.detail_visible)
            .map(DetailView::from);

        let modal = state.modal.as_ref().map(|modal| ModalView {
            title: modal.title.clone(),
            subtitle: modal.subtitle.clone().unwrap_or_default(),
            body: match &modal.content {
                ModalContent::Activities(list) => {
                    ModalBody::Activities(list.iter().map(ActivityRow::from).collect())
                }
                ModalContent::Inspections(list) => {
                    ModalBody::Inspections(list.iter().map(InspectionRow::from).collect())
                }
                ModalContent::Loading => ModalBody::Text(messages::HISTORY_LOADING.to_string()),
                ModalContent::Memo(memo) => ModalBody::Text(or_placeholder(memo.as_deref())),
                ModalContent::Notice(text) => ModalBody::Text(text.clone()),
                ModalContent::Error(text) => ModalBody::Error(text.clone()),
            },
        });

        Self {
            query: state.query.clone(),
            status: state.status.clone(),
            results,
            detail,
            modal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(value: serde_json::Value) -> RegulatedEntity {
        RegulatedEntity::from_json(value).expect("valid entity")
    }

    #[test]
    fn test_missing_permit_shows_placeholders() {
        let view = DetailView::from(&entity(json!({ "codigo": 7, "razao": "Padaria" })));
        assert_eq!(view.alvara_numero, "—");
        assert_eq!(view.alvara_emissao, "—");
        assert_eq!(view.alvara_validade, "—");
        assert_eq!(view.subtitle, "—");
        assert_eq!(view.endereco, "—");
        assert_eq!(view.codigo, "7");
    }

    #[test]
    fn test_permit_fields() {
        let view = DetailView::from(&entity(json!({
            "codigo": 7,
            "alvara_ultimo": { "exercicio": 2025, "dt_validade": "2025-12-31" }
        })));
        assert_eq!(view.alvara_numero, "2025");
        assert_eq!(view.alvara_validade, "2025-12-31");
    }

    #[test]
    fn test_address_with_phones() {
        let view = DetailView::from(&entity(json!({
            "endereco": { "logradouro": "Rua A, 1", "complemento": "Sala 2", "celular": "9999-0000" }
        })));
        assert_eq!(view.endereco, "Rua A, 1 · Sala 2 · Celular: 9999-0000");

        let view = DetailView::from(&entity(json!({ "endereco": { "fone": "3333-0000" } })));
        assert_eq!(view.endereco, "— · Fone: 3333-0000");
    }

    #[test]
    fn test_inspection_row() {
        let row = InspectionRow::from(&Inspection {
            dt_visita: Some("2025-03-10".into()),
            tipo: Some("Termo".into()),
            numer: None,
            pz_retorno: Some(30),
            ndoc: Some(Ndoc::from(12_345)),
        });
        assert_eq!(row.title, "Termo — · 2025-03-10");
        assert_eq!(row.badge, "Prazo: 30 dia(s)");

        let row = InspectionRow::from(&Inspection::default());
        assert_eq!(row.badge, "Prazo: —");
        assert_eq!(row.ndoc, None);
    }

    #[test]
    fn test_activity_row() {
        let row = ActivityRow::from(&Activity {
            subclasse: Some("4771-7/01".into()),
            atividade: Some("Farmácia".into()),
            tipo: None,
            equipe: Some("Medicamentos".into()),
            complexidade: None,
        });
        assert_eq!(row.title, "4771-7/01");
        assert_eq!(row.badge, "—");
        assert_eq!(row.line, "Farmácia · Equipe: Medicamentos");
        assert_eq!(ActivityRow::from(&Activity::default()).line, "—");
    }

    #[test]
    fn test_hidden_detail_not_in_view() {
        let mut state = PortalState {
            detail: Some(entity(json!({ "codigo": 7 }))),
            ..PortalState::default()
        };
        assert!(PageView::from_state(&state).detail.is_none());
        state.detail_visible = true;
        assert!(PageView::from_state(&state).detail.is_some());
    }

    #[test]
    fn test_empty_search_message() {
        let mut state = PortalState::default();
        state.results.searched = true;
        let view = PageView::from_state(&state);
        assert_eq!(view.results.empty_message.as_deref(), Some("Nenhum regulado encontrado."));
    }
}
