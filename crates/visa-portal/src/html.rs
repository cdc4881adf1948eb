//! HTML rendering of a [`PageView`].
//!
//! Output is a set of fragments keyed by page hook. The host page swaps
//! each fragment into the element carrying that hook. Every piece of
//! dataset text passes through [`escape_html`].

use crate::hooks::{Hook, PageHooks};
use crate::messages::{NO_ACTIVITIES, NO_INSPECTIONS};
use crate::state::StatusLevel;
use crate::view::{ActivityRow, DetailView, InspectionRow, ModalBody, PageView, ResultsView};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rendered content of one hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// Whether the element is hidden
    pub hidden: bool,
    /// Inner HTML; `None` leaves the element's content untouched
    pub html: Option<String>,
}

impl Fragment {
    fn text(hidden: bool, text: &str) -> Self {
        Self {
            hidden,
            html: Some(escape_html(text)),
        }
    }

    fn markup(hidden: bool, html: String) -> Self {
        Self {
            hidden,
            html: Some(html),
        }
    }

    fn visibility(hidden: bool) -> Self {
        Self { hidden, html: None }
    }
}

/// Fragments keyed by hook, in page order.
pub type Rendered = BTreeMap<Hook, Fragment>;

/// Render `view` for a page carrying `hooks`.
///
/// Hooks missing from the page are skipped.
#[must_use]
pub fn render_html(view: &PageView, hooks: &PageHooks) -> Rendered {
    let mut out = Rendered::new();
    for hook in hooks.iter() {
        if let Some(fragment) = render_hook(view, hook) {
            out.insert(hook, fragment);
        }
    }
    out
}

fn detail_text(detail: Option<&DetailView>, field: fn(&DetailView) -> &str) -> Fragment {
    Fragment::text(detail.is_none(), detail.map_or("", field))
}

fn render_hook(view: &PageView, hook: Hook) -> Option<Fragment> {
    let detail = view.detail.as_ref();
    let modal = view.modal.as_ref();

    match hook {
        Hook::Query => Some(Fragment::text(false, &view.query)),
        Hook::Status => Some(render_status(view)),
        Hook::Results => Some(render_results(&view.results)),

        Hook::DetailPanel | Hook::ActivitiesButton | Hook::InspectionsButton => {
            Some(Fragment::visibility(detail.is_none()))
        }
        Hook::DetailTitle => Some(detail_text(detail, |d| d.title.as_str())),
        Hook::DetailSubtitle => Some(detail_text(detail, |d| d.subtitle.as_str())),
        Hook::DetailCodigo => Some(detail_text(detail, |d| d.codigo.as_str())),
        Hook::DetailDocumento => Some(detail_text(detail, |d| d.documento.as_str())),
        Hook::DetailEndereco => Some(detail_text(detail, |d| d.endereco.as_str())),
        Hook::DetailBairro => Some(detail_text(detail, |d| d.bairro.as_str())),
        Hook::DetailAlvaraNumero => Some(detail_text(detail, |d| d.alvara_numero.as_str())),
        Hook::DetailAlvaraEmissao => Some(detail_text(detail, |d| d.alvara_emissao.as_str())),
        Hook::DetailAlvaraValidade => Some(detail_text(detail, |d| d.alvara_validade.as_str())),
        Hook::ActivitiesList => Some(Fragment::markup(
            detail.is_none(),
            detail.map(|d| activity_list(&d.activities)).unwrap_or_default(),
        )),
        Hook::InspectionsList => Some(Fragment::markup(
            detail.is_none(),
            detail
                .map(|d| inspection_list(&d.inspections))
                .unwrap_or_default(),
        )),

        Hook::ModalBackdrop | Hook::Modal => Some(Fragment::visibility(modal.is_none())),
        Hook::ModalTitle => Some(Fragment::text(
            modal.is_none(),
            modal.map_or("", |m| m.title.as_str()),
        )),
        Hook::ModalSubtitle => Some(Fragment::text(
            modal.map_or(true, |m| m.subtitle.is_empty()),
            modal.map_or("", |m| m.subtitle.as_str()),
        )),
        Hook::ModalBody => Some(Fragment::markup(
            modal.is_none(),
            modal.map(|m| modal_body(&m.body)).unwrap_or_default(),
        )),
        Hook::ModalMemo => Some(Fragment::text(
            modal.is_none(),
            match modal.map(|m| &m.body) {
                Some(ModalBody::Text(text) | ModalBody::Error(text)) => text.as_str(),
                _ => "",
            },
        )),

        Hook::ClearButton | Hook::CloseDetail | Hook::CloseModal => None,
    }
}

fn render_status(view: &PageView) -> Fragment {
    match &view.status {
        None => Fragment::text(false, ""),
        Some(status) => {
            let class = match status.level {
                StatusLevel::Info => "status",
                StatusLevel::Error => "status status--error",
            };
            Fragment::markup(
                false,
                format!(
                    r#"<span class="{class}">{}</span>"#,
                    escape_html(&status.text)
                ),
            )
        }
    }
}

fn small(text: &str) -> String {
    format!(r#"<div class="small">{}</div>"#, escape_html(text))
}

fn render_results(results: &ResultsView) -> Fragment {
    let mut html = String::new();
    if let Some(message) = &results.empty_message {
        html.push_str(&small(message));
    }
    for item in &results.items {
        let _ = write!(
            html,
            concat!(
                r#"<button type="button" class="result" data-codigo="{}">"#,
                r#"<div class="result__top"><div>"#,
                r#"<div class="result__title">{}</div>"#,
                r#"<div class="result__sub">{}</div>"#,
                r#"</div><div class="tag">{}</div></div></button>"#,
            ),
            item.codigo,
            escape_html(&item.title),
            escape_html(&item.subtitle),
            escape_html(&item.tag),
        );
    }
    Fragment::markup(!results.visible, html)
}

fn item(title: &str, badge: &str, sub_html: &str) -> String {
    format!(
        concat!(
            r#"<div class="item"><div class="item__top">"#,
            r#"<div class="item__title">{}</div><div class="tag">{}</div>"#,
            r#"</div><div class="item__sub">{}</div></div>"#,
        ),
        escape_html(title),
        escape_html(badge),
        sub_html,
    )
}

fn activity_list(rows: &[ActivityRow]) -> String {
    if rows.is_empty() {
        return small(NO_ACTIVITIES);
    }
    rows.iter()
        .map(|row| item(&row.title, &row.badge, &escape_html(&row.line)))
        .collect()
}

fn inspection_list(rows: &[InspectionRow]) -> String {
    if rows.is_empty() {
        return small(NO_INSPECTIONS);
    }
    rows.iter()
        .map(|row| {
            let sub = match row.ndoc {
                Some(ndoc) => format!(
                    r#"Histórico: <button type="button" class="btn btn--ghost" data-ndoc="{ndoc}">Abrir (NDOC {ndoc})</button>"#
                ),
                None => "Histórico: —".to_string(),
            };
            item(&row.title, &row.badge, &sub)
        })
        .collect()
}

fn modal_body(body: &ModalBody) -> String {
    match body {
        ModalBody::Activities(rows) => activity_list(rows),
        ModalBody::Inspections(rows) => inspection_list(rows),
        ModalBody::Text(text) => format!(r#"<p class="memo">{}</p>"#, escape_html(text)),
        ModalBody::Error(text) => {
            format!(r#"<p class="memo memo--error">{}</p>"#, escape_html(text))
        }
    }
}
