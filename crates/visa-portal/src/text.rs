//! Plain-text rendering of a [`PageView`] for terminals.

use crate::messages::{NO_ACTIVITIES, NO_INSPECTIONS};
use crate::view::{ActivityRow, DetailView, InspectionRow, ModalBody, PageView};
use std::fmt::Write;

/// Render the visible parts of `view` as plain text.
#[must_use]
pub fn render_text(view: &PageView) -> String {
    let mut out = String::new();

    if let Some(status) = &view.status {
        let _ = writeln!(out, "{}", status.text);
    }

    if view.results.visible {
        if let Some(message) = &view.results.empty_message {
            let _ = writeln!(out, "{message}");
        }
        for item in &view.results.items {
            let _ = writeln!(out, "{:>8}  {}", item.tag, item.title);
            let _ = writeln!(out, "          {}", item.subtitle);
        }
    }

    if let Some(detail) = &view.detail {
        out.push('\n');
        out.push_str(&detail_text(detail));
    }

    if let Some(modal) = &view.modal {
        out.push('\n');
        let _ = writeln!(out, "== {} ==", modal.title);
        if !modal.subtitle.is_empty() {
            let _ = writeln!(out, "{}", modal.subtitle);
        }
        match &modal.body {
            ModalBody::Activities(rows) => out.push_str(&activities_text(rows)),
            ModalBody::Inspections(rows) => out.push_str(&inspections_text(rows)),
            ModalBody::Text(text) | ModalBody::Error(text) => {
                let _ = writeln!(out, "{text}");
            }
        }
    }

    out
}

/// Render the detail panel alone.
#[must_use]
pub fn detail_text(detail: &DetailView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", detail.title);
    let _ = writeln!(out, "  Fantasia:   {}", detail.subtitle);
    let _ = writeln!(out, "  Código:     {}", detail.codigo);
    let _ = writeln!(out, "  Documento:  {}", detail.documento);
    let _ = writeln!(out, "  Endereço:   {}", detail.endereco);
    let _ = writeln!(out, "  Bairro:     {}", detail.bairro);
    let _ = writeln!(out, "  Exercício:  {}", detail.alvara_numero);
    let _ = writeln!(out, "  Emissão:    {}", detail.alvara_emissao);
    let _ = writeln!(out, "  Validade:   {}", detail.alvara_validade);
    out
}

/// Render an activity list.
#[must_use]
pub fn activities_text(rows: &[ActivityRow]) -> String {
    if rows.is_empty() {
        return format!("{NO_ACTIVITIES}\n");
    }
    rows.iter()
        .map(|row| format!("[{}] {}\n    {}\n", row.badge, row.title, row.line))
        .collect()
}

/// Render an inspection list.
#[must_use]
pub fn inspections_text(rows: &[InspectionRow]) -> String {
    if rows.is_empty() {
        return format!("{NO_INSPECTIONS}\n");
    }
    rows.iter()
        .map(|row| {
            let history = row
                .ndoc
                .map_or_else(|| "—".to_string(), |ndoc| format!("NDOC {ndoc}"));
            format!("{}  ({})\n    Histórico: {history}\n", row.title, row.badge)
        })
        .collect()
}
