//! User-facing text. The portal's audience reads Portuguese.

use std::fmt::Display;
use visa_data::DataError;

/// Shown in place of any missing value.
pub const PLACEHOLDER: &str = "—";

pub(crate) const INDEX_LOADING: &str = "Carregando índice...";
pub(crate) const NONE_FOUND: &str = "Nenhum regulado encontrado.";
pub(crate) const NO_ACTIVITIES: &str = "Nenhuma atividade encontrada.";
pub(crate) const NO_INSPECTIONS: &str = "Nenhuma inspeção encontrada.";
pub(crate) const HISTORY_LOADING: &str = "Carregando histórico...";
pub(crate) const ACTIVITIES_TITLE: &str = "Atividades";
pub(crate) const INSPECTIONS_TITLE: &str = "Inspeções";
pub(crate) const ERROR_TITLE: &str = "Erro";
pub(crate) const HISTORY_ERROR_TITLE: &str = "Erro ao abrir histórico";

pub(crate) fn index_loaded(count: usize) -> String {
    format!("Índice carregado ({count}).")
}

pub(crate) fn ready(count: usize) -> String {
    format!("Pronto. ({count} no índice)")
}

pub(crate) fn index_failed(err: impl Display) -> String {
    format!("Falha ao carregar o índice. A busca está indisponível. ({err})")
}

pub(crate) fn type_more(min_chars: usize) -> String {
    format!("Digite ao menos {min_chars} caracteres para buscar.")
}

pub(crate) fn found(count: usize, truncated: bool) -> String {
    if truncated {
        format!("Mostrando os primeiros {count} resultados. Refine a busca para ver os demais.")
    } else {
        format!("{count} encontrado(s).")
    }
}

pub(crate) fn entity_loading(codigo: impl Display) -> String {
    format!("Carregando regulado #{codigo}...")
}

pub(crate) fn entity_loaded(codigo: impl Display) -> String {
    format!("Regulado {codigo} carregado.")
}

pub(crate) fn entity_failed(codigo: impl Display) -> String {
    format!("Erro ao carregar regulado {codigo}.")
}

pub(crate) fn history_title(ndoc: impl Display) -> String {
    format!("Histórico NDOC {ndoc}")
}

pub(crate) fn history_unavailable(ndoc: impl Display) -> String {
    format!(
        "Histórico não disponível para o NDOC {ndoc}. Ele pode ser publicado posteriormente."
    )
}

/// Reader-facing wording of a dataset failure. Logs keep the English
/// `Display` of the error.
pub(crate) fn data_error(err: &DataError) -> String {
    match err {
        DataError::NotFound { path } => format!("Arquivo não encontrado: {path}."),
        DataError::Timeout { path, after } => {
            format!("Tempo esgotado ({} s) ao buscar {path}.", after.as_secs())
        }
        DataError::Fetch { path, status, .. } => format!("HTTP {status} ao buscar {path}."),
        DataError::Network { path, .. } => format!("Falha de rede ao buscar {path}."),
        DataError::Parse { path, .. } => format!("Conteúdo inválido em {path}."),
        DataError::Shape(_) => "Formato inesperado do índice.".to_string(),
        DataError::Io { path, .. } => format!("Erro de leitura em {path}."),
        DataError::InvalidUrl(_) => "Endereço do conjunto de dados inválido.".to_string(),
    }
}
