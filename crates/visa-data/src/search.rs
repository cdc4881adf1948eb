//! Free-text search over the summary index.
//!
//! Matching is a stable filter: results keep the index order and are never
//! re-ranked. A query matches an entry when
//!
//! 1. the normalized query is a substring of the entry blob, or
//! 2. the query has digits and the document's digits contain them, or
//! 3. the query has digits and the raw code contains them.

use crate::index::{only_digits, IndexEntry, IndexStore};
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use visa_core::SearchConfig;

/// Limits applied to every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Minimum normalized query length, in characters
    pub min_query_chars: usize,
    /// Maximum number of entries returned
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            min_query_chars: 2,
            max_results: 100,
        }
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            min_query_chars: config.min_query_chars,
            max_results: config.max_results,
        }
    }
}

/// Result of running a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// The query was blank
    Empty,
    /// The query was shorter than the minimum
    TooShort {
        /// Minimum number of characters
        min_chars: usize,
    },
    /// The query ran
    Matches {
        /// Matching entries, in index order
        entries: Vec<IndexEntry>,
        /// More entries matched than were returned
        truncated: bool,
    },
}

impl SearchOutcome {
    /// Matching entries; empty unless the query ran.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        match self {
            Self::Matches { entries, .. } => entries,
            Self::Empty | Self::TooShort { .. } => &[],
        }
    }

    /// Whether the result list was cut at the cap.
    #[must_use]
    pub fn truncated(&self) -> bool {
        matches!(self, Self::Matches { truncated: true, .. })
    }
}

/// Fold text for comparison: decompose, drop diacritics, lower-case, trim.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Run `query` against `index`.
#[must_use]
pub fn search(query: &str, index: &IndexStore, options: &SearchOptions) -> SearchOutcome {
    let needle = normalize(query);
    if needle.is_empty() {
        return SearchOutcome::Empty;
    }
    if needle.chars().count() < options.min_query_chars {
        return SearchOutcome::TooShort {
            min_chars: options.min_query_chars,
        };
    }

    let digits = only_digits(&needle);
    let mut entries = Vec::new();
    let mut truncated = false;

    for entry in index.entries() {
        if !matches(entry, &needle, &digits) {
            continue;
        }
        if entries.len() == options.max_results {
            truncated = true;
            break;
        }
        entries.push(entry.clone());
    }

    SearchOutcome::Matches { entries, truncated }
}

fn matches(entry: &IndexEntry, needle: &str, digits: &str) -> bool {
    if entry.blob().contains(needle) {
        return true;
    }
    if digits.is_empty() {
        return false;
    }
    entry.document_digits().contains(digits) || entry.codigo.to_string().contains(digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use visa_core::Codigo;

    fn entry(codigo: u32, razao: &str, fantasia: Option<&str>, documento: Option<&str>) -> IndexEntry {
        IndexEntry::new(
            Codigo::new(codigo).expect("valid codigo"),
            Some(razao.to_string()),
            fantasia.map(str::to_string),
            documento.map(str::to_string),
        )
    }

    fn farmacia_index() -> IndexStore {
        IndexStore::from_entries(vec![entry(
            1234,
            "Farmacia Central",
            Some("Farma"),
            Some("12345678900"),
        )])
    }

    fn codes(outcome: &SearchOutcome) -> Vec<u32> {
        outcome.entries().iter().map(|e| e.codigo.get()).collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  AÇÚCAR Ñandu  "), "acucar nandu");
        assert_eq!(normalize("Pão-de-Mel"), "pao-de-mel");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_trade_name_match() {
        let outcome = search("farma", &farmacia_index(), &SearchOptions::default());
        assert_eq!(codes(&outcome), vec![1234]);
    }

    #[test]
    fn test_diacritic_insensitive_match() {
        let outcome = search("FARMÁCIA", &farmacia_index(), &SearchOptions::default());
        assert_eq!(codes(&outcome), vec![1234]);
    }

    #[test]
    fn test_identifier_match() {
        let outcome = search("1234", &farmacia_index(), &SearchOptions::default());
        assert_eq!(codes(&outcome), vec![1234]);
    }

    #[test]
    fn test_document_digits_match_ignores_punctuation() {
        let index = IndexStore::from_entries(vec![entry(
            9,
            "Clinica",
            None,
            Some("12.345.678/0001-90"),
        )]);
        let outcome = search("45678000", &index, &SearchOptions::default());
        assert_eq!(codes(&outcome), vec![9]);
    }

    #[test]
    fn test_short_queries_return_nothing() {
        let index = farmacia_index();
        let options = SearchOptions::default();
        assert_eq!(search("", &index, &options), SearchOutcome::Empty);
        assert_eq!(search("   ", &index, &options), SearchOutcome::Empty);
        assert_eq!(
            search("f", &index, &options),
            SearchOutcome::TooShort { min_chars: 2 }
        );
        // a single accented character is still one character
        assert!(search("á", &index, &options).entries().is_empty());
    }

    #[test]
    fn test_no_match() {
        let outcome = search("padaria", &farmacia_index(), &SearchOptions::default());
        assert_eq!(
            outcome,
            SearchOutcome::Matches {
                entries: vec![],
                truncated: false
            }
        );
    }

    #[test]
    fn test_truncation_and_order() {
        let entries: Vec<IndexEntry> = (1..=250)
            .rev()
            .map(|n| entry(n, "Mercado", None, None))
            .collect();
        let index = IndexStore::from_entries(entries);

        let outcome = search("mercado", &index, &SearchOptions::default());
        assert!(outcome.truncated());
        let found = codes(&outcome);
        assert_eq!(found.len(), 100);
        assert_eq!(found.first(), Some(&250));
        assert!(found.windows(2).all(|w| w[0] > w[1]));

        let options = SearchOptions {
            max_results: 250,
            ..SearchOptions::default()
        };
        let outcome = search("mercado", &index, &options);
        assert!(!outcome.truncated());
        assert_eq!(outcome.entries().len(), 250);
    }

    #[test]
    fn test_every_result_satisfies_a_match_rule() {
        let index = IndexStore::from_entries(vec![
            entry(10, "Açougue Boi", None, Some("111.222.333-44")),
            entry(21, "Bar do Zé", Some("Zé"), None),
            entry(333, "Drogaria 21", None, Some("21.000.000/0001-00")),
            entry(4021, "Escola", None, None),
        ]);

        for query in ["21", "acougue", "ze", "000", "boi", "xx"] {
            let needle = normalize(query);
            let digits = only_digits(&needle);
            let outcome = search(query, &index, &SearchOptions::default());
            for found in outcome.entries() {
                let by_blob = found.blob().contains(&needle);
                let by_digits = !digits.is_empty()
                    && (found.document_digits().contains(&digits)
                        || found.codigo.to_string().contains(&digits));
                assert!(by_blob || by_digits, "{query} matched {}", found.codigo);
            }
        }
    }

    #[test]
    fn test_search_is_idempotent() {
        let index = IndexStore::from_entries(vec![
            entry(1, "Bar A", None, None),
            entry(2, "Bar B", None, None),
        ]);
        let options = SearchOptions::default();
        assert_eq!(search("bar", &index, &options), search("bar", &index, &options));
    }
}
