//! In-memory summary index of every regulated establishment.
//!
//! Loaded once per session from `data/index_regulados.json` and read-only
//! afterwards. Two payload generations are accepted and folded into one
//! representation:
//!
//! ```text
//! [[1234, "RAZAO", "FANTASIA", "DOC"], ...]
//! { "meta": {...}, "dados": [{ "codigo": 1234, "razao": ..., ... }, ...] }
//! ```

use crate::error::{DataError, Result};
use crate::fetcher::Fetcher;
use crate::layout::INDEX_PATH;
use crate::model::coalesce::{value_codigo, value_text};
use crate::search::normalize;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};
use visa_core::Codigo;

/// Object fields that may hold the entry array, in lookup order.
const WRAPPER_FIELDS: [&str; 3] = ["dados", "regulados", "items"];

/// Summary record of one establishment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// Establishment code
    pub codigo: Codigo,
    /// Legal name
    pub razao: Option<String>,
    /// Trade name
    pub fantasia: Option<String>,
    /// Tax document (CNPJ or CPF), as published
    pub documento: Option<String>,
    #[serde(skip)]
    blob: String,
    #[serde(skip)]
    document_digits: String,
}

impl IndexEntry {
    /// Create an entry and precompute its search keys.
    #[must_use]
    pub fn new(
        codigo: Codigo,
        razao: Option<String>,
        fantasia: Option<String>,
        documento: Option<String>,
    ) -> Self {
        let joined = [
            razao.as_deref().unwrap_or_default(),
            fantasia.as_deref().unwrap_or_default(),
            documento.as_deref().unwrap_or_default(),
            &codigo.to_string(),
        ]
        .join(" ");
        let document_digits = documento
            .as_deref()
            .map(only_digits)
            .unwrap_or_default();

        Self {
            codigo,
            razao,
            fantasia,
            documento,
            blob: normalize(&joined),
            document_digits,
        }
    }

    /// Normalized concatenation of names, document and code.
    #[must_use]
    pub fn blob(&self) -> &str {
        &self.blob
    }

    /// Digits of the tax document, punctuation removed.
    #[must_use]
    pub fn document_digits(&self) -> &str {
        &self.document_digits
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(fields) => {
                let field = |i: usize| fields.get(i).and_then(value_text);
                let codigo = fields.first().and_then(value_codigo)?;
                Some(Self::new(codigo, field(1), field(2), field(3)))
            }
            Value::Object(map) => {
                let field = |key: &str| map.get(key).and_then(value_text);
                let codigo = map.get("codigo").and_then(value_codigo)?;
                let documento = field("documento")
                    .or_else(|| field("cnpj"))
                    .or_else(|| field("cpf"));
                Some(Self::new(codigo, field("razao"), field("fantasia"), documento))
            }
            _ => None,
        }
    }
}

/// Keep only ASCII digits.
#[must_use]
pub fn only_digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Loaded summary index, in publication order.
#[derive(Debug, Clone, Default)]
pub struct IndexStore {
    entries: Vec<IndexEntry>,
    by_codigo: HashMap<Codigo, usize>,
}

impl IndexStore {
    /// Fetch and normalize the published index.
    ///
    /// # Errors
    /// Returns the fetch error, or `DataError::Shape` for an unknown payload.
    pub async fn load(fetcher: &Fetcher) -> Result<Self> {
        let payload = fetcher.fetch_json(INDEX_PATH).await?;
        let store = Self::from_json(&payload)?;
        info!(count = store.len(), "loaded regulated index");
        Ok(store)
    }

    /// Normalize either payload shape.
    ///
    /// # Errors
    /// Returns `DataError::Shape` if the payload holds no entry array.
    pub fn from_json(payload: &Value) -> Result<Self> {
        let items = match payload {
            Value::Array(items) => items,
            Value::Object(map) => WRAPPER_FIELDS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array))
                .ok_or_else(|| {
                    DataError::Shape(format!(
                        "object without an entry array (expected one of {WRAPPER_FIELDS:?})"
                    ))
                })?,
            other => {
                return Err(DataError::Shape(format!(
                    "expected array or object, got {}",
                    json_kind(other)
                )))
            }
        };

        let entries: Vec<IndexEntry> = items.iter().filter_map(IndexEntry::from_value).collect();
        let skipped = items.len() - entries.len();
        if skipped > 0 {
            warn!(skipped, "skipped index entries without a valid codigo");
        }

        Ok(Self::from_entries(entries))
    }

    /// Build a store from entries; the first entry wins for a repeated code.
    #[must_use]
    pub fn from_entries(entries: Vec<IndexEntry>) -> Self {
        let mut kept = Vec::with_capacity(entries.len());
        let mut by_codigo = HashMap::with_capacity(entries.len());

        for entry in entries {
            if by_codigo.contains_key(&entry.codigo) {
                warn!(codigo = %entry.codigo, "duplicate codigo in index, keeping first");
                continue;
            }
            by_codigo.insert(entry.codigo, kept.len());
            kept.push(entry);
        }

        Self {
            entries: kept,
            by_codigo,
        }
    }

    /// Entry with the given code.
    #[must_use]
    pub fn get(&self, codigo: Codigo) -> Option<&IndexEntry> {
        self.by_codigo.get(&codigo).map(|&i| &self.entries[i])
    }

    /// All entries, in publication order.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
