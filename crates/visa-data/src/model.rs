//! Typed data model of the dataset and the normalization layer that maps
//! raw JSON into it.
//!
//! The exports come from several generations of the publishing scripts:
//! numbers appear as strings and vice versa, optional objects are `null`,
//! blank strings stand for "no value". The [`coalesce`] helpers fold all of
//! that into `Option`s exactly once, so nothing downstream has to check.

use serde::{Deserialize, Serialize};
use visa_core::{Codigo, Ndoc};

/// Full record of a regulated establishment (`data/reg/..`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegulatedEntity {
    /// Establishment code
    #[serde(default, deserialize_with = "coalesce::codigo")]
    pub codigo: Option<Codigo>,
    /// Legal name
    #[serde(default, deserialize_with = "coalesce::text")]
    pub razao: Option<String>,
    /// Trade name
    #[serde(default, deserialize_with = "coalesce::text")]
    pub fantasia: Option<String>,
    /// Company tax id
    #[serde(default, deserialize_with = "coalesce::text")]
    pub cnpj: Option<String>,
    /// Individual tax id
    #[serde(default, deserialize_with = "coalesce::text")]
    pub cpf: Option<String>,
    /// Tax document shown to users: `cnpj`, else `cpf`, else backfilled from the index
    #[serde(default, deserialize_with = "coalesce::text")]
    pub documento: Option<String>,
    /// Street address and phones
    #[serde(default, deserialize_with = "coalesce::object")]
    pub endereco: Address,
    /// District
    #[serde(default, deserialize_with = "coalesce::district")]
    pub bairro: District,
    /// Latest valid sanitary permit
    #[serde(default, deserialize_with = "coalesce::optional_object")]
    pub alvara_ultimo: Option<Permit>,
    /// Registered activities, in file order
    #[serde(default, deserialize_with = "coalesce::list")]
    pub atividades: Vec<Activity>,
    /// Inspections, in file order
    #[serde(default, deserialize_with = "coalesce::list")]
    pub inspecoes: Vec<Inspection>,
}

impl RegulatedEntity {
    /// Map a raw detail document into the typed model.
    ///
    /// # Errors
    /// Returns error if the document is not a JSON object.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut entity: Self = serde_json::from_value(value)?;
        if entity.documento.is_none() {
            entity.documento = entity.cnpj.clone().or_else(|| entity.cpf.clone());
        }
        Ok(entity)
    }
}

/// Street address block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street and number
    #[serde(default, deserialize_with = "coalesce::text")]
    pub logradouro: Option<String>,
    /// Complement
    #[serde(default, deserialize_with = "coalesce::text")]
    pub complemento: Option<String>,
    /// Landline
    #[serde(default, deserialize_with = "coalesce::text")]
    pub fone: Option<String>,
    /// Mobile
    #[serde(default, deserialize_with = "coalesce::text")]
    pub celular: Option<String>,
}

/// District (`bairro`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    /// District name
    #[serde(default, deserialize_with = "coalesce::text")]
    pub nome: Option<String>,
    /// District code
    #[serde(default, deserialize_with = "coalesce::text")]
    pub codigo: Option<String>,
}

/// Latest valid sanitary permit (`alvara_ultimo`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    /// Fiscal year the permit was issued for
    #[serde(default, deserialize_with = "coalesce::text")]
    pub exercicio: Option<String>,
    /// Expiry date, as published
    #[serde(default, deserialize_with = "coalesce::text")]
    pub dt_validade: Option<String>,
}

/// Registered business activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// CNAE subclass code
    #[serde(default, deserialize_with = "coalesce::text")]
    pub subclasse: Option<String>,
    /// Activity description
    #[serde(default, deserialize_with = "coalesce::text")]
    pub atividade: Option<String>,
    /// Activity type (main/secondary)
    #[serde(default, deserialize_with = "coalesce::text")]
    pub tipo: Option<String>,
    /// Inspection team responsible
    #[serde(default, deserialize_with = "coalesce::text")]
    pub equipe: Option<String>,
    /// Sanitary complexity
    #[serde(default, deserialize_with = "coalesce::text")]
    pub complexidade: Option<String>,
}

/// Inspection visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    /// Visit date, as published
    #[serde(default, deserialize_with = "coalesce::text")]
    pub dt_visita: Option<String>,
    /// Document type
    #[serde(default, deserialize_with = "coalesce::text")]
    pub tipo: Option<String>,
    /// Document number
    #[serde(default, deserialize_with = "coalesce::text")]
    pub numer: Option<String>,
    /// Return deadline in days
    #[serde(default, deserialize_with = "coalesce::number")]
    pub pz_retorno: Option<u32>,
    /// History memo identifier; `None` when the inspection has no memo
    #[serde(default, deserialize_with = "coalesce::ndoc")]
    pub ndoc: Option<Ndoc>,
}

/// Free-text memo of an inspection (`data/his/..`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    /// Inspection document identifier
    pub ndoc: Ndoc,
    /// Memo text
    pub memo: Option<String>,
}

/// Raw history document. Older exports call the memo `descr`.
#[derive(Debug, Deserialize)]
struct RawHistory {
    #[serde(default, deserialize_with = "coalesce::text")]
    decr: Option<String>,
    #[serde(default, deserialize_with = "coalesce::text")]
    descr: Option<String>,
}

impl HistoryRecord {
    /// Map a raw history document into the typed model.
    ///
    /// # Errors
    /// Returns error if the document is not a JSON object.
    pub fn from_json(ndoc: Ndoc, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let raw: RawHistory = serde_json::from_value(value)?;
        Ok(Self {
            ndoc,
            memo: raw.decr.or(raw.descr),
        })
    }
}

/// Coalescing deserializers: every "no value" spelling becomes `None` or the default.
pub mod coalesce {
    use serde::de::{DeserializeOwned, Error};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use visa_core::{Codigo, Ndoc};

    /// Text of a scalar: trimmed strings, numbers and booleans; blank and `null` are `None`.
    #[must_use]
    pub fn value_text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Unsigned integer of a scalar; numeric strings are accepted.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn value_u64(value: &Value) -> Option<u64> {
        match value {
            // some exports write codes as floats (`1234.0`)
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                    .map(|f| f as u64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Establishment code of a scalar; zero and non-numeric values are `None`.
    #[must_use]
    pub fn value_codigo(value: &Value) -> Option<Codigo> {
        value_u64(value)
            .and_then(|n| u32::try_from(n).ok())
            .and_then(|n| Codigo::new(n).ok())
    }

    /// See [`value_text`].
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(value_text(&Value::deserialize(d)?))
    }

    /// See [`value_codigo`].
    pub fn codigo<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Codigo>, D::Error> {
        Ok(value_codigo(&Value::deserialize(d)?))
    }

    /// Positive inspection document id; `0` means "no memo".
    pub fn ndoc<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Ndoc>, D::Error> {
        Ok(value_u64(&Value::deserialize(d)?)
            .filter(|n| *n > 0)
            .map(Ndoc::from))
    }

    /// Small unsigned number such as a deadline in days.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(value_u64(&Value::deserialize(d)?).and_then(|n| u32::try_from(n).ok()))
    }

    /// Nested object; anything but an object yields the default.
    pub fn object<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        match Value::deserialize(d)? {
            value @ Value::Object(_) => serde_json::from_value(value).map_err(D::Error::custom),
            _ => Ok(T::default()),
        }
    }

    /// Nested object that may be absent; anything but an object is `None`.
    pub fn optional_object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Value::deserialize(d)? {
            value @ Value::Object(_) => serde_json::from_value(value)
                .map(Some)
                .map_err(D::Error::custom),
            _ => Ok(None),
        }
    }

    /// List of objects; non-arrays are empty and non-object items are dropped.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        items
            .into_iter()
            .filter(Value::is_object)
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect()
    }

    /// District as an object, or a bare string holding just the name.
    pub fn district<'de, D: Deserializer<'de>>(d: D) -> Result<super::District, D::Error> {
        match Value::deserialize(d)? {
            value @ Value::Object(_) => serde_json::from_value(value).map_err(D::Error::custom),
            other => Ok(super::District {
                nome: value_text(&other),
                codigo: None,
            }),
        }
    }
}
