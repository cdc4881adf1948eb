//! Lazy loading of an establishment's full record.

use crate::error::{DataError, Result};
use crate::fetcher::Fetcher;
use crate::index::IndexStore;
use crate::layout::{entity_path, legacy_entity_path};
use crate::model::RegulatedEntity;
use tracing::{debug, warn};
use visa_core::Codigo;

/// Loads `data/reg/<shard>/<codigo>.json` records.
#[derive(Clone)]
pub struct DetailLoader {
    fetcher: Fetcher,
}

impl DetailLoader {
    /// Create a loader over `fetcher`.
    #[must_use]
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Load the record of `codigo`.
    ///
    /// The padded file name is tried first. When it fails (for anything but
    /// a timeout) the unpadded name used by older exports is tried in the
    /// same shard. If both fail, the error of the padded path is returned.
    ///
    /// Fields the record lacks are filled from `index` when an entry with
    /// the same code exists; fields the record has are never replaced.
    ///
    /// # Errors
    /// Returns `DataError::NotFound` when no file exists for the code, or
    /// the fetch/parse error of the padded path.
    pub async fn load(&self, codigo: Codigo, index: Option<&IndexStore>) -> Result<RegulatedEntity> {
        let primary = entity_path(codigo);

        let (path, value) = match self.fetcher.fetch_json(&primary).await {
            Ok(value) => (primary, value),
            Err(err) if err.is_timeout() => return Err(err),
            Err(err) => {
                let Some(legacy) = legacy_entity_path(codigo) else {
                    return Err(err);
                };
                warn!(%codigo, error = %err, fallback = %legacy, "padded record unavailable, trying legacy name");
                match self.fetcher.fetch_json(&legacy).await {
                    Ok(value) => (legacy, value),
                    Err(legacy_err) => {
                        debug!(%codigo, error = %legacy_err, "legacy record unavailable");
                        return Err(err);
                    }
                }
            }
        };

        let mut entity = RegulatedEntity::from_json(value).map_err(|e| DataError::Parse {
            path,
            source: e,
        })?;

        if entity.codigo.is_none() {
            entity.codigo = Some(codigo);
        }
        if let Some(entry) = index.and_then(|store| store.get(codigo)) {
            backfill(&mut entity.documento, entry.documento.as_ref());
            backfill(&mut entity.razao, entry.razao.as_ref());
            backfill(&mut entity.fantasia, entry.fantasia.as_ref());
        }

        debug!(
            %codigo,
            atividades = entity.atividades.len(),
            inspecoes = entity.inspecoes.len(),
            "loaded regulated entity"
        );
        Ok(entity)
    }
}

fn backfill(field: &mut Option<String>, fallback: Option<&String>) {
    if field.is_none() {
        *field = fallback.cloned();
    }
}
