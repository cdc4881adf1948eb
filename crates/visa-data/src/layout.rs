//! Relative paths of the files that make up the published dataset.
//!
//! ```text
//! data/index_regulados.json
//! data/reg/<shard>/<padded codigo>.json
//! data/his/<ndoc mod 100>/<ndoc>.json
//! ```

use visa_core::{Codigo, Ndoc};

/// Summary index of every regulated establishment.
pub const INDEX_PATH: &str = "data/index_regulados.json";

/// Detail file of an establishment.
#[must_use]
pub fn entity_path(codigo: Codigo) -> String {
    format!("data/reg/{}/{}.json", codigo.shard(), codigo.padded())
}

/// Detail file name used by older exports: same shard, unpadded name.
///
/// Returns `None` when it would be identical to [`entity_path`].
#[must_use]
pub fn legacy_entity_path(codigo: Codigo) -> Option<String> {
    let unpadded = codigo.to_string();
    if unpadded == codigo.padded() {
        return None;
    }
    Some(format!("data/reg/{}/{}.json", codigo.shard(), unpadded))
}

/// History memo of an inspection.
#[must_use]
pub fn history_path(ndoc: Ndoc) -> String {
    format!("data/his/{}/{}.json", ndoc.bucket(), ndoc)
}
