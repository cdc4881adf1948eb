//! Lazy loading of inspection history memos.
//!
//! Not every inspection has a published memo, so `NotFound` here is an
//! expected outcome rather than a malfunction.

use crate::error::{DataError, Result};
use crate::fetcher::Fetcher;
use crate::layout::history_path;
use crate::model::HistoryRecord;
use tracing::debug;
use visa_core::Ndoc;

/// Loads `data/his/<bucket>/<ndoc>.json` records.
#[derive(Clone)]
pub struct HistoryLoader {
    fetcher: Fetcher,
}

impl HistoryLoader {
    /// Create a loader over `fetcher`.
    #[must_use]
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Load the memo of inspection `ndoc`.
    ///
    /// # Errors
    /// Returns `DataError::NotFound` when no memo was published.
    pub async fn load(&self, ndoc: Ndoc) -> Result<HistoryRecord> {
        let path = history_path(ndoc);
        let value = self.fetcher.fetch_json(&path).await?;
        let record = HistoryRecord::from_json(ndoc, value)
            .map_err(|e| DataError::Parse { path, source: e })?;

        debug!(%ndoc, has_memo = record.memo.is_some(), "loaded inspection history");
        Ok(record)
    }
}
