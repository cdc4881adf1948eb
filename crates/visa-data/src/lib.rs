//! VISA Data - Read-only access to the published regulated-establishments dataset.
//!
//! The dataset is a tree of static JSON files. This crate fetches them
//! (over HTTP or from a local mirror), normalizes their historical shapes
//! into one typed model, and answers searches over the summary index.
//!
//! # Architecture
//!
//! - **Fetcher** ([`fetcher`]): `DataSource` implementations plus timeout and JSON parsing
//! - **Layout** ([`layout`]): sharded file paths
//! - **Model** ([`model`]): typed records and the coalescing normalization layer
//! - **Index** ([`index`]): the summary index, loaded once
//! - **Search** ([`search`]): normalized substring search over the index
//! - **Detail** ([`detail`]) and **History** ([`history`]): lazy per-selection loaders
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use visa_core::Codigo;
//! use visa_data::{search, DetailLoader, DirSource, Fetcher, IndexStore, SearchOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(Arc::new(DirSource::new("/srv/visa")));
//! let index = IndexStore::load(&fetcher).await?;
//!
//! let outcome = search("farmacia", &index, &SearchOptions::default());
//! for entry in outcome.entries() {
//!     println!("#{} {:?}", entry.codigo, entry.razao);
//! }
//!
//! let detail = DetailLoader::new(fetcher.clone())
//!     .load(Codigo::new(1234)?, Some(&index))
//!     .await?;
//! println!("{} inspections", detail.inspecoes.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod detail;
pub mod error;
pub mod fetcher;
pub mod history;
pub mod index;
pub mod layout;
pub mod model;
pub mod search;

// Re-export commonly used types
pub use detail::DetailLoader;
pub use error::{DataError, Result};
pub use fetcher::{DataSource, DirSource, Fetcher, HttpSource};
pub use history::HistoryLoader;
pub use index::{IndexEntry, IndexStore};
pub use model::{Activity, Address, District, HistoryRecord, Inspection, Permit, RegulatedEntity};
pub use search::{normalize, search, SearchOptions, SearchOutcome};
