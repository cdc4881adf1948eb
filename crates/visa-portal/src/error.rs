//! Error types for the portal.
//!
//! Event handlers never return errors: load failures become status lines
//! and modal messages. These errors cover construction and direct queries.

use thiserror::Error;
use visa_core::ConfigError;
use visa_data::DataError;

/// Errors that can occur while setting up or querying the portal.
#[derive(Error, Debug)]
pub enum PortalError {
    /// The index has not been loaded (or failed to load)
    #[error("index not loaded")]
    IndexNotLoaded,

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dataset source could not be created
    #[error("dataset error: {0}")]
    Data(#[from] DataError),
}

/// Result type for portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;
