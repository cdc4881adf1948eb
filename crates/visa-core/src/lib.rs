//! VISA Core - Foundation crate for the VISA regulated-establishments portal.
//!
//! This crate provides the shared error type, configuration management and
//! identifier newtypes that the data, portal and guard crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Identifier newtypes (`Codigo`, `Ndoc`) and their sharding rules
//!
//! # Example
//!
//! ```rust
//! use visa_core::{AppConfig, Codigo, Ndoc};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.search.max_results, 100);
//!
//! let codigo = Codigo::new(7)?;
//! assert_eq!(codigo.padded(), "00007");
//! assert_eq!(codigo.shard(), "00");
//!
//! assert_eq!(Ndoc::from(12345).bucket(), "45");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, FetchConfig, GuardConfig, PortalConfig, SearchConfig, SourceConfig};
pub use error::{ConfigError, ConfigResult, Result, VisaError};
pub use types::{Codigo, Ndoc};
