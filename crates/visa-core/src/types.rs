//! Identifier newtypes shared across the portal.
//!
//! Both identifiers also decide where their JSON file lives in the sharded
//! dataset layout, so the derivation rules are kept next to the types.

use crate::error::VisaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a regulated establishment (`codigo`).
///
/// Codes are positive. Files are sharded by the first two digits of the
/// code zero-padded to five digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Codigo(u32);

impl Codigo {
    /// Create a new `Codigo`.
    ///
    /// # Errors
    /// Returns error if the code is zero.
    pub fn new(value: u32) -> Result<Self, VisaError> {
        if value == 0 {
            return Err(VisaError::Validation(
                "invalid codigo: must be greater than zero".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Get the numeric value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// The code zero-padded to five digits (longer codes are left as is).
    #[must_use]
    pub fn padded(self) -> String {
        format!("{:05}", self.0)
    }

    /// Shard directory: the first two characters of [`Codigo::padded`].
    #[must_use]
    pub fn shard(self) -> String {
        self.padded()[..2].to_string()
    }
}

impl FromStr for Codigo {
    type Err = VisaError;

    /// Parse a code from text, tolerating surrounding whitespace and leading zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: u32 = trimmed.parse().map_err(|_| {
            VisaError::Validation(format!("invalid codigo: expected digits, got '{trimmed}'"))
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Codigo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an inspection document (`ndoc`).
///
/// History memos are bucketed by `ndoc mod 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ndoc(u64);

impl Ndoc {
    /// Get the numeric value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    /// Bucket directory: `ndoc mod 100`, zero-padded to two digits.
    #[must_use]
    pub fn bucket(self) -> String {
        format!("{:02}", self.0 % 100)
    }
}

impl From<u64> for Ndoc {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for Ndoc {
    type Err = VisaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed.parse().map(Self).map_err(|_| {
            VisaError::Validation(format!("invalid ndoc: expected digits, got '{trimmed}'"))
        })
    }
}

impl fmt::Display for Ndoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
