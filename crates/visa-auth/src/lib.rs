//! VISA Auth - Page guard for internal portal pages.
//!
//! Internal pages are open only to allow-listed staff. The guard asks an
//! external [`IdentityProvider`] who is signed in, checks the address
//! against the [`AccessPolicy`], and tracks two session marks:
//!
//! - **start**, set once: the session ends 8 hours after it
//! - **last activity**, refreshed on interaction: the session ends after
//!   20 idle minutes
//!
//! Any failure redirects to the login page. Unauthorized users and expired
//! sessions are signed out first.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod guard;
pub mod policy;

pub use error::{AuthError, Result};
pub use guard::{GuardDecision, Identity, IdentityProvider, PageGuard, RedirectReason, Session};
pub use policy::{normalize_email, AccessPolicy};
