//! VISA Portal - Headless presentation layer for the lookup portal.
//!
//! The page is modelled as an explicit [`PortalState`] changed only through
//! [`Portal::dispatch`]. Loads run asynchronously; each carries a request
//! token so a slow response can never overwrite a newer one. The state is
//! resolved into a [`PageView`] and rendered either to escaped HTML
//! fragments keyed by page hook or to plain text.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use visa_data::{DirSource, Fetcher};
//! use visa_portal::{PageHooks, Portal, UiEvent};
//!
//! # async fn run() {
//! let portal = Portal::new(Fetcher::new(Arc::new(DirSource::new("/srv/visa"))));
//! portal.dispatch(UiEvent::Init).await;
//! portal.dispatch(UiEvent::QueryChanged("farmacia".into())).await;
//!
//! for (hook, fragment) in portal.render(&PageHooks::all()) {
//!     println!("{hook}: hidden={} {:?}", fragment.hidden, fragment.html);
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod event;
pub mod hooks;
pub mod html;
pub mod messages;
pub mod portal;
pub mod state;
pub mod text;
pub mod view;

// Re-export commonly used types
pub use error::{PortalError, Result};
pub use event::{DispatchOutcome, Key, UiEvent};
pub use hooks::{Hook, PageHooks};
pub use html::{escape_html, render_html, Fragment, Rendered};
pub use messages::PLACEHOLDER;
pub use portal::{Portal, DEFAULT_DEBOUNCE};
pub use state::{Modal, ModalContent, PortalState, StatusLevel, StatusLine};
pub use text::render_text;
pub use view::{DetailView, ModalBody, ModalView, PageView};
