//! Chromium DevTools page session.
//!
//! Connects to a running Chrome through its remote debugging endpoint (or
//! launches one) and exposes a single tab as an
//! [`action_primitives::PageSession`]. Nodes returned by queries are tagged
//! in the document with a per-load token so later calls can address them
//! again; a navigation drops every tag, which is what makes old handles stale.

pub mod browser;
pub mod config;
pub mod error;
pub mod page;
mod scripts;

pub use browser::ChromiumBrowser;
pub use config::CdpConfig;
pub use error::{AdapterError, AdapterErrorKind};
pub use page::ChromiumPage;
