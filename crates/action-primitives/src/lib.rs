//! Action primitives - the page contract every resolver runs against
//!
//! This crate provides the building blocks shared by the locator and the tool layer:
//! - `PageSession`: the async collaborator contract (navigate, query, click, type, ...)
//! - `DomNode` / `ElementHandle` / `Selector`: the polymorphic node view
//! - Condition-polling waits bounded by a timeout
//! - `ActionExecutor`: scroll-into-view, settle, click and clear-then-type
//! - `Tempo`: every settle and pacing delay in one configurable place

pub mod errors;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
mod primitives;
mod session;
pub mod types;
mod waiting;

pub use errors::*;
pub use primitives::*;
pub use session::*;
pub use types::*;
pub use waiting::*;
