//! Element locator - multi-strategy element resolution
//!
//! Given a human description of a target (visible text, or a list of selector
//! candidates), find one node in the live document and act on it:
//! - Exact text, then substring text, over hinted tag names
//! - `value` attribute of button-like controls
//! - XPath templates (text, value, aria-label, title), each with a bounded wait
//! - CSS templates with `:contains` emulation
//!
//! The first strategy that yields a node wins; later ones are never run.

pub mod errors;
mod filler;
pub mod matchers;
pub mod resolver;
pub mod strategies;
pub mod types;

pub use errors::*;
pub use resolver::*;
pub use strategies::*;
pub use types::*;
