//! Browser tools - the structured surface an orchestrator drives.
//!
//! Each tool takes JSON arguments and returns a JSON result:
//! - `open_url`: navigate and settle
//! - `take_screenshot`: save a PNG of the viewport
//! - `find_and_click_element`: multi-strategy resolve, then click
//! - `fill_input`: first working selector candidate gets the value
//! - `get_page_structure`: interactive elements, or elements containing a term
//! - `wait_and_verify`: poll the URL for an expected fragment
//!
//! [`ToolBox`] owns the page context and runs one tool at a time.

mod context;
mod definition;
mod errors;
mod toolbox;
pub mod tools;

pub use context::ToolContext;
pub use definition::ToolDefinition;
pub use errors::ToolError;
pub use toolbox::{builtin_tools, Tool, ToolBox};
