//! PagePilot library
//!
//! Configuration loading and the task-script runner behind the `pagepilot`
//! binary. Exposed for integration testing.

pub mod config;
pub mod script;

pub use config::{ConfigError, LoadedConfig, PagePilotConfig};
pub use script::{ScriptError, ScriptReport, ScriptRunner, Step, StepReport, StepStatus, TaskScript};
