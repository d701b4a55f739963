use clap::Subcommand;

use super::config::ConfigArgs;
use super::run::RunArgs;
use super::tools::ToolsArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run a task script against the browser
    Run(RunArgs),

    /// List the browser tools and their parameter schemas
    Tools(ToolsArgs),

    /// Inspect the effective configuration
    Config(ConfigArgs),
}
