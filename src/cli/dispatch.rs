use super::config::cmd_config;
use super::run::cmd_run;
use super::tools::cmd_tools;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(command: Commands, ctx: &CliContext) -> Result<()> {
    match command {
        Commands::Run(args) => cmd_run(args, ctx).await,
        Commands::Tools(args) => cmd_tools(args, ctx),
        Commands::Config(args) => cmd_config(args, ctx),
    }
}
