use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::context::CliContext;
use crate::cli::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration (defaults, file and environment)
    Show,

    /// Validate the configuration
    Validate,
}

pub fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    let source = ctx
        .config_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());

    match args.action {
        ConfigAction::Show => match ctx.output() {
            OutputFormat::Human => {
                println!("Current configuration ({}):", source);
                print!("{}", serde_yaml::to_string(ctx.config())?);
            }
            format => print_structured(ctx.config(), format)?,
        },
        ConfigAction::Validate => {
            // Loading already validated it
            println!("Configuration from {} is valid", source);
        }
    }
    Ok(())
}
