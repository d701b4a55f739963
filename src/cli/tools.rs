use anyhow::Result;
use browser_tools::{builtin_tools, ToolDefinition};
use clap::Args;

use crate::cli::context::CliContext;
use crate::cli::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ToolsArgs {
    /// Only print this tool
    #[arg(long)]
    pub name: Option<String>,
}

pub fn cmd_tools(args: ToolsArgs, ctx: &CliContext) -> Result<()> {
    let definitions: Vec<ToolDefinition> = builtin_tools()
        .iter()
        .map(|tool| tool.definition().clone())
        .filter(|def| args.name.as_deref().map_or(true, |name| def.name == name))
        .collect();

    if definitions.is_empty() {
        if let Some(name) = args.name {
            anyhow::bail!("unknown tool: {}", name);
        }
    }

    match ctx.output() {
        OutputFormat::Human => {
            println!("{:<24} {}", "Tool", "Description");
            println!("{}", "-".repeat(72));
            for def in &definitions {
                println!("{:<24} {}", def.name, def.description);
            }
        }
        format => print_structured(&definitions, format)?,
    }
    Ok(())
}
