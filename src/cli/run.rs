use std::path::PathBuf;
use std::sync::Arc;

use action_locator::ElementResolver;
use action_primitives::ActionExecutor;
use anyhow::{bail, Context, Result};
use browser_tools::{ToolBox, ToolContext};
use cdp_adapter::ChromiumBrowser;
use clap::Args;
use pagepilot_cli::{ScriptReport, ScriptRunner, StepStatus, TaskScript};
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Task script file (YAML)
    pub script: PathBuf,

    /// Launch a browser instead of connecting to `browser.debugger_url`
    #[arg(long)]
    pub launch: bool,

    /// Show the launched browser window
    #[arg(long)]
    pub headful: bool,

    /// Directory for screenshots
    #[arg(long, value_name = "DIR")]
    pub screenshots_dir: Option<PathBuf>,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let script = TaskScript::from_file(&args.script)
        .with_context(|| format!("loading {}", args.script.display()))?
        .resolve_env()?;

    let mut config = ctx.config().clone();
    if args.launch {
        config.browser.launch = true;
    }
    if args.headful {
        config.browser.headless = false;
    }
    if let Some(dir) = args.screenshots_dir {
        config.screenshots_dir = dir;
    }

    let browser = ChromiumBrowser::start(&config.browser)
        .await
        .context("Failed to start browser session")?;
    let page = match browser.page().await {
        Ok(page) => page,
        Err(err) => {
            browser.shutdown().await;
            return Err(err).context("Failed to open a page");
        }
    };

    let executor = ActionExecutor::new(Arc::new(page), config.tempo.clone());
    let resolver = ElementResolver::new(executor, config.locator.clone());
    let toolbox = ToolBox::new(ToolContext::new(resolver, config.screenshots_dir.clone()));

    let report = ScriptRunner::new(&toolbox).run(&script).await;
    drop(toolbox);
    browser.shutdown().await;
    info!(script = %report.name, success = report.success, "Browser session closed");

    match ctx.output() {
        OutputFormat::Human => print_human(&report),
        format => print_structured(&report, format)?,
    }

    if !report.success {
        bail!(
            "task script '{}' failed ({} failed step(s))",
            report.name,
            report.failed_steps()
        );
    }
    Ok(())
}

fn print_human(report: &ScriptReport) {
    println!("Task script: {}", report.name);
    for step in &report.steps {
        let status = match step.status {
            StepStatus::Ok => "ok",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        };
        match &step.error {
            Some(err) => println!(
                "  [{:<7}] {:>2} {} ({} ms): {}",
                status, step.index, step.tool, step.elapsed_ms, err.message
            ),
            None => println!(
                "  [{:<7}] {:>2} {} ({} ms)",
                status, step.index, step.tool, step.elapsed_ms
            ),
        }
    }
    println!(
        "Result: {} in {} ms",
        if report.success { "success" } else { "failed" },
        report.elapsed_ms
    );
}
