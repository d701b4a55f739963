//! Task scripts: an ordered list of tool calls and pauses, run through a
//! [`ToolBox`] strictly in order.
//!
//! ```yaml
//! name: guest-book
//! continue_on_error: false
//! steps:
//!   - tool: open_url
//!     args: { url: "https://example.com" }
//!   - pause_ms: 45000
//! ```

use browser_tools::ToolBox;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid task script: {0}")]
    Parse(String),
    #[error("task script '{0}' has no steps")]
    Empty(String),
    #[error("step {step}: environment variable '{name}' is not set")]
    UnsetVariable { step: usize, name: String },
    #[error("step {step}: malformed placeholder in '{text}'")]
    BadPlaceholder { step: usize, text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskScript {
    pub name: String,

    /// Keep going after a failed step
    #[serde(default)]
    pub continue_on_error: bool,

    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Tool {
        tool: String,
        #[serde(default = "empty_args")]
        args: Value,
    },
    /// Wait without touching the page, e.g. for a human OTP entry
    Pause { pause_ms: u64 },
}

fn empty_args() -> Value {
    Value::Object(Map::new())
}

impl Step {
    /// Tool name, or `pause`
    pub fn label(&self) -> &str {
        match self {
            Step::Tool { tool, .. } => tool,
            Step::Pause { .. } => "pause",
        }
    }
}

impl TaskScript {
    pub fn from_yaml_str(content: &str) -> Result<Self, ScriptError> {
        let script: TaskScript =
            serde_yaml::from_str(content).map_err(|err| ScriptError::Parse(err.to_string()))?;
        if script.steps.is_empty() {
            return Err(ScriptError::Empty(script.name));
        }
        Ok(script)
    }

    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Replace `${VAR}` in every string argument using `lookup`.
    ///
    /// Fails on the first unset variable, before any step runs.
    pub fn resolve_vars<F>(&self, lookup: F) -> Result<TaskScript, ScriptError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| match step {
                Step::Tool { tool, args } => Ok(Step::Tool {
                    tool: tool.clone(),
                    args: substitute_value(args, index + 1, &lookup)?,
                }),
                Step::Pause { pause_ms } => Ok(Step::Pause {
                    pause_ms: *pause_ms,
                }),
            })
            .collect::<Result<Vec<_>, ScriptError>>()?;

        Ok(TaskScript {
            name: self.name.clone(),
            continue_on_error: self.continue_on_error,
            steps,
        })
    }

    /// [`TaskScript::resolve_vars`] against the process environment
    pub fn resolve_env(&self) -> Result<TaskScript, ScriptError> {
        self.resolve_vars(|name| std::env::var(name).ok())
    }
}

fn substitute_value<F>(value: &Value, step: usize, lookup: &F) -> Result<Value, ScriptError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(match value {
        Value::String(text) => Value::String(substitute_str(text, step, lookup)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_value(item, step, lookup))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| Ok((key.clone(), substitute_value(item, step, lookup)?)))
                .collect::<Result<_, ScriptError>>()?,
        ),
        other => other.clone(),
    })
}

fn substitute_str<F>(text: &str, step: usize, lookup: &F) -> Result<String, ScriptError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| ScriptError::BadPlaceholder {
            step,
            text: text.to_string(),
        })?;
        let name = &after[..end];
        if !is_var_name(name) {
            return Err(ScriptError::BadPlaceholder {
                step,
                text: text.to_string(),
            });
        }
        let value = lookup(name).ok_or_else(|| ScriptError::UnsetVariable {
            step,
            name: name.to_string(),
        })?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn is_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailure {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    /// 1-based position in the script
    pub index: usize,
    pub tool: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepFailure>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptReport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub success: bool,
    pub elapsed_ms: u64,
    pub steps: Vec<StepReport>,
}

impl ScriptReport {
    pub fn failed_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
            .count()
    }
}

/// Runs resolved task scripts against one tool box
pub struct ScriptRunner<'a> {
    toolbox: &'a ToolBox,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(toolbox: &'a ToolBox) -> Self {
        Self { toolbox }
    }

    /// Run every step in order.
    ///
    /// The first failure marks the remaining steps skipped unless the script
    /// sets `continue_on_error`. Step failures land in the report, not in the
    /// return value.
    pub async fn run(&self, script: &TaskScript) -> ScriptReport {
        let started_at = Utc::now();
        let started = Instant::now();
        info!(script = %script.name, steps = script.steps.len(), "Running task script");

        let mut reports = Vec::with_capacity(script.steps.len());
        let mut halted = false;

        for (offset, step) in script.steps.iter().enumerate() {
            let index = offset + 1;
            if halted {
                reports.push(StepReport {
                    index,
                    tool: step.label().to_string(),
                    status: StepStatus::Skipped,
                    result: None,
                    error: None,
                    elapsed_ms: 0,
                });
                continue;
            }

            let report = self.run_step(index, step).await;
            if report.status == StepStatus::Failed && !script.continue_on_error {
                halted = true;
            }
            reports.push(report);
        }

        let report = ScriptReport {
            name: script.name.clone(),
            started_at,
            success: reports.iter().all(|s| s.status == StepStatus::Ok),
            elapsed_ms: started.elapsed().as_millis() as u64,
            steps: reports,
        };
        info!(
            script = %report.name,
            success = report.success,
            failed = report.failed_steps(),
            elapsed_ms = report.elapsed_ms,
            "Task script finished"
        );
        report
    }

    async fn run_step(&self, index: usize, step: &Step) -> StepReport {
        let started = Instant::now();
        let outcome = match step {
            Step::Pause { pause_ms } => {
                info!(step = index, pause_ms, "Pausing");
                tokio::time::sleep(Duration::from_millis(*pause_ms)).await;
                Ok(json!({ "paused_ms": pause_ms }))
            }
            Step::Tool { tool, args } => self.toolbox.call(tool, args.clone()).await,
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => StepReport {
                index,
                tool: step.label().to_string(),
                status: StepStatus::Ok,
                result: Some(result),
                error: None,
                elapsed_ms,
            },
            Err(err) => {
                warn!(step = index, tool = step.label(), error = %err, "Step failed");
                StepReport {
                    index,
                    tool: step.label().to_string(),
                    status: StepStatus::Failed,
                    result: None,
                    error: Some(StepFailure {
                        kind: err.kind(),
                        message: err.to_string(),
                    }),
                    elapsed_ms,
                }
            }
        }
    }
}
