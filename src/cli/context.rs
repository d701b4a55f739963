use std::path::{Path, PathBuf};

use pagepilot_cli::{LoadedConfig, PagePilotConfig};

use super::output::OutputFormat;

pub struct CliContext {
    config: PagePilotConfig,
    config_path: Option<PathBuf>,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(loaded: LoadedConfig, output: OutputFormat) -> Self {
        Self {
            config: loaded.config,
            config_path: loaded.path,
            output,
        }
    }

    pub fn config(&self) -> &PagePilotConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}
