use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};
use url::Url;
use which::which;

use crate::error::{AdapterError, AdapterErrorKind};

pub const DEFAULT_DEBUGGER_URL: &str = "http://127.0.0.1:9222";

/// How to reach the browser (the `browser:` config section).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpConfig {
    /// Remote debugging endpoint of an already running Chrome
    pub debugger_url: String,

    /// Launch a fresh browser instead of connecting
    pub launch: bool,

    pub headless: bool,

    /// Browser binary for `launch`; detected when unset
    pub executable: Option<PathBuf>,

    pub navigation_timeout_ms: u64,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            debugger_url: DEFAULT_DEBUGGER_URL.to_string(),
            launch: false,
            headless: true,
            executable: None,
            navigation_timeout_ms: 30_000,
        }
    }
}

impl CdpConfig {
    pub fn validate(&self) -> Result<(), AdapterError> {
        if self.launch {
            return Ok(());
        }
        let url = Url::parse(&self.debugger_url).map_err(|err| {
            AdapterError::new(AdapterErrorKind::InvalidConfig)
                .with_hint(format!("debugger_url '{}': {}", self.debugger_url, err))
        })?;
        match url.scheme() {
            "http" | "https" | "ws" | "wss" => Ok(()),
            other => Err(AdapterError::new(AdapterErrorKind::InvalidConfig)
                .with_hint(format!("unsupported debugger_url scheme '{}'", other))),
        }
    }

    /// Explicit executable, else `PAGEPILOT_CHROME`, else the first known
    /// Chrome/Chromium binary on `PATH`.
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        if let Some(path) = &self.executable {
            return Some(path.clone());
        }
        if let Ok(raw) = env::var("PAGEPILOT_CHROME") {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        chrome_executable_names()
            .iter()
            .find_map(|name| which(name).ok())
    }
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_connect_to_local_debugger() {
        let cfg = CdpConfig::default();
        assert_eq!(cfg.debugger_url, DEFAULT_DEBUGGER_URL);
        assert!(!cfg.launch);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_debugger_url() {
        let cfg = CdpConfig {
            debugger_url: "127.0.0.1:9222".into(),
            ..CdpConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.kind, AdapterErrorKind::InvalidConfig);
    }

    #[test]
    fn launch_mode_ignores_debugger_url() {
        let cfg = CdpConfig {
            debugger_url: String::new(),
            launch: true,
            ..CdpConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn explicit_executable_wins() {
        let cfg = CdpConfig {
            executable: Some(PathBuf::from("/opt/chrome/chrome")),
            ..CdpConfig::default()
        };
        assert_eq!(
            cfg.resolve_executable(),
            Some(PathBuf::from("/opt/chrome/chrome"))
        );
    }
}
