//! Configuration management
//!
//! Layers, lowest to highest priority: built-in defaults, the YAML file,
//! then `PAGEPILOT__SECTION__KEY=value` environment overrides.

use action_locator::LocatorConfig;
use action_primitives::Tempo;
use cdp_adapter::CdpConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const ENV_PREFIX: &str = "PAGEPILOT__";
pub const LOCAL_CONFIG: &str = "config/pagepilot.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
    #[error("unsupported config key: {0}")]
    UnsupportedKey(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything the CLI needs to drive one browser session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagePilotConfig {
    pub browser: CdpConfig,
    pub tempo: Tempo,
    pub locator: LocatorConfig,
    /// Where `take_screenshot` writes its PNGs
    pub screenshots_dir: PathBuf,
}

impl Default for PagePilotConfig {
    fn default() -> Self {
        Self {
            browser: CdpConfig::default(),
            tempo: Tempo::default(),
            locator: LocatorConfig::default(),
            screenshots_dir: PathBuf::from("."),
        }
    }
}

pub struct LoadedConfig {
    pub config: PagePilotConfig,
    /// File the config was read from, if any
    pub path: Option<PathBuf>,
}

impl PagePilotConfig {
    /// Load defaults, then the config file, then environment overrides.
    ///
    /// An explicit path must exist. Without one, `config/pagepilot.yaml` and
    /// then `<config dir>/pagepilot/config.yaml` are tried; neither is required.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_path(),
        };

        let mut value = to_value(&PagePilotConfig::default())?;
        let mut source = None;
        match path {
            Some(path) if path.exists() => {
                merge(&mut value, read_file(&path)?);
                info!(path = %path.display(), "Loaded configuration");
                source = Some(path);
            }
            Some(path) if explicit.is_some() => {
                return Err(ConfigError::Io {
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
                    path,
                });
            }
            Some(path) => {
                warn!(path = %path.display(), "Config file not found, using defaults");
            }
            None => {}
        }

        apply_env_overrides(&mut value, env::vars())?;

        let config: PagePilotConfig =
            serde_json::from_value(value).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        config.validate()?;
        Ok(LoadedConfig {
            config,
            path: source,
        })
    }

    /// Parse a YAML document over the defaults, without environment overrides
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let mut value = to_value(&PagePilotConfig::default())?;
        merge(&mut value, parse_yaml(content, Path::new("<inline>"))?);
        let config: PagePilotConfig =
            serde_json::from_value(value).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.browser
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.locator.click_timeout_ms == 0 || self.locator.fill_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "locator timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_path() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir().map(|mut path| {
        path.push("pagepilot");
        path.push("config.yaml");
        path
    })
}

fn to_value(config: &PagePilotConfig) -> Result<Value, ConfigError> {
    serde_json::to_value(config).map_err(|err| ConfigError::Invalid(err.to_string()))
}

fn read_file(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_yaml(&content, path)
}

fn parse_yaml(content: &str, path: &Path) -> Result<Value, ConfigError> {
    let parse_err = |reason: String| ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
    };
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|err| parse_err(err.to_string()))?;
    match serde_json::to_value(yaml).map_err(|err| parse_err(err.to_string()))? {
        Value::Null => Ok(Value::Object(Default::default())),
        value @ Value::Object(_) => Ok(value),
        _ => Err(parse_err("top level must be a mapping".to_string())),
    }
}

/// Deep-merge `overlay` into `base`; non-object values replace
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn apply_env_overrides(
    value: &mut Value,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<(), ConfigError> {
    let mut overrides: Vec<(String, String)> = vars
        .into_iter()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();
    overrides.sort();

    for (key, raw) in overrides {
        let path: Vec<String> = key[ENV_PREFIX.len()..]
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_ascii_lowercase())
            .collect();
        if path.is_empty() {
            continue;
        }
        debug!(key = %key, "Applying environment override");
        set_path(value, &path, parse_env_value(&raw))
            .ok_or_else(|| ConfigError::UnsupportedKey(key.clone()))?;
    }
    Ok(())
}

/// Replace an existing leaf; unknown keys are rejected
fn set_path(root: &mut Value, path: &[String], new_value: Value) -> Option<()> {
    let mut node = root;
    for segment in path {
        node = node.as_object_mut()?.get_mut(segment)?;
    }
    *node = new_value;
    Some(())
}

fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return parsed;
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = PagePilotConfig::from_yaml_str(
            "tempo:\n  per_char_delay_ms: 20\nlocator:\n  element_types: [button]\n",
        )
        .unwrap();
        assert_eq!(config.tempo.per_char_delay_ms, 20);
        assert_eq!(config.tempo.scroll_settle_ms, 500);
        assert_eq!(config.locator.element_types, vec!["button".to_string()]);
        assert_eq!(config.locator.fill_timeout_ms, 5000);
        assert_eq!(config.browser, CdpConfig::default());
    }

    #[test]
    fn empty_document_is_defaults() {
        assert_eq!(
            PagePilotConfig::from_yaml_str("").unwrap(),
            PagePilotConfig::default()
        );
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let err = PagePilotConfig::from_yaml_str("- a\n- b\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_replace_leaves() {
        let mut value = to_value(&PagePilotConfig::default()).unwrap();
        apply_env_overrides(
            &mut value,
            vars(&[
                ("PAGEPILOT__TEMPO__PER_CHAR_DELAY_MS", "5"),
                ("PAGEPILOT__BROWSER__DEBUGGER_URL", "http://10.0.0.2:9333"),
                ("PAGEPILOT__BROWSER__HEADLESS", "false"),
                ("PAGEPILOT__LOCATOR__CALL_TIMEOUT_MS", "60000"),
                ("PAGEPILOT__SCREENSHOTS_DIR", "shots"),
                ("UNRELATED", "1"),
            ]),
        )
        .unwrap();
        let config: PagePilotConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.tempo.per_char_delay_ms, 5);
        assert_eq!(config.browser.debugger_url, "http://10.0.0.2:9333");
        assert!(!config.browser.headless);
        assert_eq!(config.locator.call_timeout_ms, Some(60_000));
        assert_eq!(config.screenshots_dir, PathBuf::from("shots"));
    }

    #[test]
    fn unknown_env_key_is_rejected() {
        let mut value = to_value(&PagePilotConfig::default()).unwrap();
        let err = apply_env_overrides(&mut value, vars(&[("PAGEPILOT__TEMPO__WARP", "1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedKey(ref key) if key == "PAGEPILOT__TEMPO__WARP"));
    }

    #[test]
    fn invalid_debugger_url_fails_validation() {
        let err =
            PagePilotConfig::from_yaml_str("browser:\n  debugger_url: \"not a url\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_timeouts_fail_validation() {
        let err = PagePilotConfig::from_yaml_str("locator:\n  fill_timeout_ms: 0\n").unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }
}
