/// Server configuration: defaults, workspace file, client options.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::fences::DEFAULT_LANGUAGES;
use crate::playground::DEFAULT_BASE_URL;

/// Workspace-level config file, read from the workspace root.
pub(crate) const CONFIG_FILE_NAME: &str = ".ts-playground.yaml";

/// Key of this server's section in client settings.
pub(crate) const SETTINGS_SECTION: &str = "tsPlayground";

pub(crate) const DEFAULT_TOOLTIP: &str = "Open in TypeScript Playground";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Effective settings for link provisioning and URL building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaygroundConfig {
    /// Prefix the percent-encoded code is appended to.
    pub base_url: String,
    /// Fence tags that get a playground link (exact match).
    pub languages: Vec<String>,
    pub tooltip: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            tooltip: DEFAULT_TOOLTIP.to_string(),
        }
    }
}

/// A partial configuration; absent fields leave the current value alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub languages: Option<Vec<String>>,
    pub tooltip: Option<String>,
}

impl PlaygroundConfig {
    /// Build the configuration from the workspace file and the client's
    /// `initializationOptions`, in that order of precedence (lowest first).
    pub fn load(root: Option<&Path>, init_options: Option<&serde_json::Value>) -> Self {
        let mut config = Self::default();

        if let Some(root) = root {
            match read_file(&root.join(CONFIG_FILE_NAME)) {
                Ok(Some(overrides)) => {
                    info!(root = %root.display(), "config: loaded workspace config file");
                    config.apply(overrides);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "config: ignoring workspace config file"),
            }
        }

        if let Some(options) = init_options {
            match from_json(options) {
                Ok(overrides) => config.apply(overrides),
                Err(e) => warn!(error = %e, "config: ignoring initializationOptions"),
            }
        }

        config
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(languages) = overrides.languages {
            self.languages = languages;
        }
        if let Some(tooltip) = overrides.tooltip {
            self.tooltip = tooltip;
        }
    }
}

/// Read overrides from a YAML file; a missing or empty file yields `None`.
pub(crate) fn read_file(path: &Path) -> Result<Option<ConfigOverrides>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if contents.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
}

/// Parse overrides from client-supplied JSON; `null` means no overrides.
pub(crate) fn from_json(value: &serde_json::Value) -> Result<ConfigOverrides, ConfigError> {
    if value.is_null() {
        return Ok(ConfigOverrides::default());
    }
    Ok(ConfigOverrides::deserialize(value)?)
}

/// Overrides from `workspace/didChangeConfiguration` settings, given either
/// bare or under the `tsPlayground` key.
pub(crate) fn settings_overrides(settings: &serde_json::Value) -> Result<ConfigOverrides, ConfigError> {
    from_json(settings.get(SETTINGS_SECTION).unwrap_or(settings))
}
