use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::Result;

/// Top-level configuration for the ruleact binary.
///
/// Loaded from `~/.ruleact/config.toml` by default. Every section is optional
/// and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleactConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub document: DocumentConfig,
}

impl RuleactConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RuleactConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }
}

/// General settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Where the action map is read from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// JSON file holding the action map.
    pub path: String,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            path: "actions.json".to_string(),
        }
    }
}

/// In-memory document used when dispatching from the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// JSON file listing the document's elements. An empty document is used
    /// when unset.
    pub path: Option<String>,
}
