//! CLI argument definitions for the ruleact binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ruleact — validate action maps and dispatch rules against them.
#[derive(Parser, Debug)]
#[command(name = "ruleact", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check an action map file and report the first problem.
    Validate {
        /// Action map JSON file.
        #[arg(short = 'a', long = "actions")]
        actions: Option<PathBuf>,
    },
    /// Dispatch a rule against an in-memory document.
    Dispatch {
        /// Name of the matched rule.
        #[arg(short = 'r', long = "rule")]
        rule: String,

        /// Declared action name. Repeat to declare several.
        #[arg(long = "action")]
        action: Vec<String>,

        /// Action map JSON file.
        #[arg(short = 'a', long = "actions")]
        actions: Option<PathBuf>,

        /// Document JSON file (a list of elements).
        #[arg(short = 'd', long = "document")]
        document: Option<PathBuf>,

        /// Fire an event after dispatch, as `SELECTOR:EVENT`. Repeatable.
        #[arg(long = "fire")]
        fire: Vec<String>,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RULEACT_CONFIG env var > platform default (~/.ruleact/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("RULEACT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value > "info".
    /// `RUST_LOG` still overrides the result when the filter is built.
    pub fn resolve_log_level(&self, config_level: Option<&str>) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        match config_level {
            Some(level) if !level.is_empty() => level.to_string(),
            _ => "info".to_string(),
        }
    }
}

/// Resolve the action map path: --actions flag > config file value.
pub fn resolve_actions_path(flag: Option<&PathBuf>, config_path: &str) -> PathBuf {
    flag.cloned().unwrap_or_else(|| PathBuf::from(config_path))
}

/// Resolve the document path: --document flag > config file value.
pub fn resolve_document_path(flag: Option<&PathBuf>, config_path: Option<&str>) -> Option<PathBuf> {
    flag.cloned().or_else(|| config_path.map(PathBuf::from))
}

/// Split a `SELECTOR:EVENT` pair at its last colon.
pub fn parse_fire(spec: &str) -> Option<(&str, &str)> {
    let (selector, event) = spec.rsplit_once(':')?;
    let (selector, event) = (selector.trim(), event.trim());
    if selector.is_empty() || event.is_empty() {
        return None;
    }
    Some((selector, event))
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".ruleact").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".ruleact").join("config.toml");
    }
    PathBuf::from("config.toml")
}
