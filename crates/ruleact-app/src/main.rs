//! ruleact binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize logging
//! 3. Load and validate the action map
//! 4. Optionally dispatch a rule against an in-memory document

mod cli;
mod collaborators;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;

use ruleact_action::dom::selector::SelectorTarget;
use ruleact_action::{ActionExtension, ActionMap, ConfigValue, ExecutionContext, MemoryDocument, Rule};
use ruleact_core::{telemetry, Result, RuleactConfig, RuleactError};

use cli::{CliArgs, Command};
use collaborators::{LoggingProfile, LoggingTracker};

/// Time given to event-triggered completions before the document is printed.
const SETTLE: Duration = Duration::from_millis(100);

/// Fall back to defaults when the config could not be loaded.
fn config_or_default(loaded: Result<RuleactConfig>, path: &Path) -> RuleactConfig {
    match loaded {
        Ok(config) => config,
        Err(e) => {
            if path.exists() {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load config. Using defaults.");
            } else {
                tracing::debug!(path = %path.display(), "No config file. Using defaults.");
            }
            RuleactConfig::default()
        }
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn load_document(path: Option<&Path>) -> Result<MemoryDocument> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let document = MemoryDocument::from_json(&content)?;
            tracing::info!(path = %path.display(), elements = document.len(), "Document loaded");
            Ok(document)
        }
        None => Ok(MemoryDocument::new()),
    }
}

fn validate(actions: &Path) -> Result<ExitCode> {
    let json = read_json(actions)?;
    match ActionMap::from_json(&json) {
        Ok(map) => {
            tracing::info!(path = %actions.display(), actions = map.len(), "Action map is valid");
            println!("ok");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn declared_actions(names: &[String]) -> Option<Value> {
    match names {
        [] => None,
        [single] => Some(Value::String(single.clone())),
        many => Some(Value::from(many.to_vec())),
    }
}

async fn dispatch(
    rule_name: &str,
    names: &[String],
    actions: &Path,
    document: Option<&Path>,
    fire: &[String],
) -> Result<ExitCode> {
    let options = ConfigValue::from(read_json(actions)?);
    let document = Arc::new(load_document(document)?);
    let context = ExecutionContext::new(
        Arc::new(LoggingTracker),
        Arc::new(LoggingProfile),
        document.clone(),
    );
    let extension = ActionExtension::initialize(&options, context)?;

    let mut rule = Rule::new(rule_name);
    if let Some(declared) = declared_actions(names) {
        rule = rule.with_action(declared);
    }

    if let Err(e) = extension.apply(&rule).await {
        tracing::error!(rule = %rule_name, error = %e, "Dispatch failed");
        eprintln!("{}", e);
        return Ok(ExitCode::FAILURE);
    }
    tracing::info!(rule = %rule_name, "Dispatch complete");

    for spec in fire {
        let (selector, event) = cli::parse_fire(spec).ok_or_else(|| {
            RuleactError::Config(format!("Invalid --fire value \"{}\", expected SELECTOR:EVENT", spec))
        })?;
        let listeners = document.dispatch_event(selector, event);
        tracing::info!(selector, event, listeners, "Event fired");
    }
    if !fire.is_empty() {
        tokio::time::sleep(SETTLE).await;
    }

    for element in document.select("*") {
        let id = element.attribute("id").map(|id| format!("#{}", id)).unwrap_or_default();
        println!("{}{} [{}]", element.tag(), id, element.classes().join(" "));
    }

    Ok(ExitCode::SUCCESS)
}

async fn run(args: CliArgs, config: RuleactConfig) -> Result<ExitCode> {
    match args.command {
        Command::Validate { actions } => {
            let path = cli::resolve_actions_path(actions.as_ref(), &config.actions.path);
            validate(&path)
        }
        Command::Dispatch {
            rule,
            action,
            actions,
            document,
            fire,
        } => {
            let path = cli::resolve_actions_path(actions.as_ref(), &config.actions.path);
            let document = cli::resolve_document_path(document.as_ref(), config.document.path.as_deref());
            dispatch(&rule, &action, &path, document.as_deref(), &fire).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Config is read before logging starts so its log level can apply.
    let config_file = args.resolve_config_path();
    let loaded = RuleactConfig::load(&config_file);
    let log_level = args.resolve_log_level(loaded.as_ref().ok().map(|c| c.general.log_level.as_str()));
    telemetry::init(&log_level);

    tracing::info!("Starting ruleact v{}", env!("CARGO_PKG_VERSION"));

    let config = config_or_default(loaded, &config_file);

    match run(args, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "ruleact failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_json(value: Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(value.to_string().as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_or_default() {
        let missing = Path::new("/nonexistent/config.toml");
        let config = config_or_default(RuleactConfig::load(missing), missing);
        assert_eq!(config.actions.path, "actions.json");

        let mut broken = NamedTempFile::new().unwrap();
        broken.write_all(b"[general\nlog_level = 1").unwrap();
        let config = config_or_default(RuleactConfig::load(broken.path()), broken.path());
        assert_eq!(config.general.log_level, "info");

        let mut valid = NamedTempFile::new().unwrap();
        valid.write_all(b"[general]\nlog_level = \"debug\"\n").unwrap();
        let config = config_or_default(RuleactConfig::load(valid.path()), valid.path());
        assert_eq!(config.general.log_level, "debug");
    }

    #[test]
    fn test_declared_actions() {
        assert_eq!(declared_actions(&[]), None);
        assert_eq!(declared_actions(&["a".to_string()]), Some(json!("a")));
        assert_eq!(
            declared_actions(&["a".to_string(), "b".to_string()]),
            Some(json!(["a", "b"]))
        );
    }

    #[test]
    fn test_validate_reports_result() {
        let good = temp_json(json!({"a": {"trigger": {"type": "match"}, "action": {"type": "tracking", "event": {"type": "x"}}}}));
        assert_eq!(validate(good.path()).unwrap(), ExitCode::SUCCESS);

        let bad = temp_json(json!({"a": {"trigger": {"type": "match"}}}));
        assert_eq!(validate(bad.path()).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn test_validate_missing_file_is_error() {
        assert!(matches!(
            validate(Path::new("/nonexistent/actions.json")),
            Err(RuleactError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_with_document_and_events() {
        let actions = temp_json(json!({
            "highlight": {
                "trigger": {"type": "event", "element": ".cta", "event": "click"},
                "action": {"type": "style", "element": ".cta", "operation": "add", "className": "clicked"}
            },
            "track": {
                "trigger": {"type": "match"},
                "action": {"type": "tracking", "event": {"type": "promoShown"}}
            }
        }));
        let document = temp_json(json!([{"tag": "button", "classes": ["cta"]}]));

        let code = dispatch(
            "promo",
            &["highlight".to_string(), "track".to_string()],
            actions.path(),
            Some(document.path()),
            &[".cta:click".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_dispatch_rejects_invalid_map() {
        let actions = temp_json(json!({"a": {"trigger": {"type": "never"}, "action": {"type": "style"}}}));
        let result = dispatch("r", &["a".to_string()], actions.path(), None, &[]).await;
        assert!(matches!(result, Err(RuleactError::Validation(_))));
    }

    #[tokio::test]
    async fn test_dispatch_rejects_bad_fire_spec() {
        let actions = temp_json(json!({}));
        let result = dispatch("r", &[], actions.path(), None, &["click".to_string()]).await;
        assert!(matches!(result, Err(RuleactError::Config(_))));
    }
}
