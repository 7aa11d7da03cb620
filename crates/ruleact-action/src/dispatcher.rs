//! Rule dispatch.
//!
//! [`ActionExtension`] holds the validated action map for its whole lifetime
//! and turns each matched rule into the side effects its declared actions
//! describe.

use std::sync::Arc;

use serde_json::Value;

use crate::action::create_action;
use crate::context::ExecutionContext;
use crate::error::{ActionError, ValidationError};
use crate::join::join_pending;
use crate::map::ActionMap;
use crate::trigger::bind;
use crate::types::Rule;
use crate::value::{json_type_name, ConfigValue};

/// Name under which the extension registers with the rule engine.
pub const EXTENSION_NAME: &str = "actions";

pub struct ActionExtension {
    actions: Arc<ActionMap>,
    context: ExecutionContext,
}

impl ActionExtension {
    fn new(actions: ActionMap, context: ExecutionContext) -> Self {
        Self {
            actions: Arc::new(actions),
            context,
        }
    }

    /// Validate the host options and build the extension. Nothing is
    /// registered if validation fails.
    pub fn initialize(options: &ConfigValue, context: ExecutionContext) -> Result<Self, ValidationError> {
        let actions = ActionMap::from_config(options)?;
        tracing::info!(extension = EXTENSION_NAME, actions = actions.len(), "Extension initialized");
        Ok(Self::new(actions, context))
    }

    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Run every action `rule` declares.
    ///
    /// Unknown or malformed names are logged and skipped. Resolves once every
    /// match-triggered action completed, failing with the first execution
    /// error; event-triggered actions are only bound.
    pub async fn apply(&self, rule: &Rule) -> Result<(), ActionError> {
        let Some(declared) = rule.action() else {
            return Ok(());
        };

        let names: Vec<&Value> = match declared {
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };

        let logger = self.context.logger();
        let mut pending = Vec::new();

        for declared_name in names {
            let Some(name) = declared_name.as_str() else {
                logger.error(&format!(
                    "Invalid action registered for rule \"{}\", expected a string but got {}.",
                    rule.name,
                    json_type_name(declared_name)
                ));
                continue;
            };

            let Some(conditions) = self.actions.get(name) else {
                logger.error(&format!(
                    "Action \"{}\" registered for rule \"{}\" does not exist.",
                    name, rule.name
                ));
                continue;
            };

            tracing::debug!(rule = %rule.name, action = name, conditions = conditions.len(), "Dispatching action");

            for condition in conditions {
                let action = create_action(&condition.action);
                let completion = bind(&condition.trigger, action, &self.context);
                pending.extend(completion.into_pending());
            }
        }

        join_pending(pending).await
    }
}
