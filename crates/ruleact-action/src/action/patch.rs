use serde_json::Value;

use super::{Action, Completion};
use crate::context::ExecutionContext;
use crate::dom::element_value;
use crate::error::ActionError;
use crate::types::{PatchDefinition, PatchOperation, Source};

/// Writes one attribute on the user or session profile.
pub struct PatchAction {
    definition: PatchDefinition,
}

impl PatchAction {
    pub fn new(definition: PatchDefinition) -> Self {
        Self { definition }
    }

    /// Resolve the value to write, or `None` to skip the patch.
    fn resolve_value(&self, ctx: &ExecutionContext) -> Option<Value> {
        match &self.definition.source {
            Source::Provided { value } => Some(value.clone()),
            Source::Element {
                selector,
                validation,
                normalization,
            } => {
                let element = ctx.document().query(selector)?;
                let captured = element_value(element.as_ref())?;
                if captured.is_empty() {
                    return None;
                }
                if let Some(validation) = validation {
                    if !validation.accepts(&captured) {
                        return None;
                    }
                }
                Some(match normalization {
                    Some(normalize) => normalize(&captured),
                    None => Value::String(captured),
                })
            }
        }
    }
}

impl Action for PatchAction {
    fn apply(&self, ctx: &ExecutionContext) -> Completion {
        let Some(value) = self.resolve_value(ctx) else {
            tracing::debug!(attribute = %self.definition.attribute, "No value to patch, skipping");
            return Completion::Done;
        };

        let PatchDefinition {
            subject,
            attribute,
            operation,
            ..
        } = &self.definition;

        let mut patch = ctx.profile().edit(*subject);
        match operation {
            PatchOperation::Set => patch.set(attribute, value),
            PatchOperation::Add => patch.add(attribute, value),
            PatchOperation::Combine => patch.combine(attribute, value),
        }

        let subject = *subject;
        let saved = patch.save();
        Completion::pending(async move {
            saved
                .await
                .map_err(|source| ActionError::Patch { subject, source })
        })
    }
}
