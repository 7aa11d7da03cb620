use super::{Action, Completion};
use crate::context::ExecutionContext;
use crate::types::{StyleDefinition, StyleOperation};

/// Adds or removes classes on every element matching a selector.
pub struct StyleAction {
    definition: StyleDefinition,
}

impl StyleAction {
    pub fn new(definition: StyleDefinition) -> Self {
        Self { definition }
    }
}

impl Action for StyleAction {
    fn apply(&self, ctx: &ExecutionContext) -> Completion {
        let StyleDefinition {
            selector,
            operation,
            class_names,
        } = &self.definition;

        for element in ctx.document().query_all(selector) {
            match operation {
                StyleOperation::Add => element.add_classes(class_names),
                StyleOperation::Remove => element.remove_classes(class_names),
            }
        }

        Completion::Done
    }
}
