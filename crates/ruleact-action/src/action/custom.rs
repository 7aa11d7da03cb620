use std::fmt;
use std::sync::Arc;

use super::{Action, Completion};
use crate::context::ExecutionContext;
use crate::join::join_pending;
use crate::value::{ConfigValue, HandlerFn};

/// One entry of a custom action's handler list.
#[derive(Clone)]
pub enum Handler {
    /// A plain function.
    Callable(HandlerFn),
    /// An object exposing `apply`.
    Delegate(Arc<dyn Action>),
    /// Neither; carries the type name of what was supplied.
    Unsupported(String),
}

impl Handler {
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&ExecutionContext) -> Completion + Send + Sync + 'static,
    {
        Handler::Callable(Arc::new(f))
    }

    pub fn delegate<A: Action + 'static>(action: A) -> Self {
        Handler::Delegate(Arc::new(action))
    }

    /// Interpret a host value as a handler. Objects whose `apply` member is a
    /// function are treated as callables.
    pub fn from_config(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Function(f) => Handler::Callable(Arc::clone(f)),
            ConfigValue::Delegate(action) => Handler::Delegate(Arc::clone(action)),
            ConfigValue::Object(_) => match value.get("apply") {
                Some(ConfigValue::Function(f)) => Handler::Callable(Arc::clone(f)),
                _ => Handler::Unsupported(value.type_name().to_string()),
            },
            other => Handler::Unsupported(other.type_name().to_string()),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Callable(_) => f.write_str("Callable(..)"),
            Handler::Delegate(_) => f.write_str("Delegate(..)"),
            Handler::Unsupported(kind) => f.debug_tuple("Unsupported").field(kind).finish(),
        }
    }
}

/// Runs a list of host-supplied handlers in order.
pub struct CustomAction {
    handlers: Vec<Handler>,
}

impl CustomAction {
    pub fn new(handlers: Vec<Handler>) -> Self {
        Self { handlers }
    }
}

impl Action for CustomAction {
    fn apply(&self, ctx: &ExecutionContext) -> Completion {
        let mut pending = Vec::new();

        for handler in &self.handlers {
            let completion = match handler {
                Handler::Callable(f) => f(ctx),
                Handler::Delegate(action) => action.apply(ctx),
                Handler::Unsupported(kind) => {
                    ctx.logger().error(&format!(
                        "Expected an action object or function but got {}.",
                        kind
                    ));
                    continue;
                }
            };
            pending.extend(completion.into_pending());
        }

        if pending.is_empty() {
            Completion::Done
        } else {
            Completion::pending(join_pending(pending))
        }
    }
}
