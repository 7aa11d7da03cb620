//! Rule-triggered action dispatch.
//!
//! Validates a declarative action map once, then resolves matched rules into
//! custom callbacks, tracking events, profile patches and class changes, and
//! reports their aggregate completion.

pub mod action;
pub mod context;
pub mod dispatcher;
pub mod dom;
pub mod error;
pub mod join;
pub mod map;
pub mod schema;
pub mod test_support;
pub mod trigger;
pub mod types;
pub mod value;

pub use action::{create_action, Action, Completion, Handler, PendingCompletion};
pub use context::{CollaboratorFuture, ExecutionContext, Logger, PatchBuilder, Profile, Tracker, TracingLogger};
pub use dispatcher::{ActionExtension, EXTENSION_NAME};
pub use dom::{Document, Element, MemoryDocument, MemoryElement};
pub use error::{ActionError, CollaboratorError, ValidationError, Violation};
pub use map::ActionMap;
pub use schema::{action_map_schema, Schema};
pub use types::{
    ActionCondition, ActionDefinition, ActionTrigger, PatchDefinition, PatchOperation, Rule,
    Source, StyleDefinition, StyleOperation, Subject, Validation,
};
pub use value::ConfigValue;
