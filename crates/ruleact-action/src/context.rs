//! Execution context and the outbound collaborator contracts.
//!
//! Actions never reach for global state: the tracker, profile store, document
//! and logger all come in through [`ExecutionContext`].

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::dom::Document;
use crate::error::CollaboratorError;
use crate::types::Subject;

/// Outcome of an outbound call that has already been made.
pub type CollaboratorFuture = BoxFuture<'static, Result<(), CollaboratorError>>;

/// Event-tracking collaborator.
pub trait Tracker: Send + Sync {
    /// Send the event. The call goes out before this returns; the future only
    /// reports how it ended and dropping it must not withdraw the event.
    fn track(&self, event_type: &str, payload: Map<String, Value>) -> CollaboratorFuture;
}

/// Profile collaborator: opens patch sessions on the user or session.
pub trait Profile: Send + Sync {
    fn edit(&self, subject: Subject) -> Box<dyn PatchBuilder>;
}

/// An open edit session. Operations are buffered until `save`.
pub trait PatchBuilder: Send {
    fn set(&mut self, attribute: &str, value: Value);
    fn add(&mut self, attribute: &str, value: Value);
    fn combine(&mut self, attribute: &str, value: Value);
    /// Submit the buffered operations. Same contract as [`Tracker::track`].
    fn save(self: Box<Self>) -> CollaboratorFuture;
}

/// Structured logger collaborator. Must never fail.
pub trait Logger: Send + Sync {
    fn error(&self, message: &str);
}

/// Forwards to `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, message: &str) {
        tracing::error!(target: "ruleact::actions", "{}", message);
    }
}

/// Everything an action may touch while it runs.
#[derive(Clone)]
pub struct ExecutionContext {
    tracker: Arc<dyn Tracker>,
    profile: Arc<dyn Profile>,
    document: Arc<dyn Document>,
    logger: Arc<dyn Logger>,
}

impl ExecutionContext {
    /// Create a context that logs through `tracing`.
    pub fn new(
        tracker: Arc<dyn Tracker>,
        profile: Arc<dyn Profile>,
        document: Arc<dyn Document>,
    ) -> Self {
        Self {
            tracker,
            profile,
            document,
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn tracker(&self) -> &Arc<dyn Tracker> {
        &self.tracker
    }

    pub fn profile(&self) -> &Arc<dyn Profile> {
        &self.profile
    }

    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Whether both contexts share the same collaborators.
    pub fn same_as(&self, other: &ExecutionContext) -> bool {
        Arc::ptr_eq(&self.tracker, &other.tracker)
            && Arc::ptr_eq(&self.profile, &other.profile)
            && Arc::ptr_eq(&self.document, &other.document)
            && Arc::ptr_eq(&self.logger, &other.logger)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext").finish_non_exhaustive()
    }
}
