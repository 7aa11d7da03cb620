//! Collaborators for command-line dispatch: every outbound call is logged
//! instead of sent anywhere.

use futures::future::{self, FutureExt};
use serde_json::{Map, Value};

use ruleact_action::{CollaboratorFuture, PatchBuilder, PatchOperation, Profile, Subject, Tracker};

/// Logs tracked events at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTracker;

impl Tracker for LoggingTracker {
    fn track(&self, event_type: &str, payload: Map<String, Value>) -> CollaboratorFuture {
        let payload = Value::Object(payload);
        tracing::info!(event_type, payload = %payload, "Event tracked");
        future::ok(()).boxed()
    }
}

/// Logs profile patches when they are saved.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingProfile;

impl Profile for LoggingProfile {
    fn edit(&self, subject: Subject) -> Box<dyn PatchBuilder> {
        Box::new(LoggingPatch {
            subject,
            operations: Vec::new(),
        })
    }
}

struct LoggingPatch {
    subject: Subject,
    operations: Vec<(PatchOperation, String, Value)>,
}

impl PatchBuilder for LoggingPatch {
    fn set(&mut self, attribute: &str, value: Value) {
        self.operations
            .push((PatchOperation::Set, attribute.to_string(), value));
    }

    fn add(&mut self, attribute: &str, value: Value) {
        self.operations
            .push((PatchOperation::Add, attribute.to_string(), value));
    }

    fn combine(&mut self, attribute: &str, value: Value) {
        self.operations
            .push((PatchOperation::Combine, attribute.to_string(), value));
    }

    fn save(self: Box<Self>) -> CollaboratorFuture {
        for (operation, attribute, value) in &self.operations {
            tracing::info!(
                subject = %self.subject,
                operation = %operation,
                attribute = %attribute,
                value = %value,
                "Profile patched"
            );
        }
        future::ok(()).boxed()
    }
}
