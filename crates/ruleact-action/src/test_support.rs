//! Test support utilities for ruleact-action unit and integration tests.
//! Recording collaborators that capture every call for later assertions.
//! They are public so the integration suite can use them too.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::context::{CollaboratorFuture, ExecutionContext, Logger, PatchBuilder, Profile, Tracker};
use crate::dom::MemoryDocument;
use crate::error::CollaboratorError;
use crate::types::{PatchOperation, Subject};

/// One `track` call.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEvent {
    pub event_type: String,
    pub payload: Map<String, Value>,
}

/// Tracker that records events and optionally delays or fails.
#[derive(Default)]
pub struct RecordingTracker {
    events: Mutex<Vec<TrackedEvent>>,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn events(&self) -> Vec<TrackedEvent> {
        self.events.lock().clone()
    }
}

impl Tracker for RecordingTracker {
    fn track(&self, event_type: &str, payload: Map<String, Value>) -> CollaboratorFuture {
        self.events.lock().push(TrackedEvent {
            event_type: event_type.to_string(),
            payload,
        });
        acknowledge(self.delay, self.failure.clone(), || {}).boxed()
    }
}

/// Resolve after `delay`, failing with `failure` if set, otherwise running
/// `on_success` first.
async fn acknowledge(
    delay: Option<Duration>,
    failure: Option<String>,
    on_success: impl FnOnce(),
) -> Result<(), CollaboratorError> {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    match failure {
        Some(message) => Err(CollaboratorError::new(message)),
        None => {
            on_success();
            Ok(())
        }
    }
}

/// A patch that reached `save`.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPatch {
    pub subject: Subject,
    pub operations: Vec<(PatchOperation, String, Value)>,
}

#[derive(Default)]
struct ProfileLog {
    edits: Vec<Subject>,
    saves: Vec<SavedPatch>,
    committed: Vec<SavedPatch>,
}

/// Profile that records edit sessions and saved patches.
#[derive(Default)]
pub struct RecordingProfile {
    log: Arc<Mutex<ProfileLog>>,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl RecordingProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Subjects passed to `edit`, in call order.
    pub fn edits(&self) -> Vec<Subject> {
        self.log.lock().edits.clone()
    }

    /// Patches passed to `save`, in call order.
    pub fn saves(&self) -> Vec<SavedPatch> {
        self.log.lock().saves.clone()
    }

    /// Saved patches whose save has succeeded.
    pub fn committed(&self) -> Vec<SavedPatch> {
        self.log.lock().committed.clone()
    }
}

impl Profile for RecordingProfile {
    fn edit(&self, subject: Subject) -> Box<dyn PatchBuilder> {
        self.log.lock().edits.push(subject);
        Box::new(RecordingPatch {
            log: Arc::clone(&self.log),
            patch: SavedPatch {
                subject,
                operations: Vec::new(),
            },
            delay: self.delay,
            failure: self.failure.clone(),
        })
    }
}

struct RecordingPatch {
    log: Arc<Mutex<ProfileLog>>,
    patch: SavedPatch,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl RecordingPatch {
    fn record(&mut self, operation: PatchOperation, attribute: &str, value: Value) {
        self.patch
            .operations
            .push((operation, attribute.to_string(), value));
    }
}

impl PatchBuilder for RecordingPatch {
    fn set(&mut self, attribute: &str, value: Value) {
        self.record(PatchOperation::Set, attribute, value);
    }

    fn add(&mut self, attribute: &str, value: Value) {
        self.record(PatchOperation::Add, attribute, value);
    }

    fn combine(&mut self, attribute: &str, value: Value) {
        self.record(PatchOperation::Combine, attribute, value);
    }

    fn save(self: Box<Self>) -> CollaboratorFuture {
        let RecordingPatch {
            log,
            patch,
            delay,
            failure,
        } = *self;
        log.lock().saves.push(patch.clone());
        acknowledge(delay, failure, move || log.lock().committed.push(patch)).boxed()
    }
}

/// Logger that keeps every message.
#[derive(Default)]
pub struct RecordingLogger {
    messages: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Logger for RecordingLogger {
    fn error(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

/// A context wired to recording collaborators, with handles kept for
/// assertions.
pub struct Harness {
    pub tracker: Arc<RecordingTracker>,
    pub profile: Arc<RecordingProfile>,
    pub logger: Arc<RecordingLogger>,
    pub document: Arc<MemoryDocument>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_parts(RecordingTracker::new(), RecordingProfile::new(), MemoryDocument::new())
    }

    pub fn with_document(document: MemoryDocument) -> Self {
        Self::with_parts(RecordingTracker::new(), RecordingProfile::new(), document)
    }

    pub fn with_parts(tracker: RecordingTracker, profile: RecordingProfile, document: MemoryDocument) -> Self {
        Self {
            tracker: Arc::new(tracker),
            profile: Arc::new(profile),
            logger: Arc::new(RecordingLogger::new()),
            document: Arc::new(document),
        }
    }

    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::new(
            self.tracker.clone(),
            self.profile.clone(),
            self.document.clone(),
        )
        .with_logger(self.logger.clone())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
