use serde_json::{Map, Value};

use super::{Action, Completion};
use crate::context::ExecutionContext;
use crate::error::ActionError;

/// Sends a fixed event to the tracker.
pub struct TrackingAction {
    event: Map<String, Value>,
}

impl TrackingAction {
    /// `event` is the full event object, `type` included.
    pub fn new(event: Map<String, Value>) -> Self {
        Self { event }
    }
}

impl Action for TrackingAction {
    fn apply(&self, ctx: &ExecutionContext) -> Completion {
        let mut payload = self.event.clone();
        let event_type = match payload.remove("type") {
            Some(Value::String(event_type)) if !event_type.is_empty() => event_type,
            _ => {
                return Completion::failed(ActionError::InvalidEvent(
                    "event type must be a non-empty string".to_string(),
                ))
            }
        };

        let sent = ctx.tracker().track(&event_type, payload);
        Completion::pending(async move {
            sent.await.map_err(|source| ActionError::Tracking {
                event: event_type,
                source,
            })
        })
    }
}
