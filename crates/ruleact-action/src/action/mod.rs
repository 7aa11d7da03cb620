//! Action variants and the `Action` capability they share.
//!
//! Every variant exposes a single `apply` that runs its synchronous part
//! immediately and hands back whatever work is still pending.

pub mod custom;
pub mod patch;
pub mod style;
pub mod tracking;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use crate::context::ExecutionContext;
use crate::error::ActionError;
use crate::types::ActionDefinition;

pub use custom::{CustomAction, Handler};
pub use patch::PatchAction;
pub use style::StyleAction;
pub use tracking::TrackingAction;

/// Work an action started but has not finished yet.
pub type PendingCompletion = BoxFuture<'static, Result<(), ActionError>>;

/// Result of invoking `apply`.
pub enum Completion {
    /// Everything ran synchronously.
    Done,
    Pending(PendingCompletion),
}

impl Completion {
    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Completion::Pending(fut.boxed())
    }

    /// A completion that fails as soon as it is awaited.
    pub fn failed(err: ActionError) -> Self {
        Completion::Pending(future::ready(Err(err)).boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Completion::Pending(_))
    }

    pub fn into_pending(self) -> Option<PendingCompletion> {
        match self {
            Completion::Done => None,
            Completion::Pending(fut) => Some(fut),
        }
    }

    /// Await the completion, treating `Done` as immediate success.
    pub async fn wait(self) -> Result<(), ActionError> {
        match self {
            Completion::Done => Ok(()),
            Completion::Pending(fut) => fut.await,
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Done => f.write_str("Done"),
            Completion::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A side effect that can be applied within an execution context.
pub trait Action: Send + Sync {
    fn apply(&self, ctx: &ExecutionContext) -> Completion;
}

/// Instantiate a fresh action for a definition.
pub fn create_action(definition: &ActionDefinition) -> Arc<dyn Action> {
    match definition {
        ActionDefinition::Custom { handlers } => Arc::new(CustomAction::new(handlers.clone())),
        ActionDefinition::Tracking { event } => Arc::new(TrackingAction::new(event.clone())),
        ActionDefinition::Patch(definition) => Arc::new(PatchAction::new(definition.clone())),
        ActionDefinition::Style(definition) => Arc::new(StyleAction::new(definition.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completion_wait() {
        assert!(Completion::Done.wait().await.is_ok());
        assert!(Completion::pending(async { Ok(()) }).wait().await.is_ok());

        let err = Completion::failed(ActionError::Handler("nope".to_string()))
            .wait()
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Handler(_)));
    }

    #[test]
    fn test_completion_into_pending() {
        assert!(Completion::Done.into_pending().is_none());
        let pending = Completion::pending(async { Ok(()) });
        assert!(pending.is_pending());
        assert!(pending.into_pending().is_some());
    }

    #[test]
    fn test_completion_debug() {
        assert_eq!(format!("{:?}", Completion::Done), "Done");
        assert_eq!(
            format!("{:?}", Completion::pending(async { Ok(()) })),
            "Pending(..)"
        );
    }
}
