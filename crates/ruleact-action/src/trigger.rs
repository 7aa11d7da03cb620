//! Binding actions to their triggers.

use std::sync::Arc;

use crate::action::{Action, Completion};
use crate::context::ExecutionContext;
use crate::types::ActionTrigger;

/// Bind `action` to `trigger`.
///
/// A match trigger applies the action right away and returns its completion.
/// An event trigger registers one listener per element currently matching the
/// selector and returns immediately; each firing applies the action again,
/// and failures of those later runs are only logged.
pub fn bind(trigger: &ActionTrigger, action: Arc<dyn Action>, ctx: &ExecutionContext) -> Completion {
    match trigger {
        ActionTrigger::Match => action.apply(ctx),
        ActionTrigger::Event { selector, event } => {
            let elements = ctx.document().query_all(selector);
            if elements.is_empty() {
                tracing::debug!(selector = %selector, event = %event, "No element to listen on");
            }

            let runtime = tokio::runtime::Handle::try_current().ok();
            for element in elements {
                let action = Arc::clone(&action);
                let ctx = ctx.clone();
                let runtime = runtime.clone();
                let event_name = event.clone();
                element.add_event_listener(
                    event,
                    Arc::new(move || {
                        let Some(pending) = action.apply(&ctx).into_pending() else {
                            return;
                        };
                        let Some(runtime) = &runtime else {
                            tracing::warn!(event = %event_name, "No runtime to drive the triggered action");
                            return;
                        };
                        let logger = Arc::clone(ctx.logger());
                        runtime.spawn(async move {
                            if let Err(err) = pending.await {
                                logger.error(&err.to_string());
                            }
                        });
                    }),
                );
            }

            Completion::Done
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, MemoryElement};
    use crate::error::ActionError;
    use crate::test_support::Harness;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counter(Arc<AtomicUsize>);

    impl Action for Counter {
        fn apply(&self, _ctx: &ExecutionContext) -> Completion {
            self.0.fetch_add(1, Ordering::SeqCst);
            Completion::Done
        }
    }

    struct Failing;

    impl Action for Failing {
        fn apply(&self, _ctx: &ExecutionContext) -> Completion {
            Completion::failed(ActionError::Handler("listener failed".to_string()))
        }
    }

    fn click_on(selector: &str) -> ActionTrigger {
        ActionTrigger::Event {
            selector: selector.to_string(),
            event: "click".to_string(),
        }
    }

    #[tokio::test]
    async fn test_match_applies_immediately() {
        let harness = Harness::new();
        let count = Arc::new(AtomicUsize::new(0));

        bind(&ActionTrigger::Match, Arc::new(Counter(count.clone())), &harness.context())
            .wait()
            .await
            .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_event_applies_on_each_fire() {
        let document = MemoryDocument::new();
        document.append(MemoryElement::new("button").with_class("cta"));
        let harness = Harness::with_document(document);
        let count = Arc::new(AtomicUsize::new(0));

        let completion = bind(&click_on(".cta"), Arc::new(Counter(count.clone())), &harness.context());
        assert!(!completion.is_pending());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        for _ in 0..3 {
            harness.document.dispatch_event(".cta", "click");
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_event_binds_every_match_at_bind_time() {
        let document = MemoryDocument::new();
        let first = document.append(MemoryElement::new("a").with_class("link"));
        let second = document.append(MemoryElement::new("a").with_class("link"));
        let harness = Harness::with_document(document);
        let count = Arc::new(AtomicUsize::new(0));

        bind(&click_on(".link"), Arc::new(Counter(count.clone())), &harness.context());
        let late = harness.document.append(MemoryElement::new("a").with_class("link"));

        assert_eq!(first.listener_count("click"), 1);
        assert_eq!(second.listener_count("click"), 1);
        assert_eq!(late.listener_count("click"), 0);

        harness.document.dispatch_event(".link", "click");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_event_with_no_match_is_noop() {
        let harness = Harness::new();
        let count = Arc::new(AtomicUsize::new(0));

        let completion = bind(&click_on(".missing"), Arc::new(Counter(count.clone())), &harness.context());
        assert!(!completion.is_pending());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_event_failure_is_logged() {
        let document = MemoryDocument::new();
        document.append(MemoryElement::new("button").with_id("buy"));
        let harness = Harness::with_document(document);

        bind(&click_on("#buy"), Arc::new(Failing), &harness.context());
        harness.document.dispatch_event("#buy", "click");

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            harness.logger.messages(),
            vec!["Action handler failed: listener failed".to_string()]
        );
    }
}
