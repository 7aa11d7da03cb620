//! End-to-end dispatch tests.
//!
//! Each test builds an extension from a host configuration, wires it to
//! recording collaborators and an in-memory document, and dispatches rules
//! against it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use regex::Regex;
use serde_json::{json, Value};

use ruleact_action::test_support::{Harness, RecordingProfile, RecordingTracker};
use ruleact_action::{
    Action, ActionError, ActionExtension, Completion, ConfigValue, ExecutionContext,
    MemoryDocument, MemoryElement, Rule, Subject,
};

// =============================================================================
// Helpers
// =============================================================================

fn match_condition(action: ConfigValue) -> ConfigValue {
    ConfigValue::object([
        ("trigger", ConfigValue::from(json!({"type": "match"}))),
        ("action", action),
    ])
}

fn custom(handlers: Vec<ConfigValue>) -> ConfigValue {
    ConfigValue::object([
        ("type", ConfigValue::from("custom")),
        ("handler", ConfigValue::Array(handlers)),
    ])
}

fn sleeping_handler(ms: u64) -> ConfigValue {
    ConfigValue::function(move |_| {
        Completion::pending(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(())
        })
    })
}

fn rule(name: &str, action: impl Into<Value>) -> Rule {
    Rule::new(name).with_action(action)
}

// =============================================================================
// Aggregation
// =============================================================================

#[tokio::test]
async fn test_dispatch_waits_for_every_match_action() {
    let harness = Harness::new();
    let options = ConfigValue::object([(
        "slow",
        ConfigValue::Array(vec![
            match_condition(custom(vec![sleeping_handler(10)])),
            match_condition(custom(vec![sleeping_handler(20)])),
        ]),
    )]);
    let extension = ActionExtension::initialize(&options, harness.context()).unwrap();

    let start = Instant::now();
    extension.apply(&rule("r", "slow")).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn test_dispatch_fails_with_first_error_without_cancelling() {
    let harness = Harness::with_parts(
        RecordingTracker::new().failing("tracker offline"),
        RecordingProfile::new().with_delay(Duration::from_millis(30)),
        MemoryDocument::new(),
    );
    let options = ConfigValue::from(json!({
        "save": {
            "trigger": {"type": "match"},
            "action": {
                "type": "patch",
                "subject": "user",
                "attribute": "plan",
                "operation": "set",
                "source": {"type": "provided", "value": "pro"}
            }
        },
        "track": {
            "trigger": {"type": "match"},
            "action": {"type": "tracking", "event": {"type": "planSelected"}}
        }
    }));
    let extension = ActionExtension::initialize(&options, harness.context()).unwrap();

    let err = extension
        .apply(&rule("r", json!(["save", "track"])))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::Tracking { .. }));
    assert_eq!(harness.profile.saves().len(), 1);
    assert!(harness.profile.committed().is_empty());

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(harness.profile.committed().len(), 1);
}

// =============================================================================
// Resolution
// =============================================================================

#[tokio::test]
async fn test_missing_action_logs_once_and_resolves() {
    let harness = Harness::new();
    let extension = ActionExtension::initialize(&ConfigValue::from(json!({})), harness.context()).unwrap();

    extension.apply(&rule("foo", "fooAction")).await.unwrap();

    assert_eq!(
        harness.logger.messages(),
        vec!["Action \"fooAction\" registered for rule \"foo\" does not exist.".to_string()]
    );
}

#[tokio::test]
async fn test_custom_handlers_run_in_order_with_dispatch_context() {
    struct Delegate {
        calls: Arc<Mutex<Vec<String>>>,
        expected: ExecutionContext,
    }

    impl Action for Delegate {
        fn apply(&self, ctx: &ExecutionContext) -> Completion {
            assert!(ctx.same_as(&self.expected));
            self.calls.lock().push("delegate".to_string());
            Completion::Done
        }
    }

    let harness = Harness::new();
    let ctx = harness.context();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&calls);
    let expected = ctx.clone();
    let callable = ConfigValue::function(move |c| {
        assert!(c.same_as(&expected));
        seen.lock().push("callable".to_string());
        Completion::Done
    });
    let delegate = ConfigValue::delegate(Delegate {
        calls: Arc::clone(&calls),
        expected: ctx.clone(),
    });

    let options = ConfigValue::object([(
        "fooAction",
        match_condition(custom(vec![callable, delegate])),
    )]);
    let extension = ActionExtension::initialize(&options, ctx).unwrap();
    extension.apply(&rule("foo", "fooAction")).await.unwrap();

    assert_eq!(*calls.lock(), vec!["callable", "delegate"]);
}

// =============================================================================
// Patch
// =============================================================================

fn capture_options(validation: Option<&str>) -> ConfigValue {
    let mut source = json!({"type": "element", "element": "#field"});
    if let Some(pattern) = validation {
        source["validation"] = json!(pattern);
    }
    ConfigValue::from(json!({
        "capture": {
            "trigger": {"type": "match"},
            "action": {
                "type": "patch",
                "subject": "session",
                "attribute": "custom.field",
                "operation": "set",
                "source": source
            }
        }
    }))
}

#[tokio::test]
async fn test_password_field_is_never_patched() {
    let document = MemoryDocument::new().with_element(
        MemoryElement::new("input")
            .with_id("field")
            .with_attribute("type", "password")
            .with_value("s3cret"),
    );
    let harness = Harness::with_document(document);
    let extension = ActionExtension::initialize(&capture_options(None), harness.context()).unwrap();

    extension.apply(&rule("r", "capture")).await.unwrap();
    assert!(harness.profile.edits().is_empty());
}

#[tokio::test]
async fn test_validation_pattern_gates_patch() {
    let document = MemoryDocument::new();
    let field = document.append(MemoryElement::new("input").with_id("field").with_value("ABC"));
    let harness = Harness::with_document(document);
    let extension =
        ActionExtension::initialize(&capture_options(Some("^[a-z]+$")), harness.context()).unwrap();

    extension.apply(&rule("r", "capture")).await.unwrap();
    assert!(harness.profile.edits().is_empty());

    field.set_value("abc");
    extension.apply(&rule("r", "capture")).await.unwrap();
    assert_eq!(harness.profile.edits(), vec![Subject::Session]);
    assert_eq!(harness.profile.saves()[0].operations[0].2, json!("abc"));
}

#[tokio::test]
async fn test_programmatic_validation_and_normalization() {
    let document = MemoryDocument::new()
        .with_element(MemoryElement::new("input").with_id("email").with_value("Ada@Example.COM"));
    let harness = Harness::with_document(document);

    let source = ConfigValue::object([
        ("type", ConfigValue::from("element")),
        ("element", ConfigValue::from("#email")),
        ("validation", ConfigValue::from(Regex::new("@").unwrap())),
        ("normalization", ConfigValue::normalizer(|v| json!(v.to_lowercase()))),
    ]);
    let options = ConfigValue::object([(
        "email",
        match_condition(ConfigValue::object([
            ("type", ConfigValue::from("patch")),
            ("subject", ConfigValue::from("user")),
            ("attribute", ConfigValue::from("email")),
            ("operation", ConfigValue::from("set")),
            ("source", source),
        ])),
    )]);
    let extension = ActionExtension::initialize(&options, harness.context()).unwrap();

    extension.apply(&rule("r", "email")).await.unwrap();
    assert_eq!(harness.profile.saves()[0].operations[0].2, json!("ada@example.com"));
}

// =============================================================================
// Style
// =============================================================================

#[tokio::test]
async fn test_style_applies_to_all_matches() {
    let document = MemoryDocument::new();
    let a = document.append(MemoryElement::new("div").with_class("card"));
    let b = document.append(MemoryElement::new("div").with_class("card"));
    let harness = Harness::with_document(document);

    let options = ConfigValue::from(json!({
        "highlight": {
            "trigger": {"type": "match"},
            "action": {"type": "style", "element": ".card", "operation": "add", "className": ["hot", "new"]}
        },
        "nothing": {
            "trigger": {"type": "match"},
            "action": {"type": "style", "element": ".missing", "operation": "add", "className": "hot"}
        }
    }));
    let extension = ActionExtension::initialize(&options, harness.context()).unwrap();

    extension
        .apply(&rule("r", json!(["highlight", "nothing"])))
        .await
        .unwrap();
    assert_eq!(a.classes(), vec!["card", "hot", "new"]);
    assert_eq!(b.classes(), vec!["card", "hot", "new"]);
}

// =============================================================================
// Event triggers
// =============================================================================

#[tokio::test]
async fn test_event_trigger_fires_per_element_and_event() {
    let document = MemoryDocument::new();
    document.append(MemoryElement::new("button").with_class("buy"));
    document.append(MemoryElement::new("button").with_class("buy"));
    let harness = Harness::with_document(document);

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let handler = ConfigValue::function(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Completion::Done
    });
    let options = ConfigValue::object([(
        "onBuy",
        ConfigValue::object([
            (
                "trigger",
                ConfigValue::from(json!({"type": "event", "element": ".buy", "event": "click"})),
            ),
            ("action", custom(vec![handler])),
        ]),
    )]);
    let extension = ActionExtension::initialize(&options, harness.context()).unwrap();

    extension.apply(&rule("r", "onBuy")).await.unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);

    assert_eq!(harness.document.dispatch_event(".buy", "click"), 2);
    assert_eq!(count.load(Ordering::SeqCst), 2);

    harness.document.dispatch_event(".buy", "click");
    assert_eq!(count.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_event_triggered_tracking_is_not_awaited() {
    let document = MemoryDocument::new();
    document.append(MemoryElement::new("a").with_id("promo"));
    let harness = Harness::with_parts(
        RecordingTracker::new().with_delay(Duration::from_millis(50)),
        RecordingProfile::new(),
        document,
    );
    let options = ConfigValue::from(json!({
        "promoClick": {
            "trigger": {"type": "event", "element": "#promo", "event": "click"},
            "action": {"type": "tracking", "event": {"type": "promoClicked", "slot": "hero"}}
        }
    }));
    let extension = ActionExtension::initialize(&options, harness.context()).unwrap();

    let start = Instant::now();
    extension.apply(&rule("r", "promoClick")).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(50));
    assert!(harness.tracker.events().is_empty());

    harness.document.dispatch_event("#promo", "click");
    tokio::time::sleep(Duration::from_millis(10)).await;
    let events = harness.tracker.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "promoClicked");
    assert_eq!(Value::Object(events[0].payload.clone()), json!({"slot": "hero"}));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_initialize_reports_first_invalid_path() {
    let harness = Harness::new();
    let cases = [
        (
            json!({"fooAction": {"trigger": {"type": "match"}, "action": {"type": "teleport"}}}),
            "Unexpected value at path '/fooAction/action/type', expecting 'custom', 'tracking', 'patch' or 'style', found 'teleport'.",
        ),
        (
            json!({"fooAction": {"trigger": {"type": "hover"}, "action": {"type": "custom", "handler": []}}}),
            "Unexpected value at path '/fooAction/trigger/type', expecting 'match' or 'event', found 'hover'.",
        ),
        (
            json!({"fooAction": {
                "trigger": {"type": "match"},
                "action": {
                    "type": "patch",
                    "subject": "user",
                    "attribute": "plan",
                    "operation": "set",
                    "source": {"type": "element", "element": ""}
                }
            }}),
            "Expected at least 1 character at path '/fooAction/action/source/element', actual 0.",
        ),
    ];

    for (options, message) in cases {
        let err = ActionExtension::initialize(&ConfigValue::from(options), harness.context())
            .err()
            .expect("configuration must be rejected");
        assert_eq!(err.to_string(), message);
    }
}
