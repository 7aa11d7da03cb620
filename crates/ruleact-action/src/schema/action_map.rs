//! Schema of the action map configuration.

use std::sync::OnceLock;

use super::{Additional, ObjectSchema, Schema, StringFormat};
use crate::types::{PatchOperation, StyleOperation, Subject};

/// Action type tags, in declaration order.
pub const ACTION_TYPES: [&str; 4] = ["custom", "tracking", "patch", "style"];

/// Trigger type tags.
pub const TRIGGER_TYPES: [&str; 2] = ["match", "event"];

/// Patch source type tags.
pub const SOURCE_TYPES: [&str; 2] = ["provided", "element"];

fn handler_schema() -> Schema {
    Schema::union(vec![
        Schema::Function,
        Schema::Delegate,
        Schema::object(
            ObjectSchema::new()
                .required(&["apply"])
                .property("apply", Schema::Function)
                .additional(Additional::Allowed),
        ),
    ])
}

fn custom_schema() -> Schema {
    Schema::object(
        ObjectSchema::new().required(&["handler"]).property(
            "handler",
            Schema::union(vec![handler_schema(), Schema::array(handler_schema())]),
        ),
    )
}

fn tracking_schema() -> Schema {
    let event = ObjectSchema::new()
        .required(&["type"])
        .property("type", Schema::non_empty_string())
        .additional(Additional::Schema(Box::new(Schema::Json)));

    Schema::object(
        ObjectSchema::new()
            .required(&["event"])
            .property("event", Schema::object(event)),
    )
}

fn style_schema() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .required(&["element", "operation", "className"])
            .property("element", Schema::non_empty_string())
            .property("operation", Schema::enumeration(&StyleOperation::NAMES))
            .property(
                "className",
                Schema::union(vec![
                    Schema::non_empty_string(),
                    Schema::array(Schema::non_empty_string()),
                ]),
            ),
    )
}

fn source_schema() -> Schema {
    let provided = ObjectSchema::new()
        .required(&["value"])
        .property("value", Schema::Json);

    let element = ObjectSchema::new()
        .required(&["element"])
        .property("element", Schema::non_empty_string())
        .property(
            "validation",
            Schema::union(vec![
                Schema::Predicate,
                Schema::Pattern,
                Schema::formatted(StringFormat::Regex),
            ]),
        )
        .property("normalization", Schema::Normalizer);

    Schema::object(
        ObjectSchema::new()
            .required(&["type"])
            .property("type", Schema::enumeration(&SOURCE_TYPES))
            .additional(Additional::Allowed)
            .subtypes(
                "type",
                vec![
                    ("provided", Schema::object(provided)),
                    ("element", Schema::object(element)),
                ],
            ),
    )
}

fn patch_schema() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .required(&["subject", "attribute", "operation", "source"])
            .property("subject", Schema::enumeration(&Subject::NAMES))
            .property("attribute", Schema::formatted(StringFormat::Pointer))
            .property("operation", Schema::enumeration(&PatchOperation::NAMES))
            .property("source", source_schema()),
    )
}

fn action_schema() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .required(&["type"])
            .property("type", Schema::enumeration(&ACTION_TYPES))
            .additional(Additional::Allowed)
            .subtypes(
                "type",
                vec![
                    ("custom", custom_schema()),
                    ("tracking", tracking_schema()),
                    ("patch", patch_schema()),
                    ("style", style_schema()),
                ],
            ),
    )
}

fn trigger_schema() -> Schema {
    let event = ObjectSchema::new()
        .required(&["element", "event"])
        .property("element", Schema::non_empty_string())
        .property("event", Schema::non_empty_string());

    Schema::object(
        ObjectSchema::new()
            .required(&["type"])
            .property("type", Schema::enumeration(&TRIGGER_TYPES))
            .additional(Additional::Allowed)
            .subtypes(
                "type",
                vec![
                    ("match", Schema::object(ObjectSchema::new())),
                    ("event", Schema::object(event)),
                ],
            ),
    )
}

fn condition_schema() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .required(&["trigger", "action"])
            .property("trigger", trigger_schema())
            .property("action", action_schema()),
    )
}

/// The schema every action map must satisfy. Built once.
pub fn action_map_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::object(ObjectSchema::new().additional(Additional::Schema(Box::new(
            Schema::union(vec![condition_schema(), Schema::array(condition_schema())]),
        ))))
    })
}
