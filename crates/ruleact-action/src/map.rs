//! The validated action map: action name -> ordered conditions.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use crate::action::Handler;
use crate::error::{ValidationError, Violation};
use crate::schema::action_map::{ACTION_TYPES, SOURCE_TYPES, TRIGGER_TYPES};
use crate::schema::{action_map_schema, format_path};
use crate::types::{
    ActionCondition, ActionDefinition, ActionTrigger, PatchDefinition, PatchOperation, Source,
    StyleDefinition, StyleOperation, Subject, Validation,
};
use crate::value::ConfigValue;

/// Named actions, each holding one or more conditions in declaration order.
#[derive(Debug, Clone)]
pub struct ActionMap {
    entries: HashMap<String, Vec<ActionCondition>>,
}

impl ActionMap {
    /// Validate `value` against the action map schema and convert it.
    pub fn from_config(value: &ConfigValue) -> Result<Self, ValidationError> {
        action_map_schema().validate(value)?;

        let mut entries = HashMap::new();
        let Some(map) = value.as_object() else {
            return Err(type_error(&[], "object", value));
        };
        for (name, entry) in map {
            let mut path = vec![name.clone()];
            let conditions = match entry {
                ConfigValue::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        path.push(index.to_string());
                        let condition = parse_condition(item, &path);
                        path.pop();
                        condition
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                single => vec![parse_condition(single, &path)?],
            };
            entries.insert(name.clone(), conditions);
        }

        tracing::debug!(actions = entries.len(), "Loaded action map");
        Ok(Self { entries })
    }

    /// Convenience for plain JSON definitions.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        Self::from_config(&ConfigValue::from(value.clone()))
    }

    pub fn get(&self, name: &str) -> Option<&[ActionCondition]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Action names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn type_error(path: &[String], expected: &str, value: &ConfigValue) -> ValidationError {
    ValidationError::new(
        format_path(path),
        Violation::Type {
            expected: expected.to_string(),
            actual: value.type_name().to_string(),
        },
    )
}

fn child(path: &[String], key: &str) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(key.to_string());
    path
}

fn field<'a>(value: &'a ConfigValue, path: &[String], key: &str) -> Result<&'a ConfigValue, ValidationError> {
    value
        .get(key)
        .ok_or_else(|| ValidationError::new(format_path(&child(path, key)), Violation::Missing))
}

fn string_field(value: &ConfigValue, path: &[String], key: &str) -> Result<String, ValidationError> {
    let item = field(value, path, key)?;
    item.as_str()
        .map(str::to_string)
        .ok_or_else(|| type_error(&child(path, key), "string", item))
}

fn parse_tag<T>(
    value: &ConfigValue,
    path: &[String],
    key: &str,
    allowed: &[&str],
) -> Result<T, ValidationError>
where
    T: std::str::FromStr,
{
    let tag = string_field(value, path, key)?;
    tag.parse()
        .map_err(|_| unknown_tag(path, key, allowed, &tag))
}

fn json_field(value: &ConfigValue, path: &[String], key: &str) -> Result<Value, ValidationError> {
    let item = field(value, path, key)?;
    item.to_json()
        .ok_or_else(|| type_error(&child(path, key), "json", item))
}

fn parse_condition(value: &ConfigValue, path: &[String]) -> Result<ActionCondition, ValidationError> {
    let trigger = parse_trigger(field(value, path, "trigger")?, &child(path, "trigger"))?;
    let action = parse_action(field(value, path, "action")?, &child(path, "action"))?;
    Ok(ActionCondition { trigger, action })
}

fn parse_trigger(value: &ConfigValue, path: &[String]) -> Result<ActionTrigger, ValidationError> {
    match string_field(value, path, "type")?.as_str() {
        "match" => Ok(ActionTrigger::Match),
        "event" => Ok(ActionTrigger::Event {
            selector: string_field(value, path, "element")?,
            event: string_field(value, path, "event")?,
        }),
        other => Err(unknown_tag(path, "type", &TRIGGER_TYPES, other)),
    }
}

fn unknown_tag(path: &[String], key: &str, allowed: &[&str], actual: &str) -> ValidationError {
    ValidationError::new(
        format_path(&child(path, key)),
        Violation::Enumeration {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
            actual: actual.to_string(),
        },
    )
}

fn parse_action(value: &ConfigValue, path: &[String]) -> Result<ActionDefinition, ValidationError> {
    match string_field(value, path, "type")?.as_str() {
        "custom" => {
            let handlers = match field(value, path, "handler")? {
                ConfigValue::Array(items) => items.iter().map(Handler::from_config).collect(),
                single => vec![Handler::from_config(single)],
            };
            Ok(ActionDefinition::Custom { handlers })
        }
        "tracking" => match json_field(value, path, "event")? {
            Value::Object(event) => Ok(ActionDefinition::Tracking { event }),
            other => Err(ValidationError::new(
                format_path(&child(path, "event")),
                Violation::Type {
                    expected: "object".to_string(),
                    actual: crate::value::json_type_name(&other).to_string(),
                },
            )),
        },
        "patch" => Ok(ActionDefinition::Patch(PatchDefinition {
            subject: parse_tag(value, path, "subject", &Subject::NAMES)?,
            attribute: string_field(value, path, "attribute")?,
            operation: parse_tag(value, path, "operation", &PatchOperation::NAMES)?,
            source: parse_source(field(value, path, "source")?, &child(path, "source"))?,
        })),
        "style" => {
            let class_path = child(path, "className");
            let class_names = match field(value, path, "className")? {
                ConfigValue::String(name) => vec![name.clone()],
                ConfigValue::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        item.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| type_error(&child(&class_path, &index.to_string()), "string", item))
                    })
                    .collect::<Result<_, _>>()?,
                other => return Err(type_error(&class_path, "string or array", other)),
            };
            Ok(ActionDefinition::Style(StyleDefinition {
                selector: string_field(value, path, "element")?,
                operation: parse_tag(value, path, "operation", &StyleOperation::NAMES)?,
                class_names,
            }))
        }
        other => Err(unknown_tag(path, "type", &ACTION_TYPES, other)),
    }
}

fn parse_source(value: &ConfigValue, path: &[String]) -> Result<Source, ValidationError> {
    match string_field(value, path, "type")?.as_str() {
        "provided" => Ok(Source::Provided {
            value: json_field(value, path, "value")?,
        }),
        "element" => {
            let validation = match value.get("validation") {
                None => None,
                Some(ConfigValue::Predicate(f)) => Some(Validation::Predicate(f.clone())),
                Some(ConfigValue::Pattern(re)) => Some(Validation::Pattern(re.clone())),
                Some(ConfigValue::String(pattern)) => {
                    Some(Validation::Pattern(Regex::new(pattern).map_err(|_| {
                        ValidationError::new(
                            format_path(&child(path, "validation")),
                            Violation::Format {
                                format: "regex",
                                actual: pattern.clone(),
                            },
                        )
                    })?))
                }
                Some(other) => {
                    return Err(type_error(
                        &child(path, "validation"),
                        "predicate or regex or string",
                        other,
                    ))
                }
            };
            let normalization = match value.get("normalization") {
                None => None,
                Some(ConfigValue::Normalizer(f)) => Some(f.clone()),
                Some(other) => return Err(type_error(&child(path, "normalization"), "normalizer", other)),
            };
            Ok(Source::Element {
                selector: string_field(value, path, "element")?,
                validation,
                normalization,
            })
        }
        other => Err(unknown_tag(path, "type", &SOURCE_TYPES, other)),
    }
}
