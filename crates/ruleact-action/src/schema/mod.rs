//! Declarative schema validation.
//!
//! A [`Schema`] tree describes the accepted shape; [`Schema::validate`] walks a
//! [`ConfigValue`] and stops at the first violation, reporting it with a
//! root-relative pointer. Object schemas may declare a discriminator whose
//! value selects a subtype schema for the rest of the object.

pub mod action_map;

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ValidationError, Violation};
use crate::value::ConfigValue;

pub use action_map::action_map_schema;

/// Named string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Attribute pointer: `a.b`, `list[0].c`.
    Pointer,
    /// A regular expression the `regex` crate accepts.
    Regex,
}

impl StringFormat {
    fn name(self) -> &'static str {
        match self {
            StringFormat::Pointer => "pointer",
            StringFormat::Regex => "regex",
        }
    }

    fn accepts(self, value: &str) -> bool {
        match self {
            StringFormat::Pointer => pointer_pattern().is_match(value),
            StringFormat::Regex => Regex::new(value).is_ok(),
        }
    }
}

fn pointer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\[\d+\])*(\.[A-Za-z_][A-Za-z0-9_]*(\[\d+\])*)*$")
            .expect("attribute pointer pattern is valid")
    })
}

#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    pub min_length: usize,
    pub enumeration: Vec<&'static str>,
    pub format: Option<StringFormat>,
}

#[derive(Debug, Clone)]
pub struct ArraySchema {
    pub items: Box<Schema>,
}

/// How undeclared object keys are treated.
#[derive(Debug, Clone)]
pub enum Additional {
    Denied,
    Allowed,
    Schema(Box<Schema>),
}

#[derive(Debug, Clone)]
pub struct Subtypes {
    pub discriminator: &'static str,
    pub schemas: Vec<(&'static str, Schema)>,
}

#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub required: Vec<&'static str>,
    pub properties: Vec<(&'static str, Schema)>,
    pub additional: Additional,
    pub subtypes: Option<Subtypes>,
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self {
            required: Vec::new(),
            properties: Vec::new(),
            additional: Additional::Denied,
            subtypes: None,
        }
    }
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, keys: &[&'static str]) -> Self {
        self.required.extend_from_slice(keys);
        self
    }

    pub fn property(mut self, key: &'static str, schema: Schema) -> Self {
        self.properties.push((key, schema));
        self
    }

    pub fn additional(mut self, additional: Additional) -> Self {
        self.additional = additional;
        self
    }

    pub fn subtypes(mut self, discriminator: &'static str, schemas: Vec<(&'static str, Schema)>) -> Self {
        self.subtypes = Some(Subtypes {
            discriminator,
            schemas,
        });
        self
    }
}

#[derive(Debug, Clone)]
pub enum Schema {
    /// Any value representable as JSON.
    Json,
    String(StringSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
    /// The first alternative whose type accepts the value validates it.
    Union(Vec<Schema>),
    Function,
    /// An object exposing `apply`.
    Delegate,
    Predicate,
    Normalizer,
    Pattern,
}

impl Schema {
    pub fn string() -> Self {
        Schema::String(StringSchema::default())
    }

    pub fn non_empty_string() -> Self {
        Schema::String(StringSchema {
            min_length: 1,
            ..StringSchema::default()
        })
    }

    pub fn enumeration(values: &[&'static str]) -> Self {
        Schema::String(StringSchema {
            enumeration: values.to_vec(),
            ..StringSchema::default()
        })
    }

    pub fn formatted(format: StringFormat) -> Self {
        Schema::String(StringSchema {
            format: Some(format),
            ..StringSchema::default()
        })
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array(ArraySchema {
            items: Box::new(items),
        })
    }

    pub fn object(schema: ObjectSchema) -> Self {
        Schema::Object(schema)
    }

    pub fn union(alternatives: Vec<Schema>) -> Self {
        Schema::Union(alternatives)
    }

    /// Validate `value`, reporting the first violation.
    pub fn validate(&self, value: &ConfigValue) -> Result<(), ValidationError> {
        self.check(value, &mut Vec::new())
    }

    /// Type name used in "expected" messages.
    fn expected_types(&self) -> Vec<&'static str> {
        match self {
            Schema::Json => vec!["json"],
            Schema::String(_) => vec!["string"],
            Schema::Array(_) => vec!["array"],
            Schema::Object(_) | Schema::Delegate => vec!["object"],
            Schema::Function => vec!["function"],
            Schema::Predicate => vec!["predicate"],
            Schema::Normalizer => vec!["normalizer"],
            Schema::Pattern => vec!["regex"],
            Schema::Union(alternatives) => {
                let mut names = Vec::new();
                for name in alternatives.iter().flat_map(Schema::expected_types) {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                names
            }
        }
    }

    /// Whether the value has the right type, regardless of its contents.
    fn accepts_type(&self, value: &ConfigValue) -> bool {
        match self {
            Schema::Json => is_json(value),
            Schema::String(_) => matches!(value, ConfigValue::String(_)),
            Schema::Array(_) => matches!(value, ConfigValue::Array(_)),
            Schema::Object(_) => matches!(value, ConfigValue::Object(_)),
            Schema::Delegate => matches!(value, ConfigValue::Delegate(_)),
            Schema::Function => matches!(value, ConfigValue::Function(_)),
            Schema::Predicate => matches!(value, ConfigValue::Predicate(_)),
            Schema::Normalizer => matches!(value, ConfigValue::Normalizer(_)),
            Schema::Pattern => matches!(value, ConfigValue::Pattern(_)),
            Schema::Union(alternatives) => alternatives.iter().any(|s| s.accepts_type(value)),
        }
    }

    fn type_error(&self, value: &ConfigValue, path: &[String]) -> ValidationError {
        ValidationError::new(
            format_path(path),
            Violation::Type {
                expected: self.expected_types().join(" or "),
                actual: value.type_name().to_string(),
            },
        )
    }

    fn check(&self, value: &ConfigValue, path: &mut Vec<String>) -> Result<(), ValidationError> {
        match self {
            Schema::Json => check_json(value, path),
            Schema::String(schema) => match value {
                ConfigValue::String(s) => check_string(schema, s, path),
                _ => Err(self.type_error(value, path)),
            },
            Schema::Array(schema) => match value {
                ConfigValue::Array(items) => check_array(schema, items, path),
                _ => Err(self.type_error(value, path)),
            },
            Schema::Object(schema) => match value {
                ConfigValue::Object(_) => check_object(schema, value, path, None),
                _ => Err(self.type_error(value, path)),
            },
            Schema::Union(alternatives) => {
                match alternatives.iter().find(|s| s.accepts_type(value)) {
                    Some(schema) => schema.check(value, path),
                    None => Err(self.type_error(value, path)),
                }
            }
            Schema::Function
            | Schema::Delegate
            | Schema::Predicate
            | Schema::Normalizer
            | Schema::Pattern => {
                if self.accepts_type(value) {
                    Ok(())
                } else {
                    Err(self.type_error(value, path))
                }
            }
        }
    }
}

fn is_json(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::Null
        | ConfigValue::Bool(_)
        | ConfigValue::Number(_)
        | ConfigValue::String(_) => true,
        ConfigValue::Array(items) => items.iter().all(is_json),
        ConfigValue::Object(map) => map.values().all(is_json),
        _ => false,
    }
}

fn check_json(value: &ConfigValue, path: &mut Vec<String>) -> Result<(), ValidationError> {
    match value {
        ConfigValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                check_json(item, path)?;
                path.pop();
            }
            Ok(())
        }
        ConfigValue::Object(map) => {
            for (key, item) in map {
                path.push(key.clone());
                check_json(item, path)?;
                path.pop();
            }
            Ok(())
        }
        _ if is_json(value) => Ok(()),
        _ => Err(Schema::Json.type_error(value, path)),
    }
}

fn check_string(schema: &StringSchema, value: &str, path: &[String]) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length < schema.min_length {
        return Err(ValidationError::new(
            format_path(path),
            Violation::MinLength {
                min: schema.min_length,
                actual: length,
            },
        ));
    }

    if !schema.enumeration.is_empty() && !schema.enumeration.iter().any(|e| *e == value) {
        return Err(ValidationError::new(
            format_path(path),
            Violation::Enumeration {
                allowed: schema.enumeration.iter().map(|s| s.to_string()).collect(),
                actual: value.to_string(),
            },
        ));
    }

    if let Some(format) = schema.format {
        if !format.accepts(value) {
            return Err(ValidationError::new(
                format_path(path),
                Violation::Format {
                    format: format.name(),
                    actual: value.to_string(),
                },
            ));
        }
    }

    Ok(())
}

fn check_array(
    schema: &ArraySchema,
    items: &[ConfigValue],
    path: &mut Vec<String>,
) -> Result<(), ValidationError> {
    for (index, item) in items.iter().enumerate() {
        path.push(index.to_string());
        schema.items.check(item, path)?;
        path.pop();
    }
    Ok(())
}

/// Validate an object. `inherited` names a key already validated by the
/// parent schema (the discriminator), which the subtype must not reject.
fn check_object(
    schema: &ObjectSchema,
    value: &ConfigValue,
    path: &mut Vec<String>,
    inherited: Option<&str>,
) -> Result<(), ValidationError> {
    let Some(entries) = value.as_object() else {
        return Err(Schema::Object(schema.clone()).type_error(value, path));
    };

    for key in &schema.required {
        if !entries.contains_key(*key) {
            path.push(key.to_string());
            let err = ValidationError::new(format_path(path), Violation::Missing);
            path.pop();
            return Err(err);
        }
    }

    for (key, property) in &schema.properties {
        if let Some(item) = entries.get(*key) {
            path.push(key.to_string());
            property.check(item, path)?;
            path.pop();
        }
    }

    for (key, item) in entries {
        if Some(key.as_str()) == inherited || schema.properties.iter().any(|(k, _)| *k == key.as_str()) {
            continue;
        }
        path.push(key.clone());
        match &schema.additional {
            Additional::Allowed => {}
            Additional::Denied => {
                let err = ValidationError::new(format_path(path), Violation::Unknown);
                path.pop();
                return Err(err);
            }
            Additional::Schema(additional) => additional.check(item, path)?,
        }
        path.pop();
    }

    if let Some(subtypes) = &schema.subtypes {
        let tag = entries
            .get(subtypes.discriminator)
            .and_then(ConfigValue::as_str);
        if let Some((_, Schema::Object(subtype))) = subtypes
            .schemas
            .iter()
            .find(|(name, _)| Some(*name) == tag)
        {
            check_object(subtype, value, path, Some(subtypes.discriminator))?;
        }
    }

    Ok(())
}

/// Format path segments as a JSON pointer (RFC 6901). The root is `/`.
pub fn format_path(path: &[String]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.iter()
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}
