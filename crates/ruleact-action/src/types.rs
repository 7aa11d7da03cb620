//! Core types for the action engine.
//!
//! Defines action definitions, triggers, conditions and the rule shape the
//! host hands to the dispatcher.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::custom::Handler;
use crate::value::{NormalizerFn, PredicateFn};

// =============================================================================
// Enums
// =============================================================================

/// Which profile a patch applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    User,
    Session,
}

impl Subject {
    /// Configuration names, in declaration order.
    pub const NAMES: [&'static str; 2] = ["user", "session"];
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::User => write!(f, "user"),
            Subject::Session => write!(f, "session"),
        }
    }
}

impl std::str::FromStr for Subject {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Subject::User),
            "session" => Ok(Subject::Session),
            _ => Err(format!("Unknown subject: {}", s)),
        }
    }
}

/// Patch operation applied to the attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOperation {
    Set,
    Add,
    Combine,
}

impl PatchOperation {
    /// Configuration names, in declaration order.
    pub const NAMES: [&'static str; 3] = ["set", "add", "combine"];
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOperation::Set => write!(f, "set"),
            PatchOperation::Add => write!(f, "add"),
            PatchOperation::Combine => write!(f, "combine"),
        }
    }
}

impl std::str::FromStr for PatchOperation {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set" => Ok(PatchOperation::Set),
            "add" => Ok(PatchOperation::Add),
            "combine" => Ok(PatchOperation::Combine),
            _ => Err(format!("Unknown patch operation: {}", s)),
        }
    }
}

/// Class list operation performed by a style action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleOperation {
    Add,
    Remove,
}

impl StyleOperation {
    /// Configuration names, in declaration order.
    pub const NAMES: [&'static str; 2] = ["add", "remove"];
}

impl fmt::Display for StyleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleOperation::Add => write!(f, "add"),
            StyleOperation::Remove => write!(f, "remove"),
        }
    }
}

impl std::str::FromStr for StyleOperation {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(StyleOperation::Add),
            "remove" => Ok(StyleOperation::Remove),
            _ => Err(format!("Unknown style operation: {}", s)),
        }
    }
}

// =============================================================================
// Definitions
// =============================================================================

/// Check applied to a captured element value before it is used.
#[derive(Clone)]
pub enum Validation {
    Predicate(PredicateFn),
    Pattern(Regex),
}

impl Validation {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Validation::Predicate(f) => f(value),
            Validation::Pattern(re) => re.is_match(value),
        }
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validation::Predicate(_) => f.write_str("Predicate(..)"),
            Validation::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
        }
    }
}

/// Where a patch value comes from.
#[derive(Clone)]
pub enum Source {
    /// A literal value.
    Provided { value: Value },
    /// A value captured from the first element matching `selector`.
    Element {
        selector: String,
        validation: Option<Validation>,
        normalization: Option<NormalizerFn>,
    },
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Provided { value } => f.debug_struct("Provided").field("value", value).finish(),
            Source::Element {
                selector,
                validation,
                normalization,
            } => f
                .debug_struct("Element")
                .field("selector", selector)
                .field("validation", validation)
                .field("normalization", &normalization.as_ref().map(|_| ".."))
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatchDefinition {
    pub subject: Subject,
    pub attribute: String,
    pub operation: PatchOperation,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDefinition {
    pub selector: String,
    pub operation: StyleOperation,
    pub class_names: Vec<String>,
}

/// A typed action definition, discriminated by its `type` tag.
#[derive(Debug, Clone)]
pub enum ActionDefinition {
    Custom { handlers: Vec<Handler> },
    /// The full event object; its `type` field names the event.
    Tracking { event: Map<String, Value> },
    Patch(PatchDefinition),
    Style(StyleDefinition),
}

impl ActionDefinition {
    /// The `type` tag this definition was declared with.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionDefinition::Custom { .. } => "custom",
            ActionDefinition::Tracking { .. } => "tracking",
            ActionDefinition::Patch(_) => "patch",
            ActionDefinition::Style(_) => "style",
        }
    }
}

/// When an action runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTrigger {
    /// As soon as the owning rule matches.
    Match,
    /// Each time `event` fires on an element matching `selector` at bind time.
    Event { selector: String, event: String },
}

#[derive(Debug, Clone)]
pub struct ActionCondition {
    pub trigger: ActionTrigger,
    pub action: ActionDefinition,
}

// =============================================================================
// Rules
// =============================================================================

/// A matched rule as handed over by the rule engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Map::new(),
        }
    }

    /// Set the declared `action` property.
    pub fn with_action(mut self, action: impl Into<Value>) -> Self {
        self.properties.insert("action".to_string(), action.into());
        self
    }

    /// The declared action property. JSON `null` counts as absent.
    pub fn action(&self) -> Option<&Value> {
        self.properties.get("action").filter(|v| !v.is_null())
    }
}
