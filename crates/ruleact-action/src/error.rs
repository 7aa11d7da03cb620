//! Error types for the action engine.

use ruleact_core::RuleactError;

use crate::types::Subject;

/// Failure reported by an outbound collaborator (tracker, profile store).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CollaboratorError(pub String);

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors raised while executing actions.
///
/// These are the only errors a dispatch call propagates; resolution problems
/// (unknown names, bad handlers) are logged instead.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Tracking of event \"{event}\" failed: {source}")]
    Tracking {
        event: String,
        #[source]
        source: CollaboratorError,
    },
    #[error("Saving the {subject} patch failed: {source}")]
    Patch {
        subject: Subject,
        #[source]
        source: CollaboratorError,
    },
    #[error("Invalid tracking event: {0}")]
    InvalidEvent(String),
    #[error("Action handler failed: {0}")]
    Handler(String),
}

/// What went wrong at a given path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Type {
        expected: String,
        actual: String,
    },
    Enumeration {
        allowed: Vec<String>,
        actual: String,
    },
    Missing,
    Unknown,
    MinLength {
        min: usize,
        actual: usize,
    },
    Format {
        format: &'static str,
        actual: String,
    },
}

/// A configuration error: the first violation found, addressed by a
/// root-relative JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message())]
pub struct ValidationError {
    pub path: String,
    pub violation: Violation,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, violation: Violation) -> Self {
        Self {
            path: path.into(),
            violation,
        }
    }

    /// Human-readable description of the violation.
    pub fn message(&self) -> String {
        let path = &self.path;
        match &self.violation {
            Violation::Type { expected, actual } => format!(
                "Expected value of type {} at path '{}', actual {}.",
                expected, path, actual
            ),
            Violation::Enumeration { allowed, actual } => format!(
                "Unexpected value at path '{}', expecting {}, found '{}'.",
                path,
                quote_list(allowed),
                actual
            ),
            Violation::Missing => format!("Missing property '{}'.", path),
            Violation::Unknown => format!("Unknown property '{}'.", path),
            Violation::MinLength { min, actual } => format!(
                "Expected at least {} {} at path '{}', actual {}.",
                min,
                characters(*min),
                path,
                actual
            ),
            Violation::Format { format, .. } => {
                format!("Invalid {} format at path '{}'.", format, path)
            }
        }
    }

    /// The expected type or shape.
    pub fn expected(&self) -> String {
        match &self.violation {
            Violation::Type { expected, .. } => expected.clone(),
            Violation::Enumeration { allowed, .. } => quote_list(allowed),
            Violation::Missing => "a value".to_string(),
            Violation::Unknown => "no value".to_string(),
            Violation::MinLength { min, .. } => format!("at least {} {}", min, characters(*min)),
            Violation::Format { format, .. } => format!("{} format", format),
        }
    }

    /// The type or value actually found.
    pub fn actual(&self) -> String {
        match &self.violation {
            Violation::Type { actual, .. } => actual.clone(),
            Violation::Enumeration { actual, .. } => actual.clone(),
            Violation::Missing => "nothing".to_string(),
            Violation::Unknown => "unknown property".to_string(),
            Violation::MinLength { actual, .. } => actual.to_string(),
            Violation::Format { actual, .. } => actual.clone(),
        }
    }
}

impl From<ValidationError> for RuleactError {
    fn from(err: ValidationError) -> Self {
        RuleactError::Validation(err.to_string())
    }
}

impl From<ActionError> for RuleactError {
    fn from(err: ActionError) -> Self {
        RuleactError::Dispatch(err.to_string())
    }
}

/// `'a'`, `'a' or 'b'`, `'a', 'b' or 'c'`.
fn quote_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("'{}'", i)).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

fn characters(count: usize) -> &'static str {
    if count == 1 {
        "character"
    } else {
        "characters"
    }
}
