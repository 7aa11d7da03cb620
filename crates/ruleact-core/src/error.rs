use thiserror::Error;

/// Top-level error type for the ruleact workspace.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for RuleactError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuleactError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for RuleactError {
    fn from(err: toml::de::Error) -> Self {
        RuleactError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RuleactError {
    fn from(err: serde_json::Error) -> Self {
        RuleactError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for ruleact operations.
pub type Result<T> = std::result::Result<T, RuleactError>;
