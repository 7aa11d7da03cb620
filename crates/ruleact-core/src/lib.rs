pub mod config;
pub mod error;
pub mod telemetry;

pub use config::RuleactConfig;
pub use error::{Result, RuleactError};
