//! Error types for the model crate

use thiserror::Error;

/// Errors raised while loading or resolving model data
#[derive(Error, Debug)]
pub enum ModelError {
    /// A vocabulary key that has not been registered
    #[error("{table} key '{key}' is not in the vocabulary. Add the canonical phrase before using it in a plan.")]
    UnknownKey {
        /// Vocabulary table name ("hazard", "control", "ppe", "stop_work")
        table: &'static str,
        /// The unregistered key
        key: String,
    },

    /// A risk rating string that does not parse
    #[error("unrecognized risk rating '{0}' (expected e.g. \"High (6)\")")]
    BadRating(String),

    /// A plan row referencing a task key with no definition
    #[error("plan references unknown task key '{0}'")]
    UnknownTask(String),

    /// Error reading plan or vocabulary files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing TOML input
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
