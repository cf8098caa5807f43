//! Error types for param-tree

/// Result type for param-tree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, editing or substituting parameter trees
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse YAML parameters: {message}")]
    Parse { message: String },

    #[error("Failed to render template: {message}")]
    Template { message: String },

    #[error(
        "Substitution did not converge after {iterations} iterations (unresolved: {})",
        .unresolved.join(", ")
    )]
    SubstitutionDivergence {
        iterations: usize,
        unresolved: Vec<String>,
    },

    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    #[error("Cannot create context from {count} arguments: expected key/value pairs")]
    OddArgumentCount { count: usize },

    #[error(transparent)]
    Fs(#[from] param_fs::Error),
}

impl Error {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}
