//! Error types for param-schema

pub type Result<T> = std::result::Result<T, Error>;

/// Render a location suffix; the root has no suffix.
fn location(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at '{path}'")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot find key 'module_name' when creating {family}{}", location(.path))]
    MissingModuleName { family: String, path: String },

    #[error(
        "Cannot find '{name}' (or '{name}Config') in namespace '{namespace}'{}",
        location(.path)
    )]
    UnknownModule {
        name: String,
        namespace: String,
        path: String,
    },

    #[error("'{name}' in namespace '{namespace}' is not a {family}{}", location(.path))]
    NotAVariant {
        name: String,
        namespace: String,
        family: String,
        path: String,
    },

    #[error("Missing required field '{field}' of {record}{}", location(.path))]
    MissingField {
        field: String,
        record: String,
        path: String,
    },

    #[error("Unsafe expression {expression:?}{}: {reason}", location(.path))]
    UnsafeExpression {
        expression: String,
        reason: String,
        path: String,
    },

    #[error("Cannot evaluate {expression:?}{}: {reason}", location(.path))]
    EvaluationFailed {
        expression: String,
        reason: String,
        path: String,
    },

    #[error("Converting {value} to {target} would lose information{}", location(.path))]
    LossyConversion {
        value: String,
        target: String,
        path: String,
    },

    #[error("Invalid {target} value {value:?}{}", location(.path))]
    InvalidScalar {
        value: String,
        target: String,
        path: String,
    },

    #[error(
        "Element {index} of the {family} list is a {found}, expected a mapping{}",
        location(.path)
    )]
    ElementNotMapping {
        index: usize,
        family: String,
        found: String,
        path: String,
    },

    #[error("Cannot convert {runtime_type} {raw} to {declared}{}", location(.path))]
    UnsupportedConversion {
        runtime_type: String,
        raw: String,
        declared: String,
        path: String,
    },

    #[error(
        "Cannot convert {raw} to {declared}\n  as a mapping of fields: {direct}\n  as a one-key shorthand: {shorthand}"
    )]
    ConversionError {
        raw: String,
        declared: String,
        direct: Box<Error>,
        shorthand: Box<Error>,
    },

    #[error("Field '{field}' holds a {found}, expected {expected}{}", location(.path))]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
        path: String,
    },

    #[error(transparent)]
    Parameters(#[from] param_tree::Error),

    #[error(transparent)]
    Fs(#[from] param_fs::Error),
}

impl Error {
    /// Attach a location to an error raised without one.
    ///
    /// Errors that already carry a location keep it.
    pub fn at(mut self, location: &str) -> Self {
        match &mut self {
            Error::MissingModuleName { path, .. }
            | Error::UnknownModule { path, .. }
            | Error::NotAVariant { path, .. }
            | Error::MissingField { path, .. }
            | Error::UnsafeExpression { path, .. }
            | Error::EvaluationFailed { path, .. }
            | Error::LossyConversion { path, .. }
            | Error::InvalidScalar { path, .. }
            | Error::ElementNotMapping { path, .. }
            | Error::UnsupportedConversion { path, .. }
            | Error::TypeMismatch { path, .. }
                if path.is_empty() =>
            {
                *path = location.to_string();
            }
            _ => {}
        }
        self
    }

    /// The location the error refers to, if it carries one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::MissingModuleName { path, .. }
            | Error::UnknownModule { path, .. }
            | Error::NotAVariant { path, .. }
            | Error::MissingField { path, .. }
            | Error::UnsafeExpression { path, .. }
            | Error::EvaluationFailed { path, .. }
            | Error::LossyConversion { path, .. }
            | Error::InvalidScalar { path, .. }
            | Error::ElementNotMapping { path, .. }
            | Error::UnsupportedConversion { path, .. }
            | Error::TypeMismatch { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_fills_empty_location_only() {
        let err = Error::LossyConversion {
            value: "3.5".into(),
            target: "int".into(),
            path: String::new(),
        }
        .at("trainer.batch_size")
        .at("ignored");
        assert_eq!(err.path(), Some("trainer.batch_size"));
        assert_eq!(
            err.to_string(),
            "Converting 3.5 to int would lose information at 'trainer.batch_size'"
        );
    }

    #[test]
    fn test_root_location_has_no_suffix() {
        let err = Error::MissingModuleName {
            family: "Base".into(),
            path: String::new(),
        };
        assert_eq!(err.to_string(), "Cannot find key 'module_name' when creating Base");
    }
}
