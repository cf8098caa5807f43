//! Parameter file formats

use std::fmt;

use crate::{Error, Result};

/// Textual formats a parameter file may be stored in.
///
/// JSON is accepted on input because every JSON document is also a YAML
/// document; files are always written back as YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// The canonical extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(FileFormat::from_extension("yaml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_extension("YML").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_extension("json").unwrap(), FileFormat::Json);
        assert!(FileFormat::from_extension("toml").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(FileFormat::Yaml.to_string(), "YAML");
        assert_eq!(FileFormat::Json.to_string(), "JSON");
    }
}
