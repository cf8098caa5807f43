//! Parameter file paths

use std::path::{Path, PathBuf};

use crate::{FileFormat, Result};

/// Path to a parameter file, normalized to forward slashes internally.
///
/// Conversion to the platform-native form happens only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamFile {
    inner: String,
}

impl ParamFile {
    /// Create a new path from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let mut inner = String::with_capacity(raw.len());
        let mut previous_slash = false;
        for ch in raw.chars() {
            if ch == '/' && previous_slash {
                continue;
            }
            previous_slash = ch == '/';
            inner.push(ch);
        }
        Self { inner }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// Detect the file format from the extension.
    ///
    /// Files without an extension are treated as YAML.
    pub fn format(&self) -> Result<FileFormat> {
        match self.extension() {
            Some(extension) => FileFormat::from_extension(extension),
            None => Ok(FileFormat::Yaml),
        }
    }

    pub fn exists(&self) -> bool {
        self.to_native().is_file()
    }
}

impl AsRef<Path> for ParamFile {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for ParamFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for ParamFile {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ParamFile {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for ParamFile {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for ParamFile {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
