//! [`ConfigDir`] temporary directory for config file scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use param_fs::ParamFile;
use tempfile::TempDir;

/// A temporary directory with helpers for writing and checking config files.
///
/// # Example
///
/// ```rust,no_run
/// use param_test_utils::ConfigDir;
///
/// let dir = ConfigDir::new();
/// let file = dir.write("train.yaml", "batch_size: 4\n");
/// dir.assert_file_contains("train.yaml", "batch_size");
/// # let _ = file;
/// ```
pub struct ConfigDir {
    temp_dir: TempDir,
}

impl Default for ConfigDir {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("ConfigDir::new: failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute filesystem path of `name` inside the directory.
    pub fn native(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// [`ParamFile`] for `name` inside the directory.
    pub fn file(&self, name: &str) -> ParamFile {
        ParamFile::from(self.native(name))
    }

    /// Write `contents` to `name`, creating parent directories.
    pub fn write(&self, name: &str, contents: &str) -> ParamFile {
        let path = self.native(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("ConfigDir::write: failed to create parent");
        }
        fs::write(&path, contents).expect("ConfigDir::write: failed to write file");
        self.file(name)
    }

    /// Read `name` back as text.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, name: &str) -> String {
        let path = self.native(name);
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Assert that `name` exists and contains `content`.
    pub fn assert_file_contains(&self, name: &str, content: &str) {
        let text = self.read(name);
        assert!(
            text.contains(content),
            "File {name} does not contain expected content.\nExpected: {content}\nActual: {text}"
        );
    }
}
