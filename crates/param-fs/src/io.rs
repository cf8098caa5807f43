//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;

use crate::{Error, ParamFile, Result};

/// Largest parameter file that will be read into memory.
pub const MAX_PARAM_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Read a parameter file as text.
///
/// Files larger than [`MAX_PARAM_FILE_SIZE`] are rejected before reading.
pub fn read_text(path: &ParamFile) -> Result<String> {
    let native_path = path.to_native();
    let metadata = fs::metadata(&native_path).map_err(|e| Error::io(&native_path, e))?;
    if metadata.len() > MAX_PARAM_FILE_SIZE {
        return Err(Error::TooLarge {
            path: native_path,
            size: metadata.len(),
            max: MAX_PARAM_FILE_SIZE,
        });
    }

    tracing::debug!(path = %path, bytes = metadata.len(), "reading parameter file");
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write content atomically to a file with locking.
///
/// Writes to a temp file in the same directory, then renames it over the
/// target so readers never observe a partial file.
pub fn write_atomic(path: &ParamFile, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    tracing::debug!(path = %path, bytes = content.len(), "wrote parameter file");
    Ok(())
}

/// Write text content to a file atomically.
pub fn write_text(path: &ParamFile, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
