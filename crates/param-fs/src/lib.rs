//! Parameter file access for paramtree
//!
//! Locates parameter files, detects their format and provides locked,
//! atomic reads and writes.

pub mod error;
pub mod format;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use format::FileFormat;
pub use io::MAX_PARAM_FILE_SIZE;
pub use path::ParamFile;
