//! Flatten command

use std::io::Write;

use crate::commands::load::{Input, load_parameters};
use crate::error::Result;

/// Print every leaf of the substituted tree.
///
/// Plain output is one `path = value` line per leaf; a scalar root prints
/// just its value.
pub fn run_flatten(input: &Input<'_>, json: bool, out: &mut dyn Write) -> Result<()> {
    let flat = load_parameters(input)?.flatten();

    if json {
        serde_json::to_writer_pretty(&mut *out, &flat)?;
        writeln!(out)?;
        return Ok(());
    }

    for (path, value) in &flat {
        if path.is_empty() {
            writeln!(out, "{value}")?;
        } else {
            writeln!(out, "{path} = {value}")?;
        }
    }
    Ok(())
}
