//! Get command

use std::io::Write;

use param_tree::to_yaml_string;

use crate::commands::load::{Input, load_parameters};
use crate::error::Result;

/// Print the subtree at `path` as YAML.
pub fn run_get(input: &Input<'_>, path: &str, out: &mut dyn Write) -> Result<()> {
    let parameters = load_parameters(input)?;
    let node = parameters
        .get_str(path)
        .ok_or_else(|| param_tree::Error::PathNotFound {
            path: path.to_string(),
        })?;
    out.write_all(to_yaml_string(node).as_bytes())?;
    Ok(())
}
