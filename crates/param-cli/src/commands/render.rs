//! Render command

use std::io::Write;

use crate::commands::load::{Input, load_parameters};
use crate::error::Result;

/// Print the substituted parameter tree as YAML.
pub fn run_render(input: &Input<'_>, out: &mut dyn Write) -> Result<()> {
    let parameters = load_parameters(input)?;
    out.write_all(parameters.to_yaml().as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use param_test_utils::ConfigDir;
    use param_tree::{DEFAULT_MAX_ITERATIONS, Parameters};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_substitutes() {
        let dir = ConfigDir::new();
        dir.write("p.yaml", "a: '1.0'\nb: ['1', '2', '3*$a']\n");
        let file = dir.native("p.yaml").display().to_string();

        let mut out = Vec::new();
        run_render(
            &Input {
                file: &file,
                max_iterations: DEFAULT_MAX_ITERATIONS,
                ..Input::default()
            },
            &mut out,
        )
        .unwrap();

        let rendered = String::from_utf8(out).unwrap();
        let reparsed = Parameters::from_yaml_str(&rendered).unwrap();
        let expected = Parameters::from_yaml_str("a: '1.0'\nb: ['1', '2', '3*1.0']\n").unwrap();
        assert_eq!(reparsed, expected);
        assert!(!rendered.contains('$'));
    }
}
