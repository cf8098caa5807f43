//! Loading a parameter file with template context and overrides

use param_fs::ParamFile;
use param_tree::{
    HandlebarsRenderer, Parameters, SubstitutionOptions, TemplateContext,
    create_context_from_unknown_args, read_templated_yaml_file,
};

use crate::cli::LoadArgs;
use crate::error::{CliError, Result};

/// Everything needed to load one parameter file.
#[derive(Debug, Clone, Default)]
pub struct Input<'a> {
    pub file: &'a str,
    pub load: LoadArgs,
    pub context: &'a [String],
    pub max_iterations: usize,
}

/// Pair trailing arguments into a template context.
///
/// `--lr 0.1` becomes `lr = 0.1`.
pub fn template_context(args: &[String]) -> Result<TemplateContext> {
    let raw = create_context_from_unknown_args(args)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key.trim_start_matches('-').to_string(), value))
        .collect())
}

/// Split a `PATH=VALUE` override.
pub fn parse_override(text: &str) -> Result<(&str, &str)> {
    match text.split_once('=') {
        Some((path, value)) if !path.trim().is_empty() => Ok((path.trim(), value)),
        _ => Err(CliError::user(format!(
            "Invalid override '{text}': expected PATH=VALUE"
        ))),
    }
}

/// Render, parse and substitute the file, then apply overrides in order.
pub fn load_parameters(input: &Input<'_>) -> Result<Parameters> {
    let file = ParamFile::new(input.file);
    let context = template_context(input.context)?;
    let renderer = if input.load.strict_templates {
        HandlebarsRenderer::new().strict()
    } else {
        HandlebarsRenderer::new()
    };

    let raw = read_templated_yaml_file(&file, &context, &renderer)?;
    let options = SubstitutionOptions {
        max_iterations: input.max_iterations,
    };
    let mut parameters = Parameters::with_options(raw, options)?;
    tracing::debug!(file = %file, context = context.len(), "loaded parameters");

    for text in &input.load.overrides {
        let (path, value) = parse_override(text)?;
        parameters.update_str(path, value)?;
    }
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use param_test_utils::ConfigDir;
    use param_tree::{DEFAULT_MAX_ITERATIONS, ParameterNode};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_template_context_strips_dashes() {
        let ctx = template_context(&strings(&["--lr", "0.1", "-e", "3", "plain", "x"])).unwrap();
        assert_eq!(ctx.get("lr").map(String::as_str), Some("0.1"));
        assert_eq!(ctx.get("e").map(String::as_str), Some("3"));
        assert_eq!(ctx.get("plain").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_template_context_odd_count() {
        let result = template_context(&strings(&["--lr"]));
        assert!(matches!(
            result,
            Err(CliError::Parameters(param_tree::Error::OddArgumentCount { count: 1 }))
        ));
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override("a.b=1").unwrap(), ("a.b", "1"));
        assert_eq!(parse_override("expr=1=2").unwrap(), ("expr", "1=2"));
        assert!(parse_override("novalue").is_err());
        assert!(parse_override("=1").is_err());
    }

    #[test]
    fn test_load_with_context_and_overrides() {
        let dir = ConfigDir::new();
        dir.write("p.yaml", "lr: {{ lr }}\nwarmup: $lr/10\nepochs: 1\n");
        let file = dir.native("p.yaml").display().to_string();
        let context = strings(&["--lr", "0.5"]);

        let params = load_parameters(&Input {
            file: &file,
            load: LoadArgs {
                overrides: vec!["epochs=4".to_string()],
                strict_templates: false,
            },
            context: &context,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
        .unwrap();

        assert_eq!(params.get_str("warmup"), Some(&ParameterNode::from("0.5/10")));
        assert_eq!(params.get_str("epochs"), Some(&ParameterNode::from("4")));
    }

    #[test]
    fn test_override_missing_path_fails() {
        let dir = ConfigDir::new();
        dir.write("p.yaml", "a: 1\n");
        let file = dir.native("p.yaml").display().to_string();

        let result = load_parameters(&Input {
            file: &file,
            load: LoadArgs {
                overrides: vec!["x.y=2".to_string()],
                strict_templates: false,
            },
            max_iterations: DEFAULT_MAX_ITERATIONS,
            ..Input::default()
        });
        assert!(matches!(
            result,
            Err(CliError::Parameters(param_tree::Error::PathNotFound { .. }))
        ));
    }
}
