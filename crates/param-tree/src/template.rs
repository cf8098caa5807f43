//! Template rendering ahead of YAML parsing
//!
//! Parameter files may contain `{{ name }}` placeholders that are rendered
//! against a context before the YAML is parsed. The renderer is pluggable;
//! [`HandlebarsRenderer`] is the default.

use handlebars::Handlebars;
use indexmap::IndexMap;
use param_fs::{ParamFile, io};

use crate::error::{Error, Result};
use crate::node::ParameterNode;

/// Names and values available to a template.
pub type TemplateContext = IndexMap<String, String>;

/// Renders templated text against a context.
pub trait TemplateRenderer {
    fn render(&self, source: &str, context: &TemplateContext) -> Result<String>;
}

/// Handlebars-backed renderer.
///
/// Output is not HTML-escaped and unknown names render as empty text.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    /// Fail on references to names missing from the context.
    pub fn strict(mut self) -> Self {
        self.registry.set_strict_mode(true);
        self
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, source: &str, context: &TemplateContext) -> Result<String> {
        self.registry
            .render_template(source, context)
            .map_err(|e| Error::Template {
                message: e.to_string(),
            })
    }
}

/// Renderer that returns its input unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl TemplateRenderer for PlainRenderer {
    fn render(&self, source: &str, _context: &TemplateContext) -> Result<String> {
        Ok(source.to_string())
    }
}

/// Render a templated YAML string and parse the result.
pub fn read_templated_yaml_str(
    source: &str,
    context: &TemplateContext,
    renderer: &dyn TemplateRenderer,
) -> Result<ParameterNode> {
    let rendered = renderer.render(source, context)?;
    serde_yaml::from_str(&rendered).map_err(|e| Error::parse(e.to_string()))
}

/// Read a templated YAML file, render it and parse the result.
pub fn read_templated_yaml_file(
    path: &ParamFile,
    context: &TemplateContext,
    renderer: &dyn TemplateRenderer,
) -> Result<ParameterNode> {
    path.format()?;
    let source = io::read_text(path)?;
    read_templated_yaml_str(&source, context, renderer)
}

/// Pair up a flat argument list (`[k1, v1, k2, v2, ...]`) into a context.
///
/// Keys are kept verbatim. Later duplicates overwrite earlier ones.
pub fn create_context_from_unknown_args<S: AsRef<str>>(args: &[S]) -> Result<TemplateContext> {
    if args.len() % 2 != 0 {
        return Err(Error::OddArgumentCount { count: args.len() });
    }
    Ok(args
        .chunks_exact(2)
        .map(|pair| (pair[0].as_ref().to_string(), pair[1].as_ref().to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> TemplateContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_handlebars_renders_context() {
        let renderer = HandlebarsRenderer::new();
        let out = renderer
            .render("batch_size: {{ batch }}\n", &context(&[("batch", "32")]))
            .unwrap();
        assert_eq!(out, "batch_size: 32\n");
    }

    #[test]
    fn test_handlebars_does_not_escape() {
        let renderer = HandlebarsRenderer::new();
        let out = renderer
            .render("{{ expr }}", &context(&[("expr", "1<2 & 3>2")]))
            .unwrap();
        assert_eq!(out, "1<2 & 3>2");
    }

    #[test]
    fn test_strict_mode_rejects_unknown_names() {
        let renderer = HandlebarsRenderer::new().strict();
        let result = renderer.render("{{ missing }}", &TemplateContext::new());
        assert!(matches!(result, Err(Error::Template { .. })));
    }

    #[test]
    fn test_read_templated_yaml_str() {
        let node = read_templated_yaml_str(
            "module_a:\n  param_1: 1.0\n  param_3: {{ param_b }}\n",
            &context(&[("param_b", "100")]),
            &HandlebarsRenderer::new(),
        )
        .unwrap();
        let module = node.get("module_a").unwrap();
        assert_eq!(module.get("param_1"), Some(&ParameterNode::from("1.0")));
        assert_eq!(module.get("param_3"), Some(&ParameterNode::from("100")));
    }

    #[test]
    fn test_plain_renderer_keeps_braces() {
        let out = PlainRenderer.render("{{ x }}", &TemplateContext::new()).unwrap();
        assert_eq!(out, "{{ x }}");
    }

    #[test]
    fn test_context_from_pairs() {
        let ctx = create_context_from_unknown_args(&["--lr", "0.1", "--epochs", "3"]).unwrap();
        assert_eq!(ctx.get("--lr").map(String::as_str), Some("0.1"));
        assert_eq!(ctx.get("--epochs").map(String::as_str), Some("3"));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_context_from_odd_args_fails() {
        let result = create_context_from_unknown_args(&["--x"]);
        assert!(matches!(result, Err(Error::OddArgumentCount { count: 1 })));
    }

    #[test]
    fn test_context_from_empty_args() {
        let empty: [&str; 0] = [];
        assert!(create_context_from_unknown_args(&empty).unwrap().is_empty());
    }
}
