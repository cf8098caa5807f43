//! The parameter tree

use std::fmt;

use param_fs::{ParamFile, io};

use crate::emit::to_yaml_string;
use crate::error::{Error, Result};
use crate::flatten::{Flattened, flatten};
use crate::node::ParameterNode;
use crate::path::{PathSegment, format_path, get_at_path, parse_path, set_at_path};
use crate::substitution::{SubstitutionOptions, perform_substitutions};
use crate::template::{TemplateContext, TemplateRenderer, read_templated_yaml_file, read_templated_yaml_str};

/// A parameter tree with its references resolved.
///
/// The tree keeps the data as written alongside the substituted view, so
/// an [`update`](Self::update) to a referenced leaf propagates to every
/// leaf that refers to it.
///
/// # Example
///
/// ```
/// use param_tree::{Parameters, ParameterNode};
///
/// let mut params = Parameters::from_yaml_str("lr: 0.1\nwarmup_lr: $lr/10\n").unwrap();
/// assert_eq!(params.get_str("warmup_lr"), Some(&ParameterNode::from("0.1/10")));
///
/// params.update_str("lr", 0.5).unwrap();
/// assert_eq!(params.get_str("warmup_lr"), Some(&ParameterNode::from("0.5/10")));
/// ```
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Data as written, before substitution
    source: ParameterNode,
    /// Data after substitution
    data: ParameterNode,
    options: SubstitutionOptions,
}

impl Parameters {
    /// Build a parameter tree and resolve its references.
    pub fn new(raw: impl Into<ParameterNode>) -> Result<Self> {
        Self::with_options(raw, SubstitutionOptions::default())
    }

    /// Build a parameter tree with custom substitution options.
    pub fn with_options(raw: impl Into<ParameterNode>, options: SubstitutionOptions) -> Result<Self> {
        let source = raw.into();
        let data = perform_substitutions(&source, &options)?;
        Ok(Self {
            source,
            data,
            options,
        })
    }

    /// Parse YAML text.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let node: ParameterNode =
            serde_yaml::from_str(source).map_err(|e| Error::parse(e.to_string()))?;
        Self::new(node)
    }

    /// Read and parse a YAML (or JSON) file.
    pub fn from_yaml_file(path: &ParamFile) -> Result<Self> {
        path.format()?;
        let source = io::read_text(path)?;
        Self::from_yaml_str(&source)
    }

    /// Render templated YAML text against a context, then parse it.
    pub fn from_templated_yaml_str(
        source: &str,
        context: &TemplateContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<Self> {
        Self::new(read_templated_yaml_str(source, context, renderer)?)
    }

    /// Read a templated YAML file, render it against a context and parse it.
    pub fn from_templated_yaml_file(
        path: &ParamFile,
        context: &TemplateContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<Self> {
        Self::new(read_templated_yaml_file(path, context, renderer)?)
    }

    /// The substituted tree.
    pub fn data(&self) -> &ParameterNode {
        &self.data
    }

    pub fn into_data(self) -> ParameterNode {
        self.data
    }

    /// The tree as written, before substitution.
    pub fn source(&self) -> &ParameterNode {
        &self.source
    }

    pub fn options(&self) -> &SubstitutionOptions {
        &self.options
    }

    /// Flattened view of the substituted tree.
    pub fn flatten(&self) -> Flattened {
        flatten(&self.data)
    }

    pub fn get(&self, path: &[PathSegment]) -> Option<&ParameterNode> {
        get_at_path(&self.data, path)
    }

    /// Look up a node by its dotted path (`a.b.0.c` or `a.b[0].c`).
    pub fn get_str(&self, path: &str) -> Option<&ParameterNode> {
        self.get(&parse_path(path))
    }

    /// Assign a value at `path` and resolve references again.
    ///
    /// Every intermediate segment must exist. On failure the tree is left
    /// unchanged.
    pub fn update(&mut self, path: &[PathSegment], value: impl Into<ParameterNode>) -> Result<()> {
        let mut source = self.source.clone();
        if !set_at_path(&mut source, path, value.into()) {
            return Err(Error::PathNotFound {
                path: format_path(path),
            });
        }

        let data = perform_substitutions(&source, &self.options)?;
        tracing::debug!(path = %format_path(path), "updated parameter");
        self.source = source;
        self.data = data;
        Ok(())
    }

    /// [`update`](Self::update) with a dotted path.
    pub fn update_str(&mut self, path: &str, value: impl Into<ParameterNode>) -> Result<()> {
        self.update(&parse_path(path), value)
    }

    /// Re-run substitution over the current data.
    ///
    /// Idempotent: a converged tree has no references left to resolve.
    pub fn perform_substitutions(&mut self) -> Result<()> {
        self.data = perform_substitutions(&self.data, &self.options)?;
        Ok(())
    }

    /// Emit the substituted tree as YAML.
    pub fn to_yaml(&self) -> String {
        to_yaml_string(&self.data)
    }

    /// Write the substituted tree to a YAML file atomically.
    pub fn write_yaml(&self, path: &ParamFile) -> Result<()> {
        io::write_text(path, &self.to_yaml())?;
        Ok(())
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_yaml())
    }
}
