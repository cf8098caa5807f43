//! The contract every typed configuration record implements
//!
//! A record declares its fields through [`ConfigSchema::schema`], builds
//! itself from converted [`Fields`] in [`ConfigSchema::construct`] and
//! writes itself back out with [`ConfigSchema::to_parameters`]. Loading,
//! templating and saving are provided on top of those.

use std::any::Any;
use std::fmt;

use indexmap::IndexMap;
use param_fs::{ParamFile, io};
use param_tree::{
    ParameterNode, Parameters, TemplateContext, TemplateRenderer, to_yaml_string_with_comments,
};

use crate::annotate::help_comments;
use crate::declared::{DeclaredType, Schema};
use crate::error::Result;
use crate::materialize::Materializer;
use crate::registry::ModuleRegistry;
use crate::value::Fields;

/// Key naming the concrete type of a variant.
pub const MODULE_NAME_KEY: &str = "module_name";

/// A typed configuration record.
///
/// # Example
///
/// ```
/// use param_schema::{ConfigSchema, FieldSpec, Fields, ModuleRegistry, RecordWriter, Result, Schema};
/// use param_tree::ParameterNode;
///
/// #[derive(Debug, PartialEq)]
/// struct Train {
///     batch_size: i64,
///     lr: f64,
/// }
///
/// impl ConfigSchema for Train {
///     const NAME: &'static str = "Train";
///
///     fn schema() -> Schema {
///         Schema::new(Self::NAME)
///             .field(FieldSpec::of::<i64>("batch_size"))
///             .field(FieldSpec::of::<f64>("lr").optional())
///     }
///
///     fn construct(mut fields: Fields) -> Result<Self> {
///         Ok(Self {
///             batch_size: fields.take("batch_size")?,
///             lr: fields.take_or("lr", 0.1)?,
///         })
///     }
///
///     fn to_parameters(&self) -> ParameterNode {
///         RecordWriter::new()
///             .field("batch_size", self.batch_size)
///             .field("lr", self.lr)
///             .finish()
///     }
/// }
///
/// let registry = ModuleRegistry::new();
/// let train = Train::from_yaml_str("batch_size: 2*$lr_steps\nlr_steps: 4\n", &registry).unwrap();
/// assert_eq!(train, Train { batch_size: 8, lr: 0.1 });
/// ```
pub trait ConfigSchema: Sized + fmt::Debug + 'static {
    /// Type name, also the name variants are registered under
    const NAME: &'static str;

    fn schema() -> Schema;

    /// Build the record from converted field values.
    fn construct(fields: Fields) -> Result<Self>;

    /// Write the record back as a raw tree.
    fn to_parameters(&self) -> ParameterNode;

    /// Materialize from a raw tree.
    ///
    /// Accepts the record's mapping of fields, or when the record has a
    /// namespace, the one-key shorthand `{Name: {fields...}}`.
    fn from_raw(raw: &ParameterNode, registry: &ModuleRegistry) -> Result<Self> {
        Materializer::new(registry).from_raw(raw)
    }

    /// Materialize from a substituted parameter tree.
    fn from_parameters(parameters: &Parameters, registry: &ModuleRegistry) -> Result<Self> {
        Self::from_raw(parameters.data(), registry)
    }

    fn from_yaml_str(source: &str, registry: &ModuleRegistry) -> Result<Self> {
        Self::from_parameters(&Parameters::from_yaml_str(source)?, registry)
    }

    fn from_yaml_file(path: &ParamFile, registry: &ModuleRegistry) -> Result<Self> {
        Self::from_parameters(&Parameters::from_yaml_file(path)?, registry)
    }

    fn from_templated_yaml_file(
        path: &ParamFile,
        context: &TemplateContext,
        renderer: &dyn TemplateRenderer,
        registry: &ModuleRegistry,
    ) -> Result<Self> {
        let parameters = Parameters::from_templated_yaml_file(path, context, renderer)?;
        Self::from_parameters(&parameters, registry)
    }

    /// YAML with each field's help text as a comment.
    ///
    /// The registry resolves the schemas of variant fields.
    fn to_yaml(&self, registry: &ModuleRegistry) -> String {
        let tree = self.to_parameters();
        let comments = help_comments(&tree, &DeclaredType::record::<Self>(), registry);
        to_yaml_string_with_comments(&tree, &comments)
    }

    /// Write [`to_yaml`](Self::to_yaml) to `path` atomically.
    fn save(&self, path: &ParamFile, registry: &ModuleRegistry) -> Result<()> {
        io::write_text(path, &self.to_yaml(registry))?;
        tracing::debug!(record = Self::NAME, path = %path, "saved configuration");
        Ok(())
    }
}

/// Object-safe view of a record, the supertrait of every family trait.
pub trait ConfigRecord: fmt::Debug + Any {
    fn module_name(&self) -> &'static str;

    /// The record's fields with `module_name` first.
    fn variant_parameters(&self) -> ParameterNode;

    fn as_any(&self) -> &dyn Any;
}

impl<T: ConfigSchema> ConfigRecord for T {
    fn module_name(&self) -> &'static str {
        T::NAME
    }

    fn variant_parameters(&self) -> ParameterNode {
        let mut map = IndexMap::new();
        map.insert(MODULE_NAME_KEY.to_string(), ParameterNode::from(T::NAME));
        match self.to_parameters() {
            ParameterNode::Mapping(fields) => {
                map.extend(fields.into_iter().filter(|(key, _)| key != MODULE_NAME_KEY));
            }
            other => {
                tracing::warn!(record = T::NAME, kind = %other.kind(), "record did not serialize to a mapping");
            }
        }
        ParameterNode::Mapping(map)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Downcast a variant to its concrete type.
pub fn downcast_ref<T: ConfigSchema, F: ?Sized + ConfigRecord>(record: &F) -> Option<&T> {
    record.as_any().downcast_ref::<T>()
}

/// Builds the mapping a record writes in [`ConfigSchema::to_parameters`].
#[derive(Debug, Default)]
pub struct RecordWriter {
    entries: IndexMap<String, ParameterNode>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, value: impl Into<ParameterNode>) -> Self {
        self.entries.insert(name.to_string(), value.into());
        self
    }

    /// Write a field only when it has a value.
    pub fn optional<V: Into<ParameterNode>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.field(name, value),
            None => self,
        }
    }

    pub fn record<T: ConfigSchema>(self, name: &str, value: &T) -> Self {
        self.field(name, value.to_parameters())
    }

    pub fn variant<F: ?Sized + ConfigRecord>(self, name: &str, value: &F) -> Self {
        self.field(name, value.variant_parameters())
    }

    pub fn variants<F: ?Sized + ConfigRecord>(self, name: &str, values: &[Box<F>]) -> Self {
        let items: Vec<ParameterNode> = values.iter().map(|v| v.variant_parameters()).collect();
        self.field(name, ParameterNode::Sequence(items))
    }

    pub fn finish(self) -> ParameterNode {
        ParameterNode::Mapping(self.entries)
    }
}
