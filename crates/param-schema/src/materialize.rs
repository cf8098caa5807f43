//! Type-directed materialization of raw trees
//!
//! The materializer walks a raw [`ParameterNode`] alongside a
//! [`DeclaredType`] and picks one conversion per pair:
//!
//! | declared                 | raw      | conversion                         |
//! |--------------------------|----------|------------------------------------|
//! | primitive                | any      | primitive converter                |
//! | single variant family    | mapping  | resolve `module_name`, build it    |
//! | list of a multi family   | sequence | resolve each element's module_name |
//! | record                   | mapping  | convert each declared field        |
//!
//! Anything else is an unsupported conversion. At the top level only,
//! a record or variant that fails to build from a mapping is retried as
//! the one-key shorthand `{Name: {fields...}}`.

use std::any::Any;

use indexmap::IndexMap;
use param_tree::{ParameterNode, Parameters, PathSegment, format_path};

use crate::config::{ConfigSchema, MODULE_NAME_KEY};
use crate::declared::{DeclaredType, Family, FamilyKind, Namespace, RecordType};
use crate::error::{Error, Result};
use crate::primitive::{self, ConvertOptions};
use crate::registry::{ModuleRegistry, RegistryEntry, VariantFamily};
use crate::value::{Fields, Value};

/// Converts raw trees into typed values against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Materializer<'r> {
    registry: &'r ModuleRegistry,
    options: ConvertOptions,
}

impl<'r> Materializer<'r> {
    pub fn new(registry: &'r ModuleRegistry) -> Self {
        Self::with_options(registry, ConvertOptions::default())
    }

    pub fn with_options(registry: &'r ModuleRegistry, options: ConvertOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &'r ModuleRegistry {
        self.registry
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Materialize `raw` as `declared`, without the shorthand fallback.
    pub fn materialize(&self, raw: &ParameterNode, declared: &DeclaredType) -> Result<Value> {
        self.materialize_at(raw, declared, &mut Vec::new())
    }

    /// Materialize a top-level value, trying the one-key shorthand when a
    /// record or variant does not build from `raw` directly.
    ///
    /// The fallback only runs when `raw` has the `{Name: {...}}` shape.
    /// Any other direct failure is returned unchanged.
    pub fn materialize_root(&self, raw: &ParameterNode, declared: &DeclaredType) -> Result<Value> {
        let ParameterNode::Mapping(map) = raw else {
            return self.materialize(raw, declared);
        };

        let (direct, namespace) = match declared {
            DeclaredType::Record(record) => {
                let namespace = record.schema().namespace();
                (self.construct_record(record, map, &mut Vec::new()), namespace)
            }
            DeclaredType::Variant(family) if family.kind() == FamilyKind::Single => {
                let namespace = Some(family.namespace());
                (self.construct_variant(family, map, &mut Vec::new()), namespace)
            }
            _ => return self.materialize(raw, declared),
        };

        let direct = match direct {
            Ok(value) => return Ok(Value::Record(value)),
            Err(err) => err,
        };
        let (Some(namespace), Some((name, inner))) = (namespace, one_key_shorthand(map)) else {
            return Err(direct);
        };

        tracing::debug!(declared = %declared, error = %direct, "retrying as one-key shorthand");
        match self.construct_shorthand(declared, namespace, name, inner) {
            Ok(value) => Ok(Value::Record(value)),
            Err(shorthand) => Err(Error::ConversionError {
                raw: raw.excerpt(),
                declared: declared.to_string(),
                direct: Box::new(direct),
                shorthand: Box::new(shorthand),
            }),
        }
    }

    /// Materialize a record from a raw tree.
    pub fn from_raw<T: ConfigSchema>(&self, raw: &ParameterNode) -> Result<T> {
        let value = self.materialize_root(raw, &DeclaredType::record::<T>())?;
        downcast_root(value, T::NAME)
    }

    /// Materialize a single variant of family `F` from a raw tree.
    pub fn variant_from_raw<F: ?Sized + VariantFamily>(&self, raw: &ParameterNode) -> Result<Box<F>> {
        let value = self.materialize_root(raw, &DeclaredType::variant::<F>())?;
        downcast_root(value, F::NAME)
    }

    pub fn from_parameters<T: ConfigSchema>(&self, parameters: &Parameters) -> Result<T> {
        self.from_raw(parameters.data())
    }

    fn materialize_at(
        &self,
        raw: &ParameterNode,
        declared: &DeclaredType,
        path: &mut Vec<PathSegment>,
    ) -> Result<Value> {
        tracing::trace!(path = %format_path(path), %declared, raw = %raw.kind(), "materializing");

        if declared.is_primitive() {
            return primitive::convert(raw, declared, &self.options, path);
        }

        match (declared, raw) {
            (DeclaredType::Variant(family), ParameterNode::Mapping(map))
                if family.kind() == FamilyKind::Single =>
            {
                self.construct_variant(family, map, path).map(Value::Record)
            }
            (DeclaredType::List(inner), ParameterNode::Sequence(items)) => match inner.as_ref() {
                DeclaredType::Variant(family) if family.kind() == FamilyKind::Multi => {
                    self.construct_variant_list(family, items, path)
                }
                _ => Err(primitive::unsupported(raw, declared, path)),
            },
            (DeclaredType::Record(record), ParameterNode::Mapping(map)) => {
                self.construct_record(record, map, path).map(Value::Record)
            }
            _ => Err(primitive::unsupported(raw, declared, path)),
        }
    }

    fn construct_variant_list(
        &self,
        family: &Family,
        items: &[ParameterNode],
        path: &mut Vec<PathSegment>,
    ) -> Result<Value> {
        let mut values = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            path.push(PathSegment::Index(index));
            let value = match item {
                ParameterNode::Mapping(map) => self.construct_variant(family, map, path),
                other => Err(Error::ElementNotMapping {
                    index,
                    family: family.name().to_string(),
                    found: other.kind().to_string(),
                    path: format_path(path),
                }),
            };
            path.pop();
            values.push(Value::Record(value?));
        }
        Ok(Value::List(values))
    }

    /// Convert each declared field present in `map`.
    fn collect_fields(
        &self,
        record: &RecordType,
        map: &IndexMap<String, ParameterNode>,
        path: &mut Vec<PathSegment>,
    ) -> Result<Fields> {
        let schema = record.schema();
        let mut fields = Fields::new(schema.name(), format_path(path));

        for spec in schema.fields() {
            match map.get(spec.name()) {
                Some(raw) => {
                    path.push(PathSegment::Key(spec.name().to_string()));
                    let value = self.materialize_at(raw, spec.declared(), path);
                    path.pop();
                    fields.insert(spec.name(), value?);
                }
                None if spec.is_required() => {
                    return Err(Error::MissingField {
                        field: spec.name().to_string(),
                        record: schema.name().to_string(),
                        path: format_path(path),
                    });
                }
                None => {}
            }
        }

        for key in map.keys().filter(|key| schema.get(key).is_none()) {
            tracing::warn!(record = schema.name(), path = %format_path(path), key = %key, "ignoring undeclared key");
        }

        Ok(fields)
    }

    fn construct_record(
        &self,
        record: &RecordType,
        map: &IndexMap<String, ParameterNode>,
        path: &mut Vec<PathSegment>,
    ) -> Result<Box<dyn Any>> {
        let fields = self.collect_fields(record, map, path)?;
        record.build(fields).map_err(|e| e.at(&format_path(path)))
    }

    fn construct_variant(
        &self,
        family: &Family,
        map: &IndexMap<String, ParameterNode>,
        path: &mut Vec<PathSegment>,
    ) -> Result<Box<dyn Any>> {
        let name = match map.get(MODULE_NAME_KEY) {
            Some(ParameterNode::Scalar(name)) => name,
            Some(other) => {
                path.push(PathSegment::Key(MODULE_NAME_KEY.to_string()));
                let err = primitive::unsupported(other, &DeclaredType::Str, path);
                path.pop();
                return Err(err);
            }
            None => {
                return Err(Error::MissingModuleName {
                    family: family.name().to_string(),
                    path: format_path(path),
                });
            }
        };

        let entry = self.resolve(family.namespace(), name, path)?;
        let mut rest = map.clone();
        rest.shift_remove(MODULE_NAME_KEY);
        self.build_variant(entry, family, &rest, path)
    }

    fn build_variant(
        &self,
        entry: &RegistryEntry,
        family: &Family,
        map: &IndexMap<String, ParameterNode>,
        path: &mut Vec<PathSegment>,
    ) -> Result<Box<dyn Any>> {
        let Some(build) = entry.variant_builder(family.type_id()) else {
            return Err(Error::NotAVariant {
                name: entry.name().to_string(),
                namespace: family.namespace().to_string(),
                family: family.name().to_string(),
                path: format_path(path),
            });
        };
        let fields = self.collect_fields(entry.record_type(), map, path)?;
        build(fields).map_err(|e| e.at(&format_path(path)))
    }

    fn resolve(&self, namespace: Namespace, name: &str, path: &[PathSegment]) -> Result<&'r RegistryEntry> {
        self.registry
            .resolve(namespace, name)
            .map_err(|e| e.at(&format_path(path)))
    }

    /// Build from `{Name: {fields...}}`, `Name` resolved in `namespace`.
    fn construct_shorthand(
        &self,
        declared: &DeclaredType,
        namespace: Namespace,
        name: &str,
        inner: &IndexMap<String, ParameterNode>,
    ) -> Result<Box<dyn Any>> {
        let entry = self.registry.resolve(namespace, name)?;
        let mut path = vec![PathSegment::Key(name.to_string())];
        match declared {
            DeclaredType::Variant(family) => self.build_variant(entry, family, inner, &mut path),
            DeclaredType::Record(record) if entry.record_type() == record => {
                self.construct_record(record, inner, &mut path)
            }
            _ => Err(Error::NotAVariant {
                name: entry.name().to_string(),
                namespace: namespace.to_string(),
                family: declared.to_string(),
                path: String::new(),
            }),
        }
    }
}

/// The `{Name: {...}}` shape: exactly one key whose value is a mapping.
fn one_key_shorthand(
    map: &IndexMap<String, ParameterNode>,
) -> Option<(&str, &IndexMap<String, ParameterNode>)> {
    if map.len() != 1 {
        return None;
    }
    match map.first() {
        Some((name, ParameterNode::Mapping(inner))) => Some((name.as_str(), inner)),
        _ => None,
    }
}

fn downcast_root<T: 'static>(value: Value, expected: &str) -> Result<T> {
    let found = value.kind_name();
    match value {
        Value::Record(any) => any.downcast::<T>().map(|boxed| *boxed).map_err(|_| Error::TypeMismatch {
            field: "<root>".to_string(),
            expected: expected.to_string(),
            found: "record of another type".to_string(),
            path: String::new(),
        }),
        _ => Err(Error::TypeMismatch {
            field: "<root>".to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
            path: String::new(),
        }),
    }
}
