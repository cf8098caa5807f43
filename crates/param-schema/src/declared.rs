//! Declared types and record schemas
//!
//! A [`DeclaredType`] is what a field promises to hold. The materializer
//! dispatches on it together with the runtime shape of the raw node.

use std::any::{Any, TypeId};
use std::fmt;

use crate::config::ConfigSchema;
use crate::error::Result;
use crate::registry::VariantFamily;
use crate::value::{Fields, FromValue};

/// A lookup scope for module names.
///
/// Every record and variant family lives in one; `module_name` strings are
/// resolved against the namespace of the family being constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(&'static str);

impl Namespace {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Whether a family is used one-at-a-time or as a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyKind {
    Single,
    Multi,
}

/// Runtime description of a variant family.
#[derive(Clone, Copy)]
pub struct Family {
    name: &'static str,
    namespace: Namespace,
    kind: FamilyKind,
    type_id: TypeId,
}

impl Family {
    pub fn of<F: ?Sized + VariantFamily>() -> Self {
        Self {
            name: F::NAME,
            namespace: F::NAMESPACE,
            kind: F::KIND,
            type_id: TypeId::of::<F>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn kind(&self) -> FamilyKind {
        self.kind
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl PartialEq for Family {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Family")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Runtime handle on a [`ConfigSchema`] type.
#[derive(Clone, Copy)]
pub struct RecordType {
    name: &'static str,
    schema: fn() -> Schema,
    build: fn(Fields) -> Result<Box<dyn Any>>,
    type_id: TypeId,
}

fn build_record<T: ConfigSchema>(fields: Fields) -> Result<Box<dyn Any>> {
    Ok(Box::new(T::construct(fields)?))
}

impl RecordType {
    pub fn of<T: ConfigSchema>() -> Self {
        Self {
            name: T::NAME,
            schema: T::schema,
            build: build_record::<T>,
            type_id: TypeId::of::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn schema(&self) -> Schema {
        (self.schema)()
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Run the record's constructor; the result boxes the concrete type.
    pub(crate) fn build(&self, fields: Fields) -> Result<Box<dyn Any>> {
        (self.build)(fields)
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}

/// The type a field declares.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    Int,
    Float,
    Str,
    Bool,
    List(Box<DeclaredType>),
    Map(Box<DeclaredType>, Box<DeclaredType>),
    /// A nested record built from a mapping of its fields
    Record(RecordType),
    /// One member of a variant family, selected by `module_name`
    Variant(Family),
}

impl DeclaredType {
    /// The declared type of a primitive Rust type.
    pub fn of<T: FromValue>() -> Self {
        T::declared_type()
    }

    pub fn record<T: ConfigSchema>() -> Self {
        Self::Record(RecordType::of::<T>())
    }

    pub fn variant<F: ?Sized + VariantFamily>() -> Self {
        Self::Variant(Family::of::<F>())
    }

    /// A list of variants of a multi family.
    pub fn variants<F: ?Sized + VariantFamily>() -> Self {
        Self::list(Self::variant::<F>())
    }

    pub fn list(inner: DeclaredType) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn map(key: DeclaredType, value: DeclaredType) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Str | Self::Bool)
    }

    /// Scalars, lists of primitives and maps from scalars to primitives.
    pub fn is_primitive(&self) -> bool {
        match self {
            Self::List(inner) => inner.is_primitive(),
            Self::Map(key, value) => key.is_scalar() && value.is_primitive(),
            other => other.is_scalar(),
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::Bool => f.write_str("bool"),
            Self::List(inner) => write!(f, "list[{inner}]"),
            Self::Map(key, value) => write!(f, "map[{key}, {value}]"),
            Self::Record(record) => f.write_str(record.name()),
            Self::Variant(family) => f.write_str(family.name()),
        }
    }
}

/// One declared field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    declared: DeclaredType,
    required: bool,
    help: Option<String>,
}

impl FieldSpec {
    /// A required field.
    pub fn new(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared,
            required: true,
            help: None,
        }
    }

    pub fn of<T: FromValue>(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::of::<T>())
    }

    pub fn record<T: ConfigSchema>(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::record::<T>())
    }

    pub fn variant<F: ?Sized + VariantFamily>(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::variant::<F>())
    }

    pub fn variants<F: ?Sized + VariantFamily>(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::variants::<F>())
    }

    /// Mark the field as having a default in the constructor.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

/// The declared shape of a record: its fields in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: &'static str,
    namespace: Option<Namespace>,
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            namespace: None,
            fields: Vec::new(),
        }
    }

    /// Namespace used to resolve the one-key shorthand for this record.
    pub fn in_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn namespace(&self) -> Option<Namespace> {
        self.namespace
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }
}
