//! Materialized values and record constructor input

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::config::ConfigSchema;
use crate::declared::DeclaredType;
use crate::error::{Error, Result};
use crate::registry::VariantFamily;

/// A value produced by the materializer.
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<Value>),
    /// Entries in source order
    Map(Vec<(Value, Value)>),
    /// A constructed record, or a boxed variant (`Box<dyn Family>`)
    Record(Box<dyn Any>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Value::Record(_) => f.write_str("Record(..)"),
        }
    }
}

impl PartialEq for Value {
    /// Records never compare equal; compare the constructed types instead.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// A value did not have the shape a constructor asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: String,
    pub found: String,
}

impl Mismatch {
    fn new(expected: impl fmt::Display, found: impl Into<String>) -> Self {
        Self {
            expected: expected.to_string(),
            found: found.into(),
        }
    }
}

/// Primitive Rust types a record field can hold.
pub trait FromValue: Sized {
    fn declared_type() -> DeclaredType;
    fn from_value(value: Value) -> std::result::Result<Self, Mismatch>;
}

macro_rules! int_from_value {
    ($($ty:ty),*) => {$(
        impl FromValue for $ty {
            fn declared_type() -> DeclaredType {
                DeclaredType::Int
            }

            fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
                match value {
                    Value::Int(i) => <$ty>::try_from(i)
                        .map_err(|_| Mismatch::new(stringify!($ty), format!("int {i} out of range"))),
                    other => Err(Mismatch::new("int", other.kind_name())),
                }
            }
        }
    )*};
}

int_from_value!(i64, i32, u32, u64, usize);

impl FromValue for f64 {
    fn declared_type() -> DeclaredType {
        DeclaredType::Float
    }

    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(i) => Ok(i as f64),
            other => Err(Mismatch::new("float", other.kind_name())),
        }
    }
}

impl FromValue for f32 {
    fn declared_type() -> DeclaredType {
        DeclaredType::Float
    }

    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl FromValue for String {
    fn declared_type() -> DeclaredType {
        DeclaredType::Str
    }

    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(Mismatch::new("str", other.kind_name())),
        }
    }
}

impl FromValue for bool {
    fn declared_type() -> DeclaredType {
        DeclaredType::Bool
    }

    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(Mismatch::new("bool", other.kind_name())),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::list(T::declared_type())
    }

    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(Mismatch::new(Self::declared_type(), other.kind_name())),
        }
    }
}

fn map_entries<K: FromValue, V: FromValue>(
    value: Value,
    declared: DeclaredType,
) -> std::result::Result<impl Iterator<Item = std::result::Result<(K, V), Mismatch>>, Mismatch> {
    match value {
        Value::Map(entries) => Ok(entries
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))),
        other => Err(Mismatch::new(declared, other.kind_name())),
    }
}

impl<K: FromValue + Hash + Eq, V: FromValue> FromValue for IndexMap<K, V> {
    fn declared_type() -> DeclaredType {
        DeclaredType::map(K::declared_type(), V::declared_type())
    }

    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        map_entries(value, Self::declared_type())?.collect()
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn declared_type() -> DeclaredType {
        DeclaredType::map(K::declared_type(), V::declared_type())
    }

    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        map_entries(value, Self::declared_type())?.collect()
    }
}

impl<K: FromValue + Hash + Eq, V: FromValue> FromValue for HashMap<K, V> {
    fn declared_type() -> DeclaredType {
        DeclaredType::map(K::declared_type(), V::declared_type())
    }

    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        map_entries(value, Self::declared_type())?.collect()
    }
}

/// Converted field values handed to a record constructor.
///
/// Only fields present in the raw data appear here; a constructor supplies
/// defaults for the optional ones it does not find.
#[derive(Debug)]
pub struct Fields {
    record: &'static str,
    path: String,
    values: IndexMap<String, Value>,
}

impl Fields {
    pub fn new(record: &'static str, path: impl Into<String>) -> Self {
        Self {
            record,
            path: path.into(),
            values: IndexMap::new(),
        }
    }

    /// Add a converted value, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn record_name(&self) -> &'static str {
        self.record
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn field_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        }
    }

    fn missing(&self, name: &str) -> Error {
        Error::MissingField {
            field: name.to_string(),
            record: self.record.to_string(),
            path: self.path.clone(),
        }
    }

    fn mismatch(&self, name: &str, mismatch: Mismatch) -> Error {
        Error::TypeMismatch {
            field: name.to_string(),
            expected: mismatch.expected,
            found: mismatch.found,
            path: self.field_path(name),
        }
    }

    fn take_value(&mut self, name: &str) -> Result<Value> {
        self.values.shift_remove(name).ok_or_else(|| self.missing(name))
    }

    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T> {
        let value = self.take_value(name)?;
        T::from_value(value).map_err(|m| self.mismatch(name, m))
    }

    pub fn take_opt<T: FromValue>(&mut self, name: &str) -> Result<Option<T>> {
        if self.contains(name) {
            self.take(name).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn take_or<T: FromValue>(&mut self, name: &str, default: T) -> Result<T> {
        Ok(self.take_opt(name)?.unwrap_or(default))
    }

    pub fn take_or_default<T: FromValue + Default>(&mut self, name: &str) -> Result<T> {
        Ok(self.take_opt(name)?.unwrap_or_default())
    }

    fn downcast<T: 'static>(&self, name: &str, value: Value, expected: &str) -> Result<T> {
        match value {
            Value::Record(any) => any
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| self.mismatch(name, Mismatch::new(expected, "record of another type"))),
            other => Err(self.mismatch(name, Mismatch::new(expected, other.kind_name()))),
        }
    }

    /// Take a nested record.
    pub fn record<T: ConfigSchema>(&mut self, name: &str) -> Result<T> {
        let value = self.take_value(name)?;
        self.downcast(name, value, T::NAME)
    }

    pub fn record_opt<T: ConfigSchema>(&mut self, name: &str) -> Result<Option<T>> {
        if self.contains(name) {
            self.record(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Take a single variant of family `F`.
    pub fn variant<F: ?Sized + VariantFamily>(&mut self, name: &str) -> Result<Box<F>> {
        let value = self.take_value(name)?;
        self.downcast::<Box<F>>(name, value, F::NAME)
    }

    pub fn variant_opt<F: ?Sized + VariantFamily>(&mut self, name: &str) -> Result<Option<Box<F>>> {
        if self.contains(name) {
            self.variant(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Take a list of variants of family `F`.
    pub fn variants<F: ?Sized + VariantFamily>(&mut self, name: &str) -> Result<Vec<Box<F>>> {
        match self.take_value(name)? {
            Value::List(items) => items
                .into_iter()
                .map(|item| self.downcast::<Box<F>>(name, item, F::NAME))
                .collect(),
            other => Err(self.mismatch(
                name,
                Mismatch::new(format!("list[{}]", F::NAME), other.kind_name()),
            )),
        }
    }

    /// Like [`variants`](Self::variants), empty when the field is absent.
    pub fn variants_or_empty<F: ?Sized + VariantFamily>(&mut self, name: &str) -> Result<Vec<Box<F>>> {
        if self.contains(name) {
            self.variants(name)
        } else {
            Ok(Vec::new())
        }
    }
}
