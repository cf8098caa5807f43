//! Typed configuration records for paramtree
//!
//! Turns substituted [`param_tree::Parameters`] into typed records. Each
//! record declares its fields in a [`Schema`]; the [`Materializer`] walks
//! the raw tree against those declarations, evaluating numeric
//! expressions, recursing into nested records and resolving
//! `module_name` keys of variant families through a [`ModuleRegistry`].

pub mod annotate;
pub mod config;
pub mod declared;
pub mod error;
pub mod expr;
pub mod materialize;
pub mod primitive;
pub mod registry;
pub mod value;

pub use annotate::help_comments;
pub use config::{ConfigRecord, ConfigSchema, MODULE_NAME_KEY, RecordWriter, downcast_ref};
pub use declared::{DeclaredType, Family, FamilyKind, FieldSpec, Namespace, RecordType, Schema};
pub use error::{Error, Result};
pub use expr::{Number, evaluate};
pub use materialize::Materializer;
pub use primitive::{ConvertOptions, IntegerCoercion, convert, parse_bool};
pub use registry::{CONFIG_SUFFIX, ModuleRegistry, RegistryEntry, VariantFamily};
pub use value::{Fields, FromValue, Mismatch, Value};
