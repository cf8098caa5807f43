//! Module registry for variant families
//!
//! Maps `(namespace, name)` pairs to the record types that can be built
//! from a `module_name`. A name resolves to itself first and then to
//! `name` + `Config`, so `module_name: Adam` finds a type registered as
//! `AdamConfig`.
//!
//! # Example
//!
//! ```
//! use param_schema::{ConfigRecord, ModuleRegistry, register_variants, variant_family};
//! # use param_schema::{ConfigSchema, Fields, Result, Schema};
//! # use param_tree::ParameterNode;
//!
//! pub trait Optimizer: ConfigRecord {}
//! variant_family!(dyn Optimizer, Single);
//!
//! #[derive(Debug)]
//! pub struct SgdConfig;
//! # impl ConfigSchema for SgdConfig {
//! #     const NAME: &'static str = "SgdConfig";
//! #     fn schema() -> Schema { Schema::new(Self::NAME) }
//! #     fn construct(_: Fields) -> Result<Self> { Ok(SgdConfig) }
//! #     fn to_parameters(&self) -> ParameterNode { ParameterNode::empty_mapping() }
//! # }
//! impl Optimizer for SgdConfig {}
//!
//! let mut registry = ModuleRegistry::new();
//! register_variants!(registry, dyn Optimizer => [SgdConfig]);
//!
//! let ns = <dyn Optimizer as param_schema::VariantFamily>::NAMESPACE;
//! assert_eq!(registry.resolve(ns, "Sgd").unwrap().name(), "SgdConfig");
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::ConfigSchema;
use crate::declared::{FamilyKind, Namespace, RecordType};
use crate::error::{Error, Result};
use crate::value::Fields;

/// Suffix tried when a module name does not resolve as written.
pub const CONFIG_SUFFIX: &str = "Config";

/// A family of interchangeable records, implemented for `dyn Trait`.
///
/// Use [`variant_family!`](crate::variant_family) rather than
/// implementing this by hand.
pub trait VariantFamily: 'static {
    const NAME: &'static str;
    const NAMESPACE: Namespace;
    const KIND: FamilyKind;
}

/// Implement [`VariantFamily`] for a trait object.
///
/// The family's namespace is the module the macro is invoked in.
///
/// ```
/// use param_schema::{ConfigRecord, variant_family};
///
/// pub trait Metric: ConfigRecord {}
/// variant_family!(dyn Metric, Multi);
/// ```
#[macro_export]
macro_rules! variant_family {
    (dyn $family:ident, $kind:ident) => {
        impl $crate::VariantFamily for dyn $family {
            const NAME: &'static str = stringify!($family);
            const NAMESPACE: $crate::Namespace = $crate::Namespace::new(module_path!());
            const KIND: $crate::FamilyKind = $crate::FamilyKind::$kind;
        }
    };
}

/// Register record types as variants of a family.
///
/// Each type must implement both [`ConfigSchema`](crate::ConfigSchema)
/// and the family trait.
#[macro_export]
macro_rules! register_variants {
    ($registry:expr, dyn $family:path => [$($variant:ty),+ $(,)?]) => {{
        $(
            $registry.register_variant::<dyn $family, $variant>(
                |variant: $variant| -> ::std::boxed::Box<dyn $family> {
                    ::std::boxed::Box::new(variant)
                },
            );
        )+
    }};
}

type VariantBuilder = Arc<dyn Fn(Fields) -> Result<Box<dyn Any>> + Send + Sync>;

/// A resolved registry entry.
#[derive(Clone)]
pub struct RegistryEntry {
    name: &'static str,
    record: RecordType,
    /// Constructors that box the record as `Box<dyn Family>`, per family
    variants: Vec<(TypeId, &'static str, VariantBuilder)>,
}

impl RegistryEntry {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record
    }

    /// Whether this entry was registered as a variant of the given family.
    pub fn is_variant_of(&self, family: TypeId) -> bool {
        self.variants.iter().any(|(id, _, _)| *id == family)
    }

    /// Names of the families this entry belongs to.
    pub fn families(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variants.iter().map(|(_, name, _)| *name)
    }

    pub(crate) fn variant_builder(&self, family: TypeId) -> Option<&VariantBuilder> {
        self.variants
            .iter()
            .find(|(id, _, _)| *id == family)
            .map(|(_, _, build)| build)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("families", &self.families().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry of module names per namespace.
///
/// Registration may happen at any point before materialization; lookups
/// always see the registry as it is when they run.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    entries: HashMap<(Namespace, String), RegistryEntry>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_for<T: ConfigSchema>(&mut self, namespace: Namespace) -> &mut RegistryEntry {
        self.entries
            .entry((namespace, T::NAME.to_string()))
            .or_insert_with(|| RegistryEntry {
                name: T::NAME,
                record: RecordType::of::<T>(),
                variants: Vec::new(),
            })
    }

    /// Register a plain record under `namespace` so the one-key shorthand
    /// can find it.
    pub fn register_record<T: ConfigSchema>(&mut self, namespace: Namespace) {
        tracing::debug!(%namespace, name = T::NAME, "registered record");
        let entry = self.entry_for::<T>(namespace);
        entry.record = RecordType::of::<T>();
    }

    /// Register `T` as a variant of family `F`.
    ///
    /// `upcast` boxes the record as the family's trait object; the
    /// [`register_variants!`](crate::register_variants) macro writes it.
    pub fn register_variant<F, T>(&mut self, upcast: fn(T) -> Box<F>)
    where
        F: ?Sized + VariantFamily,
        T: ConfigSchema,
    {
        tracing::debug!(namespace = %F::NAMESPACE, family = F::NAME, name = T::NAME, "registered variant");
        let build: VariantBuilder = Arc::new(move |fields: Fields| -> Result<Box<dyn Any>> {
            let record = T::construct(fields)?;
            Ok(Box::new(upcast(record)))
        });

        let family = TypeId::of::<F>();
        let entry = self.entry_for::<T>(F::NAMESPACE);
        entry.record = RecordType::of::<T>();
        entry.variants.retain(|(id, _, _)| *id != family);
        entry.variants.push((family, F::NAME, build));
    }

    /// Look a name up, trying `name` and then `name` + `Config`.
    pub fn lookup(&self, namespace: Namespace, name: &str) -> Option<&RegistryEntry> {
        let found = self
            .entries
            .get(&(namespace, name.to_string()))
            .or_else(|| {
                self.entries
                    .get(&(namespace, format!("{name}{CONFIG_SUFFIX}")))
            });
        tracing::debug!(
            %namespace,
            name,
            resolved = found.map(|entry| entry.name),
            "module lookup"
        );
        found
    }

    /// Like [`lookup`](Self::lookup), failing with [`Error::UnknownModule`].
    pub fn resolve(&self, namespace: Namespace, name: &str) -> Result<&RegistryEntry> {
        self.lookup(namespace, name).ok_or_else(|| Error::UnknownModule {
            name: name.to_string(),
            namespace: namespace.to_string(),
            path: String::new(),
        })
    }

    pub fn contains(&self, namespace: Namespace, name: &str) -> bool {
        self.lookup(namespace, name).is_some()
    }

    /// Registered names in a namespace, sorted.
    pub fn names(&self, namespace: Namespace) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .keys()
            .filter(|(ns, _)| *ns == namespace)
            .map(|(_, name)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
