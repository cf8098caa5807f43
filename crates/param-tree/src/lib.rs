//! Parameter trees for paramtree
//!
//! Holds semi-structured parameter data as a tree of string scalars,
//! sequences and mappings, and resolves `$name` / `${name}` references
//! between its leaves before any typed conversion happens.

pub mod emit;
pub mod error;
pub mod flatten;
pub mod node;
pub mod parameters;
pub mod path;
pub mod substitution;
pub mod template;

pub use emit::{Comments, to_yaml_string, to_yaml_string_with_comments};
pub use error::{Error, Result};
pub use flatten::{FlatPath, Flattened, flatten, map_scalars};
pub use node::{NodeKind, ParameterNode};
pub use parameters::Parameters;
pub use path::{PathSegment, format_path, parse_path};
pub use substitution::{
    DEFAULT_MAX_ITERATIONS, SubstitutionOptions, perform_substitutions, substitute_once,
    substitute_str,
};
pub use template::{
    HandlebarsRenderer, PlainRenderer, TemplateContext, TemplateRenderer,
    create_context_from_unknown_args, read_templated_yaml_file, read_templated_yaml_str,
};
