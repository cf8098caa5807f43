//! Command implementations for param-cli

pub mod flatten;
pub mod get;
pub mod load;
pub mod render;

pub use flatten::run_flatten;
pub use get::run_get;
pub use load::Input;
pub use render::run_render;
