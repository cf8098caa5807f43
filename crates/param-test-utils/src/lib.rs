//! Shared test fixtures for the paramtree workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixtures`]: record types and variant families with a ready registry
//! - [`workspace`]: [`ConfigDir`] for writing and reading config files

pub mod fixtures;
pub mod workspace;

pub use workspace::ConfigDir;
