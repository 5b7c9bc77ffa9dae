//! AI metadata generation for CAD assemblies.
//!
//! Given the part names of a decoded assembly (or rendered images when
//! the names carry no signal), asks a language model to describe what
//! the assembly is, and returns the structured result.

pub mod metadata;
pub mod prompt;
pub mod providers;

pub use metadata::AssemblyMetadata;
pub use providers::{create_provider, MetadataProvider};
