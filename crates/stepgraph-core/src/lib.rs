//! Stepgraph core: part model, spatial index, connectivity oracle, and
//! the assembly/hierarchy graph builders.

pub mod assembly;
pub mod connect;
pub mod error;
pub mod graph;
pub mod graphml;
pub mod hierarchy;
pub mod model;
pub mod shape;
pub mod spatial;
pub mod stats;


#[cfg(test)]
pub mod test_utils;

pub use assembly::{build_assembly_graph, valid_parts, AssemblyConfig};
pub use connect::{are_connected, size_adaptive_tolerance, TOLERANCE_CEILING, TOLERANCE_FRACTION};
pub use error::CoreError;
pub use graph::{AssemblyGraph, HierarchyGraph, HierarchyNode};
pub use graphml::{write_assembly_graphml, write_hierarchy_graphml};
pub use hierarchy::build_hierarchy_graph;
pub use model::{Aabb, Part, TopoKind};
pub use shape::{FaceTopo, Shape, ShellTopo};
pub use spatial::SpatialIndex;
pub use stats::GraphStats;
