//! Assembly graph builder: spatial pruning in front of the oracle.

use crate::connect::{are_connected, size_adaptive_tolerance};
use crate::graph::AssemblyGraph;
use crate::model::{Aabb, Part};
use crate::shape::Shape;
use crate::spatial::SpatialIndex;

/// Options governing assembly graph construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyConfig {
    /// Skip candidate pairs whose parts share an identical name. This
    /// governs name identity only, not geometric self-intersection.
    pub no_self_connections: bool,
}

/// Validate raw (name, shape) pairs from the kernel adapter. Parts
/// without a computable, finite bounding box are dropped with a
/// warning; they appear neither in the spatial index nor in the graph.
pub fn valid_parts<S: Shape>(raw: Vec<(String, S)>) -> Vec<Part<S>> {
    let mut parts = Vec::with_capacity(raw.len());
    for (name, shape) in raw {
        match Part::new(name, shape) {
            Ok(part) => parts.push(part),
            Err(name) => {
                tracing::warn!(part = %name, "skipping part: bounding box not computable");
            }
        }
    }
    parts
}

/// Build the undirected part-proximity graph.
///
/// One node per valid part name (duplicates collapse). Candidate pairs
/// come from the spatial index queried with each part's own
/// size-adaptive tolerance; the exact pairwise tolerance is recomputed
/// inside the oracle. `tick` is called once per evaluated candidate
/// pair; returning `false` cancels the build and yields the graph
/// constructed so far.
pub fn build_assembly_graph<S: Shape>(
    parts: &[Part<S>],
    config: &AssemblyConfig,
    tick: &mut dyn FnMut() -> bool,
) -> AssemblyGraph {
    let mut graph = AssemblyGraph::new();

    if parts.is_empty() {
        tracing::warn!("no valid parts; returning empty assembly graph");
        return graph;
    }

    for part in parts {
        graph.add_node(&part.name);
    }

    let boxes: Vec<Aabb> = parts.iter().map(|p| p.bbox).collect();
    let index = SpatialIndex::build(&boxes);

    for (i, part) in parts.iter().enumerate() {
        // The part's own size stands in for the eventual pairwise
        // average when expanding the query box.
        let tolerance = size_adaptive_tolerance(part.characteristic_size());
        let query = part.bbox.expanded(tolerance);

        for j in index.query(&query) {
            if j <= i {
                // Unordered pairs are evaluated once; also drops the
                // part's own index.
                continue;
            }
            if j >= parts.len() {
                continue;
            }

            let other = &parts[j];
            if config.no_self_connections && part.name == other.name {
                continue;
            }

            if are_connected(part, other) {
                graph.add_edge(&part.name, &other.name);
            }
            if !tick() {
                tracing::info!("assembly graph build cancelled");
                return graph;
            }
        }
    }

    graph
}
