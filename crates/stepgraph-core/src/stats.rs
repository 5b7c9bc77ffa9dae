//! Per-file statistics document.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::graph::{AssemblyGraph, HierarchyGraph};
use crate::model::{Part, TopoKind};
use crate::shape::Shape;

/// Counts summarizing one file's graphs, serialized as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub parts_total: usize,
    pub parts_named: usize,
    pub parts_unnamed: usize,
    pub assembly_nodes: usize,
    pub assembly_edges: usize,
    pub shells: usize,
    pub faces: usize,
    pub edges: usize,
}

impl GraphStats {
    /// Gather counts from the validated parts and whichever graphs
    /// were built for this file.
    pub fn gather<S: Shape>(
        parts: &[Part<S>],
        assembly: Option<&AssemblyGraph>,
        hierarchy: Option<&HierarchyGraph>,
    ) -> Self {
        let parts_unnamed = parts.iter().filter(|p| is_unnamed(&p.name)).count();
        let mut stats = Self {
            parts_total: parts.len(),
            parts_named: parts.len() - parts_unnamed,
            parts_unnamed,
            ..Self::default()
        };
        if let Some(g) = assembly {
            stats.assembly_nodes = g.node_count();
            stats.assembly_edges = g.edge_count();
        }
        if let Some(g) = hierarchy {
            stats.shells = g.count_of(TopoKind::Shell);
            stats.faces = g.count_of(TopoKind::Face);
            stats.edges = g.count_of(TopoKind::Edge);
        }
        stats
    }

    /// Write the counts as a pretty-printed JSON document.
    pub fn write_json<W: Write>(&self, w: W) -> Result<(), CoreError> {
        serde_json::to_writer_pretty(w, self)?;
        Ok(())
    }
}

/// A part counts as unnamed when the document carried no label for it
/// and the reader synthesized a placeholder.
fn is_unnamed(name: &str) -> bool {
    name.is_empty() || name.starts_with("Unnamed_Part_")
}
