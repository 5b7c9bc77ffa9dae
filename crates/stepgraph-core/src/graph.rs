//! Graph wrappers over petgraph for the two output graph kinds.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::model::TopoKind;

/// The part-to-part proximity graph. Undirected; one node per part
/// name (duplicate names collapse), no duplicate edges.
#[derive(Debug, Default)]
pub struct AssemblyGraph {
    inner: UnGraph<String, ()>,
    by_name: HashMap<String, NodeIndex>,
}

impl AssemblyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node for `name`, or return the existing one.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.by_name.get(name) {
            return idx;
        }
        let idx = self.inner.add_node(name.to_string());
        self.by_name.insert(name.to_string(), idx);
        idx
    }

    /// Add an undirected edge between two named nodes. Missing nodes
    /// are created; repeated insertions collapse to a single edge.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        let ia = self.add_node(a);
        let ib = self.add_node(b);
        self.inner.update_edge(ia, ib, ());
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        match (self.by_name.get(a), self.by_name.get(b)) {
            (Some(&ia), Some(&ib)) => self.inner.find_edge(ia, ib).is_some(),
            _ => false,
        }
    }

    /// Iterate over node names.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.inner.node_weights().map(String::as_str)
    }

    /// Iterate over edges as (source name, target name) pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.edge_references().map(|e| {
            (
                self.inner[e.source()].as_str(),
                self.inner[e.target()].as_str(),
            )
        })
    }

    /// Degree of a named node; `None` when absent.
    pub fn degree(&self, name: &str) -> Option<usize> {
        let idx = *self.by_name.get(name)?;
        Some(self.inner.edges(idx).count())
    }
}

/// A node in the containment graph: a synthesized identifier plus the
/// structural kind it was discovered as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    pub id: String,
    pub kind: TopoKind,
}

/// The shell → face → edge containment tree.
#[derive(Debug, Default)]
pub struct HierarchyGraph {
    inner: DiGraph<HierarchyNode, ()>,
}

impl HierarchyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: String, kind: TopoKind) -> NodeIndex {
        self.inner.add_node(HierarchyNode { id, kind })
    }

    pub fn add_edge(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.inner.add_edge(parent, child, ());
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.inner.node_weights()
    }

    /// Number of nodes of a given structural kind.
    pub fn count_of(&self, kind: TopoKind) -> usize {
        self.inner.node_weights().filter(|n| n.kind == kind).count()
    }

    /// Iterate over containment edges as (parent id, child id) pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.edge_references().map(|e| {
            (
                self.inner[e.source()].id.as_str(),
                self.inner[e.target()].id.as_str(),
            )
        })
    }
}
