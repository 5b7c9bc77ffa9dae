//! Hierarchical graph builder: shell → face → edge containment.
//!
//! Purely structural; no tolerance, no spatial reasoning. Node ids are
//! a kind prefix plus a counter scoped to that kind, unique within one
//! run.

use crate::graph::HierarchyGraph;
use crate::model::TopoKind;
use crate::shape::ShellTopo;

/// Build the directed containment tree from the root shape's topology.
pub fn build_hierarchy_graph(shells: &[ShellTopo]) -> HierarchyGraph {
    let mut graph = HierarchyGraph::new();
    let mut face_counter = 0usize;
    let mut edge_counter = 0usize;

    for (shell_counter, shell) in shells.iter().enumerate() {
        let shell_id = format!("{}_{}", TopoKind::Shell.prefix(), shell_counter);
        let shell_node = graph.add_node(shell_id, TopoKind::Shell);

        for face in &shell.faces {
            let face_id = format!("{}_{}", TopoKind::Face.prefix(), face_counter);
            face_counter += 1;
            let face_node = graph.add_node(face_id, TopoKind::Face);
            graph.add_edge(shell_node, face_node);

            for _ in 0..face.edge_count {
                let edge_id = format!("{}_{}", TopoKind::Edge.prefix(), edge_counter);
                edge_counter += 1;
                let edge_node = graph.add_node(edge_id, TopoKind::Edge);
                graph.add_edge(face_node, edge_node);
            }
        }
    }

    graph
}
