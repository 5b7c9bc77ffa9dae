//! GraphML serialization, compatible with the node-and-edge documents
//! other graph tooling expects.

use std::io::Write;

use crate::error::CoreError;
use crate::graph::{AssemblyGraph, HierarchyGraph};

const GRAPHML_HEADER: &str = concat!(
    "<?xml version='1.0' encoding='utf-8'?>\n",
    "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\" ",
    "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" ",
    "xsi:schemaLocation=\"http://graphml.graphdrawing.org/xmlns ",
    "http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd\">\n",
);

/// Write the assembly graph as an undirected GraphML document.
pub fn write_assembly_graphml<W: Write>(graph: &AssemblyGraph, w: &mut W) -> Result<(), CoreError> {
    w.write_all(GRAPHML_HEADER.as_bytes())?;
    writeln!(w, "  <graph edgedefault=\"undirected\">")?;
    for name in graph.nodes() {
        writeln!(w, "    <node id=\"{}\" />", escape(name))?;
    }
    for (a, b) in graph.edges() {
        writeln!(
            w,
            "    <edge source=\"{}\" target=\"{}\" />",
            escape(a),
            escape(b)
        )?;
    }
    writeln!(w, "  </graph>")?;
    writeln!(w, "</graphml>")?;
    Ok(())
}

/// Write the containment graph as a directed GraphML document with
/// `label` and `shape_type` node attributes.
pub fn write_hierarchy_graphml<W: Write>(graph: &HierarchyGraph, w: &mut W) -> Result<(), CoreError> {
    w.write_all(GRAPHML_HEADER.as_bytes())?;
    writeln!(
        w,
        "  <key id=\"d0\" for=\"node\" attr.name=\"label\" attr.type=\"string\" />"
    )?;
    writeln!(
        w,
        "  <key id=\"d1\" for=\"node\" attr.name=\"shape_type\" attr.type=\"string\" />"
    )?;
    writeln!(w, "  <graph edgedefault=\"directed\">")?;
    for node in graph.nodes() {
        let id = escape(&node.id);
        writeln!(w, "    <node id=\"{id}\">")?;
        writeln!(w, "      <data key=\"d0\">{id}</data>")?;
        writeln!(w, "      <data key=\"d1\">{}</data>", node.kind.tag())?;
        writeln!(w, "    </node>")?;
    }
    for (parent, child) in graph.edges() {
        writeln!(
            w,
            "    <edge source=\"{}\" target=\"{}\" />",
            escape(parent),
            escape(child)
        )?;
    }
    writeln!(w, "  </graph>")?;
    writeln!(w, "</graphml>")?;
    Ok(())
}

/// Minimal XML escaping for attribute values and text content.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TopoKind;

    #[test]
    fn assembly_graphml_lists_nodes_and_edges() {
        let mut g = AssemblyGraph::new();
        g.add_node("bolt");
        g.add_node("plate & frame");
        g.add_edge("bolt", "plate & frame");

        let mut buf = Vec::new();
        write_assembly_graphml(&g, &mut buf).unwrap();
        let xml = String::from_utf8(buf).unwrap();

        assert!(xml.contains("edgedefault=\"undirected\""));
        assert!(xml.contains("<node id=\"bolt\" />"));
        assert!(xml.contains("plate &amp; frame"));
        assert!(xml.contains("<edge source="));
    }

    #[test]
    fn hierarchy_graphml_tags_node_kinds() {
        let mut g = HierarchyGraph::new();
        let s = g.add_node("Shell_0".into(), TopoKind::Shell);
        let f = g.add_node("Face_0".into(), TopoKind::Face);
        g.add_edge(s, f);

        let mut buf = Vec::new();
        write_hierarchy_graphml(&g, &mut buf).unwrap();
        let xml = String::from_utf8(buf).unwrap();

        assert!(xml.contains("edgedefault=\"directed\""));
        assert!(xml.contains("<data key=\"d1\">SHELL</data>"));
        assert!(xml.contains("<data key=\"d1\">FACE</data>"));
        assert!(xml.contains("<edge source=\"Shell_0\" target=\"Face_0\" />"));
    }
}
