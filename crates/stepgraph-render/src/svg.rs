//! Static SVG diagram of an assembly graph.

use std::collections::HashMap;
use std::io::Write;

use stepgraph_core::AssemblyGraph;

use crate::error::RenderError;
use crate::layout::force_layout;

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 900.0;
const NODE_RADIUS: f64 = 14.0;

/// Write the graph as a standalone SVG document.
pub fn write_assembly_svg<W: Write>(w: &mut W, graph: &AssemblyGraph) -> Result<(), RenderError> {
    let positions = force_layout(graph);
    let at: HashMap<&str, (f64, f64)> = positions
        .iter()
        .map(|(name, x, y)| (name.as_str(), (x * WIDTH, y * HEIGHT)))
        .collect();

    writeln!(
        w,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    )?;
    writeln!(w, r#"  <rect width="100%" height="100%" fill="white"/>"#)?;
    for (a, b) in graph.edges() {
        if let (Some(&(ax, ay)), Some(&(bx, by))) = (at.get(a), at.get(b)) {
            writeln!(
                w,
                r##"  <line x1="{ax:.1}" y1="{ay:.1}" x2="{bx:.1}" y2="{by:.1}" stroke="#999" stroke-width="1.5"/>"##
            )?;
        }
    }
    for (name, _, _) in &positions {
        let &(x, y) = &at[name.as_str()];
        writeln!(
            w,
            r##"  <circle cx="{x:.1}" cy="{y:.1}" r="{NODE_RADIUS}" fill="lightblue" stroke="#336" stroke-width="1"/>"##
        )?;
        writeln!(
            w,
            r#"  <text x="{x:.1}" y="{:.1}" font-size="11" text-anchor="middle" font-family="sans-serif">{}</text>"#,
            y - NODE_RADIUS - 4.0,
            escape(name)
        )?;
    }
    writeln!(w, "</svg>")?;
    Ok(())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_contains_nodes_and_edges() {
        let mut g = AssemblyGraph::new();
        g.add_edge("Bolt", "Plate");
        let mut out = Vec::new();
        write_assembly_svg(&mut out, &g).unwrap();
        let svg = String::from_utf8(out).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(">Bolt</text>"));
        assert!(svg.contains(">Plate</text>"));
        assert!(svg.contains("<line"));
    }

    #[test]
    fn node_names_are_escaped() {
        let mut g = AssemblyGraph::new();
        g.add_node("A<B>&C");
        let mut out = Vec::new();
        write_assembly_svg(&mut out, &g).unwrap();
        let svg = String::from_utf8(out).unwrap();
        assert!(svg.contains("A&lt;B&gt;&amp;C"));
    }

    #[test]
    fn empty_graph_is_still_valid_svg() {
        let g = AssemblyGraph::new();
        let mut out = Vec::new();
        write_assembly_svg(&mut out, &g).unwrap();
        let svg = String::from_utf8(out).unwrap();
        assert!(svg.contains("</svg>"));
    }
}
