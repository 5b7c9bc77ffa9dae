//! Interactive HTML view of an assembly graph.
//!
//! The viewer page is embedded at compile time; the graph data is
//! inlined into it as JSON. Nodes show their part image when an image
//! directory is supplied and the file exists, a plain dot otherwise.

use std::io::Write;
use std::path::Path;

use rust_embed::RustEmbed;
use serde::Serialize;

use stepgraph_core::AssemblyGraph;

use crate::error::RenderError;

#[derive(RustEmbed)]
#[folder = "assets"]
struct ViewerAssets;

const DATA_PLACEHOLDER: &str = "/*GRAPH_DATA*/null";

#[derive(Serialize)]
struct ViewerNode {
    id: String,
    label: String,
    shape: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    size: u32,
}

#[derive(Serialize)]
struct ViewerEdge {
    from: String,
    to: String,
}

#[derive(Serialize)]
struct ViewerData {
    nodes: Vec<ViewerNode>,
    edges: Vec<ViewerEdge>,
}

/// Write the interactive viewer page for a graph. When `images_dir` is
/// given, nodes whose `<name>.png` exists there are drawn as images
/// (referenced relative to the output file's directory).
pub fn write_assembly_html<W: Write>(
    w: &mut W,
    graph: &AssemblyGraph,
    images_dir: Option<&Path>,
) -> Result<(), RenderError> {
    let nodes = graph
        .nodes()
        .map(|name| {
            let image = images_dir.and_then(|dir| {
                let file = dir.join(format!("{name}.png"));
                if !file.exists() {
                    return None;
                }
                let folder = dir.file_name()?.to_str()?;
                Some(format!("{folder}/{name}.png"))
            });
            ViewerNode {
                id: name.to_string(),
                label: name.to_string(),
                shape: if image.is_some() { "image" } else { "dot" },
                image,
                size: 30,
            }
        })
        .collect();
    let edges = graph
        .edges()
        .map(|(a, b)| ViewerEdge {
            from: a.to_string(),
            to: b.to_string(),
        })
        .collect();

    let data = serde_json::to_string(&ViewerData { nodes, edges })?;
    let template = ViewerAssets::get("viewer.html").ok_or(RenderError::MissingTemplate)?;
    let page = String::from_utf8_lossy(&template.data).replace(DATA_PLACEHOLDER, &data);
    w.write_all(page.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_embedded() {
        assert!(ViewerAssets::get("viewer.html").is_some());
    }

    #[test]
    fn html_inlines_graph_data() {
        let mut g = AssemblyGraph::new();
        g.add_edge("Bolt", "Plate");
        let mut out = Vec::new();
        write_assembly_html(&mut out, &g, None).unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains(r#""id":"Bolt""#));
        assert!(html.contains(r#""from":"Bolt""#));
        assert!(!html.contains(DATA_PLACEHOLDER));
    }

    #[test]
    fn nodes_reference_existing_images() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        std::fs::create_dir(&images).unwrap();
        std::fs::write(images.join("Bolt.png"), b"png").unwrap();

        let mut g = AssemblyGraph::new();
        g.add_edge("Bolt", "Plate");
        let mut out = Vec::new();
        write_assembly_html(&mut out, &g, Some(&images)).unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains(r#""image":"images/Bolt.png""#));
        assert!(html.contains(r#""shape":"dot""#)); // Plate has no image
    }
}
