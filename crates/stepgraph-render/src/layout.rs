//! Force-directed graph layout.
//!
//! A deterministic Fruchterman-Reingold implementation: nodes start on
//! a circle, then repulsion between all pairs and attraction along
//! edges settle them under a cooling schedule. Positions come back
//! normalized to the unit square.

use std::collections::HashMap;

use stepgraph_core::AssemblyGraph;

const ITERATIONS: usize = 120;

/// Compute 2D positions for every node of an assembly graph.
/// Deterministic: the same graph always lays out the same way.
pub fn force_layout(graph: &AssemblyGraph) -> Vec<(String, f64, f64)> {
    let names: Vec<String> = graph.nodes().map(str::to_string).collect();
    let n = names.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![(names[0].clone(), 0.5, 0.5)];
    }

    let index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    let edges: Vec<(usize, usize)> = graph
        .edges()
        .filter_map(|(a, b)| Some((*index.get(a)?, *index.get(b)?)))
        .filter(|(a, b)| a != b)
        .collect();

    // Circle initialization keeps the layout seed-free and stable.
    let mut pos: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            (angle.cos(), angle.sin())
        })
        .collect();

    let area = 4.0;
    let k = (area / n as f64).sqrt();
    let mut temperature = 1.0;
    let cooling = temperature / ITERATIONS as f64;

    let mut disp = vec![(0.0f64, 0.0f64); n];
    for _ in 0..ITERATIONS {
        for d in disp.iter_mut() {
            *d = (0.0, 0.0);
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = pos[i].0 - pos[j].0;
                let dy = pos[i].1 - pos[j].1;
                let dist = (dx * dx + dy * dy).sqrt().max(1e-9);
                let force = k * k / dist;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                disp[i].0 += fx;
                disp[i].1 += fy;
                disp[j].0 -= fx;
                disp[j].1 -= fy;
            }
        }
        for &(a, b) in &edges {
            let dx = pos[a].0 - pos[b].0;
            let dy = pos[a].1 - pos[b].1;
            let dist = (dx * dx + dy * dy).sqrt().max(1e-9);
            let force = dist * dist / k;
            let (fx, fy) = (dx / dist * force, dy / dist * force);
            disp[a].0 -= fx;
            disp[a].1 -= fy;
            disp[b].0 += fx;
            disp[b].1 += fy;
        }
        for i in 0..n {
            let (dx, dy) = disp[i];
            let len = (dx * dx + dy * dy).sqrt().max(1e-9);
            let step = len.min(temperature);
            pos[i].0 += dx / len * step;
            pos[i].1 += dy / len * step;
        }
        temperature = (temperature - cooling).max(1e-3);
    }

    // Normalize into the unit square with a small margin.
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &pos {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let span_x = (max_x - min_x).max(1e-9);
    let span_y = (max_y - min_y).max(1e-9);
    names
        .into_iter()
        .zip(pos)
        .map(|(name, (x, y))| {
            (
                name,
                0.05 + 0.9 * (x - min_x) / span_x,
                0.05 + 0.9 * (y - min_y) / span_y,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_graph() -> AssemblyGraph {
        let mut g = AssemblyGraph::new();
        g.add_edge("A", "B");
        g.add_edge("B", "C");
        g.add_node("Isolated");
        g
    }

    #[test]
    fn layout_is_deterministic() {
        let g = triangle_graph();
        assert_eq!(force_layout(&g), force_layout(&g));
    }

    #[test]
    fn positions_stay_in_unit_square() {
        for (_, x, y) in force_layout(&triangle_graph()) {
            assert!((0.0..=1.0).contains(&x), "x out of range: {x}");
            assert!((0.0..=1.0).contains(&y), "y out of range: {y}");
        }
    }

    #[test]
    fn every_node_gets_a_position() {
        let positions = force_layout(&triangle_graph());
        assert_eq!(positions.len(), 4);
        assert!(positions.iter().any(|(n, _, _)| n == "Isolated"));
    }

    #[test]
    fn connected_nodes_end_up_closer_than_isolated_ones() {
        let positions = force_layout(&triangle_graph());
        let at = |name: &str| {
            positions
                .iter()
                .find(|(n, _, _)| n == name)
                .map(|&(_, x, y)| (x, y))
                .unwrap()
        };
        let dist = |(ax, ay): (f64, f64), (bx, by): (f64, f64)| {
            ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
        };
        let ab = dist(at("A"), at("B"));
        let a_iso = dist(at("A"), at("Isolated"));
        assert!(ab < a_iso, "expected A-B ({ab}) closer than A-Isolated ({a_iso})");
    }

    #[test]
    fn empty_and_single_node_graphs() {
        let empty = AssemblyGraph::new();
        assert!(force_layout(&empty).is_empty());
        let mut single = AssemblyGraph::new();
        single.add_node("Only");
        assert_eq!(force_layout(&single), vec![("Only".to_string(), 0.5, 0.5)]);
    }
}
