//! Uniform-grid spatial index over part bounding boxes.
//!
//! Boxes are bucketed into grid cells sized from the average box
//! extent, so a query only inspects the cells its (expanded) box
//! covers instead of every part. Boxes are stored unexpanded; the
//! caller expands its query box by whatever tolerance it wants.

use std::collections::{HashMap, HashSet};

use crate::model::Aabb;

/// Grid cell coordinate.
type Cell = (i64, i64, i64);

/// Read-only box-overlap index, built once per assembly pass.
#[derive(Debug)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: HashMap<Cell, Vec<usize>>,
    boxes: Vec<Aabb>,
}

impl SpatialIndex {
    /// Build the index from the valid parts' bounding boxes, keyed by
    /// position in the slice. An empty slice yields an empty index.
    pub fn build(boxes: &[Aabb]) -> Self {
        let cell_size = Self::pick_cell_size(boxes);
        let mut cells: HashMap<Cell, Vec<usize>> = HashMap::new();

        for (i, bbox) in boxes.iter().enumerate() {
            for cell in Self::covered_cells(bbox, cell_size) {
                cells.entry(cell).or_default().push(i);
            }
        }

        Self {
            cell_size,
            cells,
            boxes: boxes.to_vec(),
        }
    }

    /// Number of indexed boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// All indices whose stored box intersects `query`. The caller is
    /// expected to have already expanded the query box by its
    /// tolerance. Results are sorted and duplicate-free.
    pub fn query(&self, query: &Aabb) -> Vec<usize> {
        if self.boxes.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        for cell in Self::covered_cells(query, self.cell_size) {
            if let Some(indices) = self.cells.get(&cell) {
                for &i in indices {
                    if seen.insert(i) && self.boxes[i].intersects(query) {
                        hits.push(i);
                    }
                }
            }
        }
        hits.sort_unstable();
        hits
    }

    /// Cell edge length: the average box extent across all axes. Falls
    /// back to 1.0 when every box is a point, so coordinates still map
    /// to finite cells.
    fn pick_cell_size(boxes: &[Aabb]) -> f64 {
        if boxes.is_empty() {
            return 1.0;
        }
        let total: f64 = boxes
            .iter()
            .map(|b| {
                let e = b.max - b.min;
                (e.x + e.y + e.z) / 3.0
            })
            .sum();
        let mean = total / boxes.len() as f64;
        if mean > f64::EPSILON {
            mean
        } else {
            1.0
        }
    }

    fn covered_cells(bbox: &Aabb, cell_size: f64) -> impl Iterator<Item = Cell> {
        let lo = (
            (bbox.min.x / cell_size).floor() as i64,
            (bbox.min.y / cell_size).floor() as i64,
            (bbox.min.z / cell_size).floor() as i64,
        );
        let hi = (
            (bbox.max.x / cell_size).floor() as i64,
            (bbox.max.y / cell_size).floor() as i64,
            (bbox.max.z / cell_size).floor() as i64,
        );
        (lo.0..=hi.0).flat_map(move |x| {
            (lo.1..=hi.1).flat_map(move |y| (lo.2..=hi.2).map(move |z| (x, y, z)))
        })
    }
}
