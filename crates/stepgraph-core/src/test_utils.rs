//! Fixture shapes with analytic geometry for unit tests.

use nalgebra::Point3;

use crate::model::Aabb;
use crate::shape::{FaceTopo, Shape, ShellTopo};

/// A synthetic shape: an axis-aligned box with corner vertices and an
/// exact box-to-box minimum distance. Individual capabilities can be
/// disabled or overridden to exercise the oracle's branches.
#[derive(Debug, Clone)]
pub struct FixtureShape {
    bbox: Option<Aabb>,
    vertices: Vec<Point3<f64>>,
    forced_distance: Option<f64>,
    inconclusive: bool,
    shells: Vec<ShellTopo>,
}

impl FixtureShape {
    /// Box spanning `min`..`max` with its 8 corners as vertices.
    pub fn cuboid(min: [f64; 3], max: [f64; 3]) -> Self {
        let lo = Point3::new(min[0], min[1], min[2]);
        let hi = Point3::new(max[0], max[1], max[2]);
        let mut vertices = Vec::with_capacity(8);
        for &x in &[lo.x, hi.x] {
            for &y in &[lo.y, hi.y] {
                for &z in &[lo.z, hi.z] {
                    vertices.push(Point3::new(x, y, z));
                }
            }
        }
        Self {
            bbox: Some(Aabb::new(lo, hi)),
            vertices,
            forced_distance: None,
            inconclusive: false,
            shells: vec![ShellTopo {
                faces: vec![FaceTopo { edge_count: 4 }; 6],
            }],
        }
    }

    /// Shape whose bounding box cannot be computed.
    pub fn degenerate() -> Self {
        Self {
            bbox: None,
            vertices: Vec::new(),
            forced_distance: None,
            inconclusive: false,
            shells: Vec::new(),
        }
    }

    /// Drop all vertices (abstract/compound shape without geometry).
    pub fn without_vertices(mut self) -> Self {
        self.vertices.clear();
        self
    }

    /// Force the primary distance computation to report this value.
    pub fn with_forced_distance(mut self, d: f64) -> Self {
        self.forced_distance = Some(d);
        self
    }

    /// Make the primary distance computation inconclusive.
    pub fn inconclusive_distance(mut self) -> Self {
        self.inconclusive = true;
        self
    }

    pub fn with_topology(mut self, shells: Vec<ShellTopo>) -> Self {
        self.shells = shells;
        self
    }
}

impl Shape for FixtureShape {
    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn distance_to(&self, other: &Self) -> Option<f64> {
        if self.inconclusive || other.inconclusive {
            return None;
        }
        if let Some(d) = self.forced_distance.or(other.forced_distance) {
            return Some(d);
        }
        let (a, b) = (self.bbox?, other.bbox?);
        let gap = |lo1: f64, hi1: f64, lo2: f64, hi2: f64| (lo1 - hi2).max(lo2 - hi1).max(0.0);
        let dx = gap(a.min.x, a.max.x, b.min.x, b.max.x);
        let dy = gap(a.min.y, a.max.y, b.min.y, b.max.y);
        let dz = gap(a.min.z, a.max.z, b.min.z, b.max.z);
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }

    fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    fn shell_topology(&self) -> Vec<ShellTopo> {
        self.shells.clone()
    }
}
