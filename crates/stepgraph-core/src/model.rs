//! Core data structures for assembly processing

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::shape::Shape;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a box from two corners, ordered so min ≤ max on each axis.
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box enclosing all given points. `None` when empty.
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some(Self { min, max })
    }

    /// Diagonal length, the characteristic size used for tolerance scaling.
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }

    /// Box grown by `amount` on all six faces.
    pub fn expanded(&self, amount: f64) -> Self {
        let d = nalgebra::Vector3::new(amount, amount, amount);
        Self {
            min: self.min - d,
            max: self.max + d,
        }
    }

    /// Standard axis-aligned overlap test (all three axes overlap).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// A box is usable only when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.min.coords.iter().all(|c| c.is_finite()) && self.max.coords.iter().all(|c| c.is_finite())
    }
}

/// One named part extracted from an assembly document, with its cached
/// bounding box. The shape handle is owned by the kernel adapter and
/// never mutated here.
#[derive(Debug, Clone)]
pub struct Part<S: Shape> {
    pub name: String,
    pub shape: S,
    pub bbox: Aabb,
}

impl<S: Shape> Part<S> {
    /// Validate a raw (name, shape) pair. The shape must have a
    /// computable, finite bounding box; on rejection the name is handed
    /// back so the caller can report which part was dropped.
    pub fn new(name: String, shape: S) -> Result<Self, String> {
        match shape.bounding_box().filter(Aabb::is_finite) {
            Some(bbox) => Ok(Self { name, shape, bbox }),
            None => Err(name),
        }
    }

    /// Bounding-box diagonal length.
    pub fn characteristic_size(&self) -> f64 {
        self.bbox.diagonal()
    }
}

/// Structural kind of a hierarchical-graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopoKind {
    Shell,
    Face,
    Edge,
}

impl TopoKind {
    /// Tag written into the serialized graph (`shape_type` attribute).
    pub fn tag(self) -> &'static str {
        match self {
            TopoKind::Shell => "SHELL",
            TopoKind::Face => "FACE",
            TopoKind::Edge => "EDGE",
        }
    }

    /// Prefix used when synthesizing node identifiers.
    pub fn prefix(self) -> &'static str {
        match self {
            TopoKind::Shell => "Shell",
            TopoKind::Face => "Face",
            TopoKind::Edge => "Edge",
        }
    }
}
