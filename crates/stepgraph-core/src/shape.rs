//! The geometry-adapter seam.
//!
//! The graph builders never touch CAD geometry directly; they see an
//! opaque shape handle through this trait, which carries exactly the
//! capability set the core needs: bounding box, minimum distance,
//! vertex enumeration, and containment topology.

use nalgebra::Point3;

use crate::model::Aabb;

/// Opaque shape handle supplied by the CAD-kernel collaborator.
pub trait Shape {
    /// Axis-aligned bounding box, or `None` for degenerate/empty shapes.
    fn bounding_box(&self) -> Option<Aabb>;

    /// Minimum distance between this shape's geometry and another's.
    /// `None` means the computation was inconclusive; callers fall back
    /// to vertex-pair proximity.
    fn distance_to(&self, other: &Self) -> Option<f64>;

    /// All vertex coordinates of the shape. May be empty for abstract
    /// or compound shapes without concrete geometry.
    fn vertices(&self) -> &[Point3<f64>];

    /// Containment structure: shells, their faces, and each face's
    /// edge count. Drives the hierarchical graph builder.
    fn shell_topology(&self) -> Vec<ShellTopo>;
}

/// One shell and the faces it contains.
#[derive(Debug, Clone, Default)]
pub struct ShellTopo {
    pub faces: Vec<FaceTopo>,
}

/// One face and the number of edges bounding it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceTopo {
    pub edge_count: usize,
}
