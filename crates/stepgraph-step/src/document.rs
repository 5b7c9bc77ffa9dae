//! Extraction of named part shapes from a parsed STEP file.
//!
//! Walks the boundary-representation entity chain
//! (`MANIFOLD_SOLID_BREP` down to `CARTESIAN_POINT`) and reduces each
//! solid to the geometry the graph builders need.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use nalgebra::Point3;
use tracing::{debug, warn};

use stepgraph_core::{Aabb, FaceTopo, Shape, ShellTopo};

use crate::error::StepError;
use crate::syntax::{Entity, EntityMap, Value};

/// Reduced boundary representation of one solid: vertex coordinates,
/// edge segments (index pairs into the vertex list), and the
/// shell/face/edge containment counts.
#[derive(Debug, Clone, Default)]
pub struct BrepShape {
    vertices: Vec<Point3<f64>>,
    segments: Vec<(usize, usize)>,
    shells: Vec<ShellTopo>,
}

impl BrepShape {
    /// Merge several shapes into one, preserving segment indices.
    fn merged<'a, I: IntoIterator<Item = &'a BrepShape>>(shapes: I) -> BrepShape {
        let mut out = BrepShape::default();
        for shape in shapes {
            let base = out.vertices.len();
            out.vertices.extend_from_slice(&shape.vertices);
            out.segments
                .extend(shape.segments.iter().map(|&(a, b)| (base + a, base + b)));
            out.shells.extend(shape.shells.iter().cloned());
        }
        out
    }

    /// Edge segments as index pairs into [`Shape::vertices`].
    pub fn segments(&self) -> &[(usize, usize)] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

impl Shape for BrepShape {
    fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    fn distance_to(&self, other: &Self) -> Option<f64> {
        if self.vertices.is_empty() || other.vertices.is_empty() {
            return None;
        }
        let mut best = f64::INFINITY;
        for a in &self.vertices {
            for b in &other.vertices {
                best = best.min((a - b).norm());
            }
        }
        for &(i, j) in &other.segments {
            let (a, b) = (other.vertices[i], other.vertices[j]);
            for p in &self.vertices {
                best = best.min(point_segment_distance(*p, a, b));
            }
        }
        for &(i, j) in &self.segments {
            let (a, b) = (self.vertices[i], self.vertices[j]);
            for p in &other.vertices {
                best = best.min(point_segment_distance(*p, a, b));
            }
            for &(k, l) in &other.segments {
                best = best.min(segment_segment_distance(
                    a,
                    b,
                    other.vertices[k],
                    other.vertices[l],
                ));
            }
        }
        Some(best)
    }

    fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    fn shell_topology(&self) -> Vec<ShellTopo> {
        self.shells.clone()
    }
}

/// Distance from point `p` to segment `ab`.
fn point_segment_distance(p: Point3<f64>, a: Point3<f64>, b: Point3<f64>) -> f64 {
    let ab = b - a;
    let denom = ab.norm_squared();
    if denom <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / denom).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Minimum distance between segments `p1q1` and `p2q2` via clamped
/// closest-point parameters.
fn segment_segment_distance(
    p1: Point3<f64>,
    q1: Point3<f64>,
    p2: Point3<f64>,
    q2: Point3<f64>,
) -> f64 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let (s, t);
    if a <= f64::EPSILON && e <= f64::EPSILON {
        return r.norm();
    }
    if a <= f64::EPSILON {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(&r);
        if e <= f64::EPSILON {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let s0 = if denom > f64::EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let t0 = (b * s0 + f) / e;
            if t0 < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t0 > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            } else {
                t = t0;
                s = s0;
            }
        }
    }
    ((p1 + d1 * s) - (p2 + d2 * t)).norm()
}

/// A decoded STEP file: its named solids and the merged whole.
#[derive(Debug)]
pub struct StepDocument {
    /// Named part shapes in solid order.
    pub parts: Vec<(String, BrepShape)>,
    /// All solids merged into one shape.
    pub root: BrepShape,
}

impl StepDocument {
    /// Read and decode a STEP file from disk.
    pub fn read(path: &Path) -> Result<Self, StepError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Decode a STEP file already held in memory.
    pub fn parse(text: &str) -> Result<Self, StepError> {
        let map = EntityMap::parse(text)?;
        let names = product_names(&map);

        let mut parts = Vec::new();
        for entity in map.of_kind("MANIFOLD_SOLID_BREP") {
            let shape = extract_solid(&map, entity, "MANIFOLD_SOLID_BREP")?;
            parts.push(shape);
        }
        for entity in map.of_kind("BREP_WITH_VOIDS") {
            let shape = extract_solid(&map, entity, "BREP_WITH_VOIDS")?;
            parts.push(shape);
        }
        if parts.is_empty() {
            return Err(StepError::NoSolids);
        }

        // The first product is the finished assembly itself; the rest
        // name the solids in order. Solids beyond the name list get a
        // synthetic placeholder.
        let part_names: &[String] = if names.is_empty() { &[] } else { &names[1..] };
        let named: Vec<(String, BrepShape)> = parts
            .into_iter()
            .enumerate()
            .map(|(i, shape)| {
                let name = part_names
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("Unnamed_Part_{i}"));
                (name, shape)
            })
            .collect();

        debug!(
            solids = named.len(),
            products = names.len(),
            "decoded STEP document"
        );
        let root = BrepShape::merged(named.iter().map(|(_, s)| s));
        Ok(Self { parts: named, root })
    }
}

/// First string attribute of every PRODUCT record, in id order.
fn product_names(map: &EntityMap) -> Vec<String> {
    map.of_kind("PRODUCT")
        .filter_map(|e| {
            e.args_of("PRODUCT")
                .and_then(|args| args.first())
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect()
}

fn ref_arg(entity: &Entity, kind: &str, index: usize) -> Result<u64, StepError> {
    entity
        .args_of(kind)
        .and_then(|args| args.get(index))
        .and_then(Value::as_ref_id)
        .ok_or_else(|| StepError::type_mismatch(entity.id, format!("{kind} reference argument")))
}

fn list_arg<'a>(entity: &'a Entity, kind: &str, index: usize) -> Result<&'a [Value], StepError> {
    entity
        .args_of(kind)
        .and_then(|args| args.get(index))
        .and_then(Value::as_list)
        .ok_or_else(|| StepError::type_mismatch(entity.id, format!("{kind} aggregate argument")))
}

/// Per-solid extraction state. Vertices are deduplicated by the id of
/// their CARTESIAN_POINT record; segments by the id of their EDGE_CURVE.
struct SolidBuilder<'a> {
    map: &'a EntityMap,
    shape: BrepShape,
    point_index: HashMap<u64, usize>,
    seen_edges: HashSet<u64>,
}

impl<'a> SolidBuilder<'a> {
    fn new(map: &'a EntityMap) -> Self {
        Self {
            map,
            shape: BrepShape::default(),
            point_index: HashMap::new(),
            seen_edges: HashSet::new(),
        }
    }

    fn add_shell(&mut self, shell_id: u64) -> Result<(), StepError> {
        let shell = self.map.require(shell_id)?;
        let kind = if shell.is_kind("CLOSED_SHELL") {
            "CLOSED_SHELL"
        } else if shell.is_kind("OPEN_SHELL") {
            "OPEN_SHELL"
        } else {
            return Err(StepError::type_mismatch(shell_id, "CLOSED_SHELL"));
        };
        let mut topo = ShellTopo::default();
        for face_ref in list_arg(shell, kind, 1)? {
            let face_id = face_ref
                .as_ref_id()
                .ok_or_else(|| StepError::type_mismatch(shell_id, "face reference"))?;
            let edge_count = self.add_face(face_id)?;
            topo.faces.push(FaceTopo { edge_count });
        }
        self.shape.shells.push(topo);
        Ok(())
    }

    /// Processes one face, returning the number of edges bounding it.
    fn add_face(&mut self, face_id: u64) -> Result<usize, StepError> {
        let face = self.map.require(face_id)?;
        let kind = if face.is_kind("ADVANCED_FACE") {
            "ADVANCED_FACE"
        } else if face.is_kind("FACE_SURFACE") {
            "FACE_SURFACE"
        } else {
            return Err(StepError::type_mismatch(face_id, "ADVANCED_FACE"));
        };
        let mut edge_count = 0;
        for bound_ref in list_arg(face, kind, 1)? {
            let bound_id = bound_ref
                .as_ref_id()
                .ok_or_else(|| StepError::type_mismatch(face_id, "face bound reference"))?;
            let bound = self.map.require(bound_id)?;
            let bound_kind = if bound.is_kind("FACE_OUTER_BOUND") {
                "FACE_OUTER_BOUND"
            } else if bound.is_kind("FACE_BOUND") {
                "FACE_BOUND"
            } else {
                return Err(StepError::type_mismatch(bound_id, "FACE_BOUND"));
            };
            let loop_id = ref_arg(bound, bound_kind, 1)?;
            edge_count += self.add_loop(loop_id)?;
        }
        Ok(edge_count)
    }

    /// Processes a bounding loop, returning its edge count.
    fn add_loop(&mut self, loop_id: u64) -> Result<usize, StepError> {
        let entity = self.map.require(loop_id)?;
        if entity.is_kind("EDGE_LOOP") {
            let oriented = list_arg(entity, "EDGE_LOOP", 1)?.to_vec();
            for edge_ref in &oriented {
                let oriented_id = edge_ref
                    .as_ref_id()
                    .ok_or_else(|| StepError::type_mismatch(loop_id, "oriented edge reference"))?;
                let oriented_edge = self.map.require(oriented_id)?;
                let curve_id = ref_arg(oriented_edge, "ORIENTED_EDGE", 3)?;
                self.add_edge_curve(curve_id)?;
            }
            return Ok(oriented.len());
        }
        if entity.is_kind("POLY_LOOP") {
            let points = list_arg(entity, "POLY_LOOP", 1)?.to_vec();
            let indices: Vec<usize> = points
                .iter()
                .map(|p| {
                    let id = p
                        .as_ref_id()
                        .ok_or_else(|| StepError::type_mismatch(loop_id, "polygon point"))?;
                    self.add_point(id)
                })
                .collect::<Result<_, _>>()?;
            for w in 0..indices.len() {
                let next = (w + 1) % indices.len();
                self.shape.segments.push((indices[w], indices[next]));
            }
            return Ok(indices.len());
        }
        if entity.is_kind("VERTEX_LOOP") {
            let vertex_id = ref_arg(entity, "VERTEX_LOOP", 1)?;
            self.add_vertex_point(vertex_id)?;
            return Ok(0);
        }
        Err(StepError::type_mismatch(loop_id, "EDGE_LOOP"))
    }

    fn add_edge_curve(&mut self, curve_id: u64) -> Result<(), StepError> {
        if !self.seen_edges.insert(curve_id) {
            return Ok(());
        }
        let edge = self.map.require(curve_id)?;
        let start_id = ref_arg(edge, "EDGE_CURVE", 1)?;
        let end_id = ref_arg(edge, "EDGE_CURVE", 2)?;
        let a = self.add_vertex_point(start_id)?;
        let b = self.add_vertex_point(end_id)?;
        // A closed edge (circle) has coincident endpoints; the vertex
        // alone represents it, no segment needed.
        if a != b {
            self.shape.segments.push((a, b));
        }
        Ok(())
    }

    fn add_vertex_point(&mut self, vertex_id: u64) -> Result<usize, StepError> {
        let vertex = self.map.require(vertex_id)?;
        let point_id = ref_arg(vertex, "VERTEX_POINT", 1)?;
        self.add_point(point_id)
    }

    fn add_point(&mut self, point_id: u64) -> Result<usize, StepError> {
        if let Some(&index) = self.point_index.get(&point_id) {
            return Ok(index);
        }
        let point = self.map.require(point_id)?;
        let coords = list_arg(point, "CARTESIAN_POINT", 1)?;
        if coords.len() < 3 {
            return Err(StepError::type_mismatch(point_id, "3D CARTESIAN_POINT"));
        }
        let xyz: Vec<f64> = coords
            .iter()
            .take(3)
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| StepError::type_mismatch(point_id, "numeric coordinate"))
            })
            .collect::<Result<_, _>>()?;
        let index = self.shape.vertices.len();
        self.shape.vertices.push(Point3::new(xyz[0], xyz[1], xyz[2]));
        self.point_index.insert(point_id, index);
        Ok(index)
    }
}

fn extract_solid(
    map: &EntityMap,
    entity: &Entity,
    kind: &str,
) -> Result<BrepShape, StepError> {
    let mut builder = SolidBuilder::new(map);
    builder.add_shell(ref_arg(entity, kind, 1)?)?;
    if kind == "BREP_WITH_VOIDS" {
        for void_ref in list_arg(entity, kind, 2)? {
            if let Some(void_id) = void_ref.as_ref_id() {
                let void = map.require(void_id)?;
                // Voids wrap their shell in an ORIENTED_CLOSED_SHELL.
                if void.is_kind("ORIENTED_CLOSED_SHELL") {
                    builder.add_shell(ref_arg(void, "ORIENTED_CLOSED_SHELL", 2)?)?;
                } else {
                    builder.add_shell(void_id)?;
                }
            }
        }
    }
    if builder.shape.vertices.is_empty() {
        warn!(solid = entity.id, "solid has no vertex geometry");
    }
    Ok(builder.shape)
}
