//! The geometry-kernel seam.
//!
//! Every analysis and healing operation is generic over [`AdjacencyProvider`].
//! A provider answers per-entity adjacency queries and exposes the repair and
//! join primitives the healer drives. The crate ships two providers,
//! [`crate::mesh::PolyMesh`] and [`crate::brep::BrepShape`].

mod orient;

pub(crate) use orient::is_orientable;

use std::fmt;

use crate::error::{AnalysisError, Result};
use crate::math::{Aabb, Point3, Vector3};

/// The kind of shape behind a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// A boundary representation with parametric edges and faces.
    Brep,
    /// A polygon mesh.
    Mesh,
    /// Any other shape kind; rejected by every operation.
    Other,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brep => f.write_str("brep"),
            Self::Mesh => f.write_str("mesh"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// Geometric continuity orders, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Continuity {
    /// Positional continuity only.
    C0,
    /// Tangent continuity.
    G1,
    /// Curvature continuity.
    G2,
}

/// Whether a trim loop bounds a face from outside or cuts a hole into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    /// The outer boundary of a face.
    Outer,
    /// An inner boundary (hole) of a face.
    Inner,
}

/// A face trim loop reported by a parametric provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimLoop {
    /// Face that owns the loop.
    pub face: usize,
    /// Outer or inner boundary.
    pub kind: LoopKind,
    /// Total length of the loop's edges.
    pub length: f64,
}

/// Result of a provider's topology self-check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityReport {
    /// One line per problem found; empty when the shape is valid.
    pub problems: Vec<String>,
}

impl ValidityReport {
    /// Returns `true` if no problem was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    /// The problems joined into a single diagnostic line.
    #[must_use]
    pub fn log(&self) -> String {
        self.problems.join("; ")
    }
}

/// Per-edge, per-vertex and per-face topology queries plus the repair and
/// join primitives of a geometry kernel.
///
/// Edge, vertex and face indices are dense in `[0, count)`. Callers check
/// indices before querying; providers may panic on out-of-range indices.
/// Mutating primitives may renumber entities.
pub trait AdjacencyProvider: Sized {
    /// The kind of shape this provider wraps.
    fn kind(&self) -> GeometryKind;

    /// Number of topological edges.
    fn edge_count(&self) -> usize;

    /// Number of topological vertices.
    fn vertex_count(&self) -> usize;

    /// Number of faces.
    fn face_count(&self) -> usize;

    /// Faces using the edge, one entry per use.
    fn edge_adjacent_faces(&self, edge: usize) -> Vec<usize>;

    /// Number of faces using the edge (1 = naked, 2 = interior, >2 = non-manifold).
    fn edge_valence(&self, edge: usize) -> usize {
        self.edge_adjacent_faces(edge).len()
    }

    /// Start and end positions of the edge.
    fn edge_endpoints(&self, edge: usize) -> (Point3, Point3);

    /// Arc length of the edge.
    fn edge_length(&self, edge: usize) -> f64;

    /// The edge curve as a polyline from start to end.
    fn edge_polyline(&self, edge: usize) -> Vec<Point3>;

    /// Tests whether the faces meeting at the edge are continuous to `order`
    /// within `angle_tolerance` (radians).
    ///
    /// Returns `None` when the edge has no parametric description.
    fn edge_continuity(&self, edge: usize, order: Continuity, angle_tolerance: f64)
        -> Option<bool>;

    /// Position of the vertex.
    fn vertex_location(&self, vertex: usize) -> Point3;

    /// Edges incident to the vertex.
    fn vertex_edges(&self, vertex: usize) -> Vec<usize>;

    /// Faces incident to the vertex.
    fn vertex_faces(&self, vertex: usize) -> Vec<usize>;

    /// Faces sharing at least one edge with the face, without duplicates.
    fn face_adjacent_faces(&self, face: usize) -> Vec<usize>;

    /// Oriented unit normal of the face at the point of the face closest to `point`.
    fn face_normal_near(&self, face: usize, point: &Point3) -> Vector3;

    /// Bounding box of the face.
    fn face_bounding_box(&self, face: usize) -> Aabb;

    /// Face trim loops. Shapes without trim loops return an empty list.
    fn trim_loops(&self) -> Vec<TrimLoop> {
        Vec::new()
    }

    /// Makes an independent copy, or `None` if the shape cannot be copied.
    fn duplicate(&self) -> Option<Self>;

    /// Generic repair at `tolerance`. Returns `true` on success.
    fn repair(&mut self, tolerance: f64) -> bool;

    /// Joins naked edges lying within `tolerance` of each other.
    /// Returns the number of edge pairs joined.
    fn join_naked_edges(&mut self, tolerance: f64) -> usize;

    /// Joins two specific naked edges. Returns `true` if they were joined.
    fn join_two_edges(&mut self, first: usize, second: usize, tolerance: f64) -> bool;

    /// Splits the shape into its connected pieces.
    fn connected_components(&self) -> Vec<Self>;

    /// Merges shapes and joins their naked edges at `tolerance`, returning
    /// the resulting connected pieces.
    fn join_shapes(shapes: Vec<Self>, tolerance: f64) -> Vec<Self>;

    /// Checks the shape's topology for internal consistency.
    fn validity(&self) -> ValidityReport;

    /// Closed, manifold and orientable.
    fn is_solid(&self) -> bool;

    /// The provider's own manifold test.
    fn is_manifold(&self) -> bool;

    /// Whether a consistent face orientation exists.
    fn is_orientable(&self) -> bool;

    /// Number of naked (valence 1) edges.
    fn naked_edge_count(&self) -> usize {
        (0..self.edge_count())
            .filter(|&e| self.edge_valence(e) == 1)
            .count()
    }
}

/// Rejects geometry kinds no operation can analyze.
///
/// # Errors
///
/// Returns [`AnalysisError::UnsupportedGeometryKind`] for [`GeometryKind::Other`].
pub fn ensure_supported<P: AdjacencyProvider>(geometry: &P) -> Result<()> {
    match geometry.kind() {
        GeometryKind::Brep | GeometryKind::Mesh => Ok(()),
        kind @ GeometryKind::Other => Err(AnalysisError::UnsupportedGeometryKind {
            kind: kind.to_string(),
        }
        .into()),
    }
}

/// Checks that `index` addresses one of `bound` entities.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidIndex`] when `index >= bound`.
pub fn check_index(entity: &'static str, index: usize, bound: usize) -> Result<()> {
    if index < bound {
        Ok(())
    } else {
        Err(AnalysisError::InvalidIndex {
            entity,
            index,
            bound,
        }
        .into())
    }
}

/// Fails with [`AnalysisError::DiagnosisPreconditionFailed`] unless the
/// provider reports valid topology.
///
/// # Errors
///
/// Returns the precondition error carrying the provider's validity log.
pub fn require_valid<P: AdjacencyProvider>(geometry: &P, stage: &'static str) -> Result<()> {
    let report = geometry.validity();
    if report.is_valid() {
        Ok(())
    } else {
        Err(AnalysisError::DiagnosisPreconditionFailed {
            stage,
            reason: report.log(),
        }
        .into())
    }
}
