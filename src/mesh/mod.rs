//! Indexed polygon meshes.

mod repair;
mod topology;

use tracing::debug;

use crate::analysis::components::label_components;
use crate::error::{AnalysisError, GeometryError, Result};
use crate::math::{newell_normal, Aabb, Point3, Vector3};
use crate::provider::{self, AdjacencyProvider, Continuity, GeometryKind, ValidityReport};

use topology::MeshTopology;

/// A polygon mesh: shared vertex positions plus faces as vertex index loops.
///
/// The edge table is derived from the faces and rebuilt after every
/// mutation, so edge indices are only stable between mutations.
#[derive(Debug, Clone)]
pub struct PolyMesh {
    vertices: Vec<Point3>,
    faces: Vec<Vec<u32>>,
    topology: MeshTopology,
}

impl PolyMesh {
    /// Creates a mesh from vertex positions and faces.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidIndex`] if a face references a vertex
    /// that does not exist, or [`GeometryError::Degenerate`] if a face has
    /// fewer than three vertices.
    pub fn new(vertices: Vec<Point3>, faces: Vec<Vec<u32>>) -> Result<Self> {
        for (f, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(GeometryError::Degenerate(format!(
                    "face {f} has {} vertices",
                    face.len()
                ))
                .into());
            }
            for &v in face {
                provider::check_index("vertex", v as usize, vertices.len())?;
            }
        }
        Ok(Self::from_parts(vertices, faces))
    }

    /// Builds a mesh whose face indices are already known to be in range.
    fn from_parts(vertices: Vec<Point3>, faces: Vec<Vec<u32>>) -> Self {
        let topology = MeshTopology::build(vertices.len(), &faces);
        Self {
            vertices,
            faces,
            topology,
        }
    }

    /// Vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Faces as vertex index loops.
    #[must_use]
    pub fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    /// Vertex indices of `edge`, smaller index first.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidIndex`] if the edge does not exist.
    pub fn edge_vertices(&self, edge: usize) -> Result<(u32, u32)> {
        self.topology.edges.get(edge).copied().ok_or_else(|| {
            AnalysisError::InvalidIndex {
                entity: "edge",
                index: edge,
                bound: self.topology.edges.len(),
            }
            .into()
        })
    }

    fn rebuild(&mut self) {
        self.topology = MeshTopology::build(self.vertices.len(), &self.faces);
    }

    fn face_points(&self, face: usize) -> Vec<Point3> {
        self.faces[face]
            .iter()
            .map(|&v| self.vertices[v as usize])
            .collect()
    }

    fn boundary_vertex_flags(&self) -> Vec<bool> {
        let mut flags = vec![false; self.vertices.len()];
        for (edge, &(a, b)) in self.topology.edges.iter().enumerate() {
            if self.topology.valence(edge) == 1 {
                flags[a as usize] = true;
                flags[b as usize] = true;
            }
        }
        flags
    }

    /// Replaces vertex `from` by `to` in every face.
    fn redirect_vertex(&mut self, from: u32, to: u32) {
        if from == to {
            return;
        }
        for face in &mut self.faces {
            for v in face.iter_mut() {
                if *v == from {
                    *v = to;
                }
            }
        }
    }
}

impl AdjacencyProvider for PolyMesh {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Mesh
    }

    fn edge_count(&self) -> usize {
        self.topology.edges.len()
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn edge_adjacent_faces(&self, edge: usize) -> Vec<usize> {
        self.topology.edge_faces(edge)
    }

    fn edge_valence(&self, edge: usize) -> usize {
        self.topology.valence(edge)
    }

    fn edge_endpoints(&self, edge: usize) -> (Point3, Point3) {
        let (a, b) = self.topology.edges[edge];
        (self.vertices[a as usize], self.vertices[b as usize])
    }

    fn edge_length(&self, edge: usize) -> f64 {
        let (a, b) = self.edge_endpoints(edge);
        (b - a).norm()
    }

    fn edge_polyline(&self, edge: usize) -> Vec<Point3> {
        let (a, b) = self.edge_endpoints(edge);
        vec![a, b]
    }

    fn edge_continuity(&self, _edge: usize, _order: Continuity, _angle: f64) -> Option<bool> {
        None
    }

    fn vertex_location(&self, vertex: usize) -> Point3 {
        self.vertices[vertex]
    }

    fn vertex_edges(&self, vertex: usize) -> Vec<usize> {
        self.topology.vertex_edges[vertex].clone()
    }

    fn vertex_faces(&self, vertex: usize) -> Vec<usize> {
        self.topology.vertex_faces[vertex].clone()
    }

    fn face_adjacent_faces(&self, face: usize) -> Vec<usize> {
        self.topology.face_neighbors(face)
    }

    fn face_normal_near(&self, face: usize, _point: &Point3) -> Vector3 {
        newell_normal(&self.face_points(face)).unwrap_or_else(Vector3::zeros)
    }

    fn face_bounding_box(&self, face: usize) -> Aabb {
        Aabb::from_points(&self.face_points(face))
    }

    fn duplicate(&self) -> Option<Self> {
        Some(self.clone())
    }

    fn repair(&mut self, tolerance: f64) -> bool {
        let welded = repair::weld_vertices(self, tolerance, None);
        let degenerate = repair::remove_degenerate_faces(self);
        let duplicates = repair::remove_duplicate_faces(self);
        let unreferenced = repair::remove_unreferenced_vertices(self);
        self.rebuild();
        debug!(welded, degenerate, duplicates, unreferenced, "repaired mesh");
        self.validity().is_valid()
    }

    fn join_naked_edges(&mut self, tolerance: f64) -> usize {
        let before = self.naked_edge_count();
        let eligible = self.boundary_vertex_flags();
        if repair::weld_vertices(self, tolerance, Some(&eligible)) == 0 {
            return 0;
        }
        self.rebuild();
        let after = self.naked_edge_count();
        before.saturating_sub(after) / 2
    }

    fn join_two_edges(&mut self, first: usize, second: usize, tolerance: f64) -> bool {
        let count = self.edge_count();
        if first == second || first >= count || second >= count {
            return false;
        }
        if self.topology.valence(first) != 1 || self.topology.valence(second) != 1 {
            return false;
        }
        let (a0, a1) = self.topology.edges[first];
        let (b0, b1) = self.topology.edges[second];
        let close = |x: u32, y: u32| {
            (self.vertices[x as usize] - self.vertices[y as usize]).norm() <= tolerance
        };
        let pairs = if close(a0, b0) && close(a1, b1) {
            [(b0, a0), (b1, a1)]
        } else if close(a0, b1) && close(a1, b0) {
            [(b1, a0), (b0, a1)]
        } else {
            return false;
        };
        for (from, to) in pairs {
            self.redirect_vertex(from, to);
        }
        self.rebuild();
        true
    }

    fn connected_components(&self) -> Vec<Self> {
        label_components(self.face_count(), |f| self.topology.face_neighbors(f))
            .iter()
            .map(|faces| repair::extract_faces(self, faces))
            .collect()
    }

    fn join_shapes(shapes: Vec<Self>, tolerance: f64) -> Vec<Self> {
        let mut merged = repair::concatenate(shapes);
        let joined = merged.join_naked_edges(tolerance);
        debug!(joined, "joined mesh pieces");
        merged.connected_components()
    }

    fn validity(&self) -> ValidityReport {
        let mut problems = Vec::new();
        if self.faces.is_empty() {
            problems.push("mesh has no faces".to_string());
        }
        for (f, face) in self.faces.iter().enumerate() {
            if face.iter().any(|&v| v as usize >= self.vertices.len()) {
                problems.push(format!("face {f} references a missing vertex"));
                continue;
            }
            let mut distinct = face.clone();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() < face.len() || distinct.len() < 3 {
                problems.push(format!("face {f} repeats a vertex"));
            } else if newell_normal(&self.face_points(f)).is_none() {
                problems.push(format!("face {f} has zero area"));
            }
        }
        ValidityReport { problems }
    }

    fn is_solid(&self) -> bool {
        !self.faces.is_empty()
            && self.naked_edge_count() == 0
            && self.is_manifold()
            && self.is_orientable()
    }

    fn is_manifold(&self) -> bool {
        (0..self.edge_count()).all(|e| self.topology.valence(e) <= 2)
            && self.topology.vertices_are_manifold()
    }

    fn is_orientable(&self) -> bool {
        provider::is_orientable(self.faces.len(), &self.topology.edge_uses)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::TopoHealError;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn quad() -> PolyMesh {
        PolyMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![vec![0, 1, 2, 3]],
        )
        .unwrap()
    }

    /// Two unit squares side by side with the shared seam split by `gap`.
    fn split_strip(gap: f64) -> PolyMesh {
        PolyMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(1.0 + gap, 0.0, 0.0),
                p(2.0, 0.0, 0.0),
                p(2.0, 1.0, 0.0),
                p(1.0 + gap, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_out_of_range_vertex() {
        let err = PolyMesh::new(vec![p(0.0, 0.0, 0.0)], vec![vec![0, 1, 2]]);
        assert!(matches!(
            err,
            Err(TopoHealError::Analysis(AnalysisError::InvalidIndex { index: 1, bound: 1, .. }))
        ));
    }

    #[test]
    fn new_rejects_two_vertex_face() {
        let err = PolyMesh::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)], vec![vec![0, 1]]);
        assert!(matches!(err, Err(TopoHealError::Geometry(_))));
    }

    #[test]
    fn single_quad_is_open_and_valid() {
        let mesh = quad();
        assert_eq!(mesh.edge_count(), 4);
        assert_eq!(mesh.naked_edge_count(), 4);
        assert!(mesh.validity().is_valid());
        assert!(!mesh.is_solid());
        assert!(mesh.is_manifold());
    }

    #[test]
    fn face_normal_follows_winding() {
        let n = quad().face_normal_near(0, &p(0.5, 0.5, 0.0));
        assert!((n.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn join_naked_edges_closes_small_seam() {
        let mut mesh = split_strip(0.0005);
        assert_eq!(mesh.naked_edge_count(), 8);
        assert_eq!(mesh.join_naked_edges(0.001), 1);
        assert_eq!(mesh.naked_edge_count(), 6);
        assert_eq!(mesh.connected_components().len(), 1);
    }

    #[test]
    fn join_naked_edges_ignores_wide_seam() {
        let mut mesh = split_strip(0.05);
        assert_eq!(mesh.join_naked_edges(0.001), 0);
        assert_eq!(mesh.naked_edge_count(), 8);
    }

    #[test]
    fn join_two_edges_snaps_matching_pair() {
        let mut mesh = split_strip(0.05);
        let seam_a = (0..mesh.edge_count())
            .find(|&e| mesh.edge_vertices(e).unwrap() == (1, 2))
            .unwrap();
        let seam_b = (0..mesh.edge_count())
            .find(|&e| mesh.edge_vertices(e).unwrap() == (4, 7))
            .unwrap();
        assert!(!mesh.join_two_edges(seam_a, seam_b, 0.01));
        assert!(mesh.join_two_edges(seam_a, seam_b, 0.1));
        assert_eq!(mesh.naked_edge_count(), 6);
    }

    #[test]
    fn components_split_and_rejoin() {
        let mesh = split_strip(0.0005);
        let pieces = mesh.connected_components();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].vertex_count(), 4);

        let joined = PolyMesh::join_shapes(pieces, 0.001);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].face_count(), 2);
    }

    #[test]
    fn repair_drops_degenerate_face() {
        let mut mesh = PolyMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![vec![0, 1, 2], vec![0, 1, 1]],
        )
        .unwrap();
        assert!(!mesh.validity().is_valid());
        assert!(mesh.repair(1e-6));
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn closed_tetrahedron_is_solid() {
        let mesh = PolyMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)],
            vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![0, 3, 2]],
        )
        .unwrap();
        assert!(mesh.is_solid());
        assert!(mesh.is_orientable());
    }
}
