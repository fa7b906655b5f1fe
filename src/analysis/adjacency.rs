use crate::context::ToleranceContext;
use crate::error::Result;
use crate::math::{angle_between, Vector3, TOLERANCE};
use crate::provider::{check_index, ensure_supported, AdjacencyProvider};

/// Faces around a single edge.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyReport {
    /// The queried edge.
    pub edge: usize,
    /// Adjacent faces, one entry per use.
    pub faces: Vec<usize>,
    /// Face normals at the edge midpoint, parallel to `faces`.
    pub normals: Vec<Vector3>,
    /// Angle between the two face normals in radians; 0 unless exactly two
    /// non-degenerate faces meet at the edge.
    pub dihedral_angle: f64,
    /// Exactly two faces use the edge.
    pub is_manifold: bool,
    /// Exactly one face uses the edge.
    pub is_boundary: bool,
}

/// Angle between the normals of the two faces meeting at `edge`, measured at
/// the edge midpoint. `None` unless the edge has exactly two uses and both
/// faces have a normal there.
pub(crate) fn dihedral_angle<P: AdjacencyProvider>(geometry: &P, edge: usize) -> Option<f64> {
    let faces = geometry.edge_adjacent_faces(edge);
    let [f1, f2] = faces[..] else {
        return None;
    };
    let (a, b) = geometry.edge_endpoints(edge);
    let mid = nalgebra::center(&a, &b);
    let n1 = geometry.face_normal_near(f1, &mid);
    let n2 = geometry.face_normal_near(f2, &mid);
    // Degenerate faces report a zero normal.
    if n1.norm() < TOLERANCE || n2.norm() < TOLERANCE {
        return None;
    }
    Some(angle_between(&n1, &n2))
}

/// Queries the faces around one edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeAdjacency {
    edge: usize,
}

impl EdgeAdjacency {
    /// Creates a new `EdgeAdjacency` query for `edge`.
    #[must_use]
    pub fn new(edge: usize) -> Self {
        Self { edge }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AnalysisError::InvalidIndex`] if the edge is
    /// outside `[0, edge_count)`.
    pub fn execute<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        _ctx: &ToleranceContext,
    ) -> Result<AdjacencyReport> {
        ensure_supported(geometry)?;
        check_index("edge", self.edge, geometry.edge_count())?;

        let faces = geometry.edge_adjacent_faces(self.edge);
        let (a, b) = geometry.edge_endpoints(self.edge);
        let mid = nalgebra::center(&a, &b);
        let normals = faces
            .iter()
            .map(|&f| geometry.face_normal_near(f, &mid))
            .collect();

        Ok(AdjacencyReport {
            edge: self.edge,
            dihedral_angle: dihedral_angle(geometry, self.edge).unwrap_or(0.0),
            is_manifold: faces.len() == 2,
            is_boundary: faces.len() == 1,
            faces,
            normals,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;
    use crate::error::{AnalysisError, TopoHealError};
    use crate::math::Point3;
    use crate::mesh::PolyMesh;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Two unit squares folded 90° along the x axis.
    fn folded() -> PolyMesh {
        PolyMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(1.0, 0.0, 1.0),
                p(0.0, 0.0, 1.0),
            ],
            vec![vec![0, 1, 2, 3], vec![1, 0, 5, 4]],
        )
        .unwrap()
    }

    #[test]
    fn fold_edge_is_right_angle() {
        let report = EdgeAdjacency::new(0)
            .execute(&folded(), &ToleranceContext::default())
            .unwrap();
        assert_eq!(report.faces, vec![0, 1]);
        assert_eq!(report.normals.len(), 2);
        assert_relative_eq!(report.dihedral_angle, FRAC_PI_2, epsilon = 1e-12);
        assert!(report.is_manifold);
        assert!(!report.is_boundary);
    }

    #[test]
    fn boundary_edge_has_zero_angle() {
        let report = EdgeAdjacency::new(1)
            .execute(&folded(), &ToleranceContext::default())
            .unwrap();
        assert!(report.is_boundary);
        assert!(!report.is_manifold);
        assert_relative_eq!(report.dihedral_angle, 0.0);
    }

    #[test]
    fn sliver_neighbour_has_no_dihedral_angle() {
        let mesh = PolyMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(2.0, 0.0, 0.0)],
            vec![vec![0, 1, 2], vec![1, 0, 3]],
        )
        .unwrap();
        assert_eq!(dihedral_angle(&mesh, 0), None);
        let report = EdgeAdjacency::new(0)
            .execute(&mesh, &ToleranceContext::default())
            .unwrap();
        assert!(report.is_manifold);
        assert_relative_eq!(report.dihedral_angle, 0.0);
    }

    #[test]
    fn out_of_range_edge_is_rejected() {
        let mesh = folded();
        let err = EdgeAdjacency::new(mesh.edge_count())
            .execute(&mesh, &ToleranceContext::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TopoHealError::Analysis(AnalysisError::InvalidIndex { index: 7, bound: 7, .. })
        ));
    }
}
