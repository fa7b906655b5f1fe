use tracing::debug;

use crate::context::ToleranceContext;
use crate::error::Result;
use crate::provider::{ensure_supported, AdjacencyProvider, GeometryKind};

/// Edges shared by more than two faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonManifoldReport {
    /// Non-manifold edge indices in ascending order.
    pub edges: Vec<usize>,
    /// Valences, parallel to `edges`.
    pub valences: Vec<usize>,
    /// No edge has more than two faces; meshes also need a manifold fan at
    /// every vertex.
    pub is_manifold: bool,
    /// Largest flagged valence, or 0 when nothing is flagged.
    pub max_valence: usize,
}

/// Detects non-manifold edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonManifoldEdges;

impl NonManifoldEdges {
    /// Creates a new `NonManifoldEdges` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Filters edges with valence above two.
    ///
    /// For meshes the provider's own manifold test (which also looks at
    /// vertex fans) must agree as well.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AnalysisError::UnsupportedGeometryKind`] for
    /// unsupported shapes.
    pub fn execute<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        _ctx: &ToleranceContext,
    ) -> Result<NonManifoldReport> {
        ensure_supported(geometry)?;
        let (edges, valences): (Vec<usize>, Vec<usize>) = (0..geometry.edge_count())
            .map(|e| (e, geometry.edge_valence(e)))
            .filter(|&(_, valence)| valence > 2)
            .unzip();

        let max_valence = valences.iter().copied().max().unwrap_or(0);
        let is_manifold = match geometry.kind() {
            GeometryKind::Mesh => geometry.is_manifold() && edges.is_empty(),
            _ => edges.is_empty(),
        };
        debug!(non_manifold = edges.len(), max_valence, "checked edge valences");
        Ok(NonManifoldReport {
            edges,
            valences,
            is_manifold,
            max_valence,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::brep::MakeBox;
    use crate::math::Point3;
    use crate::mesh::PolyMesh;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn three_triangles_on_one_edge() {
        let mesh = PolyMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(0.5, 1.0, 0.0),
                p(0.5, -1.0, 0.0),
                p(0.5, 0.0, 1.0),
            ],
            vec![vec![0, 1, 2], vec![1, 0, 3], vec![0, 1, 4]],
        )
        .unwrap();
        let report = NonManifoldEdges::new()
            .execute(&mesh, &ToleranceContext::default())
            .unwrap();
        assert_eq!(report.edges, vec![0]);
        assert_eq!(report.valences, vec![3]);
        assert_eq!(report.max_valence, 3);
        assert!(!report.is_manifold);
    }

    #[test]
    fn bowtie_vertex_is_not_manifold_for_meshes() {
        // Two triangles touching at vertex 0 only.
        let mesh = PolyMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(-1.0, 0.0, 0.0),
                p(-1.0, -1.0, 0.0),
            ],
            vec![vec![0, 1, 2], vec![0, 3, 4]],
        )
        .unwrap();
        let report = NonManifoldEdges::new()
            .execute(&mesh, &ToleranceContext::default())
            .unwrap();
        assert!(report.edges.is_empty());
        assert_eq!(report.max_valence, 0);
        assert!(!report.is_manifold);
    }

    #[test]
    fn box_is_manifold() {
        let shape = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute()
            .unwrap();
        let report = NonManifoldEdges::new()
            .execute(&shape, &ToleranceContext::default())
            .unwrap();
        assert!(report.is_manifold);
        assert!(report.edges.is_empty());
    }
}
