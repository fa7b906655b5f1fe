use tracing::{debug, warn};

use crate::context::ToleranceContext;
use crate::error::{GeometryError, Result};
use crate::math::polyline::join_polylines;
use crate::math::Point3;
use crate::provider::{ensure_supported, AdjacencyProvider};

/// The naked (valence 1) edges of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NakedEdgeReport {
    /// Naked edge indices in ascending order.
    pub edges: Vec<usize>,
    /// Edge curves as polylines, parallel to `edges`.
    pub curves: Vec<Vec<Point3>>,
    /// Edge valences, parallel to `edges`. Always 1.
    pub valences: Vec<usize>,
    /// Sum of the naked edge lengths.
    pub total_length: f64,
}

impl NakedEdgeReport {
    /// Number of naked edges.
    #[must_use]
    pub fn count(&self) -> usize {
        self.edges.len()
    }
}

/// Collects the naked edges of a shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct NakedEdges;

impl NakedEdges {
    /// Creates a new `NakedEdges` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Filters edges with valence 1. A closed shape yields an empty report.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AnalysisError::UnsupportedGeometryKind`] for
    /// unsupported shapes.
    pub fn execute<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        _ctx: &ToleranceContext,
    ) -> Result<NakedEdgeReport> {
        ensure_supported(geometry)?;
        let mut report = NakedEdgeReport {
            edges: Vec::new(),
            curves: Vec::new(),
            valences: Vec::new(),
            total_length: 0.0,
        };
        for edge in 0..geometry.edge_count() {
            let valence = geometry.edge_valence(edge);
            if valence != 1 {
                continue;
            }
            report.edges.push(edge);
            report.curves.push(geometry.edge_polyline(edge));
            report.valences.push(valence);
            report.total_length += geometry.edge_length(edge);
        }
        debug!(naked = report.count(), "collected naked edges");
        Ok(report)
    }
}

/// A chain of naked edges joined end to end.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLoop {
    /// Position of the loop in the report.
    pub index: usize,
    /// Member naked edges in chain order.
    pub edges: Vec<usize>,
    /// The joined polyline in traversal order.
    pub points: Vec<Point3>,
    /// Whether the chain returns to its start within tolerance.
    pub closed: bool,
    /// Length of the joined polyline.
    pub length: f64,
}

/// Boundary loops plus join diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLoopReport {
    /// Joined chains, closed and open.
    pub loops: Vec<BoundaryLoop>,
    /// Number of naked edges fed to the join.
    pub naked_edge_count: usize,
    /// Naked edges absorbed into closed loops.
    pub joined_count: usize,
    /// `naked_edge_count - joined_count`. Diagnostic only.
    pub failed_joins: usize,
    /// The join tolerance actually used.
    pub tolerance: f64,
}

/// Joins naked edges into boundary loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryLoops {
    tolerance: Option<f64>,
}

impl BoundaryLoops {
    /// Creates a query that joins at the context's absolute tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self { tolerance: None }
    }

    /// Overrides the join tolerance. `None` falls back to the context.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Joins the naked edge curves.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] for a non-positive override
    /// and [`crate::error::AnalysisError::UnsupportedGeometryKind`] for
    /// unsupported shapes.
    pub fn execute<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        ctx: &ToleranceContext,
    ) -> Result<BoundaryLoopReport> {
        let tolerance = self.tolerance.unwrap_or(ctx.absolute_tolerance());
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(GeometryError::InvalidTolerance(tolerance).into());
        }
        let naked = NakedEdges::new().execute(geometry, ctx)?;

        let loops: Vec<BoundaryLoop> = join_polylines(&naked.curves, tolerance)
            .into_iter()
            .enumerate()
            .map(|(index, curve)| BoundaryLoop {
                index,
                edges: curve.members.iter().map(|&m| naked.edges[m]).collect(),
                length: curve.length(),
                closed: curve.closed,
                points: curve.points,
            })
            .collect();

        let joined_count: usize = loops
            .iter()
            .filter(|l| l.closed)
            .map(|l| l.edges.len())
            .sum();
        let failed_joins = naked.count() - joined_count;
        if failed_joins > 0 {
            warn!(failed_joins, tolerance, "naked edges left in open chains");
        }
        debug!(loops = loops.len(), joined_count, "joined boundary loops");

        Ok(BoundaryLoopReport {
            loops,
            naked_edge_count: naked.count(),
            joined_count,
            failed_joins,
            tolerance,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::mesh::PolyMesh;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn quad() -> PolyMesh {
        PolyMesh::new(
            vec![p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 1.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![vec![0, 1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn quad_has_four_naked_edges() {
        let report = NakedEdges::new()
            .execute(&quad(), &ToleranceContext::default())
            .unwrap();
        assert_eq!(report.edges, vec![0, 1, 2, 3]);
        assert!(report.valences.iter().all(|&v| v == 1));
        assert_relative_eq!(report.total_length, 6.0);
    }

    #[test]
    fn closed_mesh_reports_nothing() {
        let tetra = PolyMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)],
            vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![0, 3, 2]],
        )
        .unwrap();
        let report = NakedEdges::new()
            .execute(&tetra, &ToleranceContext::default())
            .unwrap();
        assert_eq!(report.count(), 0);
        assert_relative_eq!(report.total_length, 0.0);
    }

    #[test]
    fn quad_boundary_closes() {
        let report = BoundaryLoops::new()
            .execute(&quad(), &ToleranceContext::default())
            .unwrap();
        assert_eq!(report.loops.len(), 1);
        assert!(report.loops[0].closed);
        assert_eq!(report.loops[0].edges.len(), 4);
        assert_relative_eq!(report.loops[0].length, 6.0);
        assert_eq!(report.failed_joins, 0);
    }

    #[test]
    fn open_chain_counts_as_failed_joins() {
        // Three triangles on one edge: the first two boundaries close into a
        // loop, the third is left as an open two-edge chain.
        let mesh = PolyMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(0.5, 1.0, 0.0),
                p(0.5, -1.0, 0.0),
                p(0.5, 0.0, 1.0),
            ],
            vec![vec![0, 1, 2], vec![0, 1, 3], vec![0, 1, 4]],
        )
        .unwrap();
        let report = BoundaryLoops::new()
            .execute(&mesh, &ToleranceContext::default())
            .unwrap();
        assert_eq!(report.naked_edge_count, 6);
        assert_eq!(report.loops.len(), 2);
        assert!(report.loops[0].closed);
        assert!(!report.loops[1].closed);
        assert_eq!(report.joined_count, 4);
        assert_eq!(report.failed_joins, 2);
    }

    #[test]
    fn explicit_tolerance_overrides_context() {
        let report = BoundaryLoops::new()
            .with_tolerance(Some(0.5))
            .execute(&quad(), &ToleranceContext::default())
            .unwrap();
        assert_relative_eq!(report.tolerance, 0.5);
    }

    #[test]
    fn non_positive_override_is_rejected() {
        assert!(BoundaryLoops::new()
            .with_tolerance(Some(0.0))
            .execute(&quad(), &ToleranceContext::default())
            .is_err());
    }
}
