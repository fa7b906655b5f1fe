use crate::context::ToleranceContext;
use crate::error::Result;
use crate::math::Point3;
use crate::provider::{check_index, ensure_supported, AdjacencyProvider};

/// Incidence of a single vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexReport {
    /// The queried vertex.
    pub vertex: usize,
    /// Position of the vertex.
    pub location: Point3,
    /// Incident edges.
    pub edges: Vec<usize>,
    /// Incident faces.
    pub faces: Vec<usize>,
    /// Number of incident edges.
    pub valence: usize,
    /// `true` if any incident edge is naked.
    pub is_boundary: bool,
}

/// Queries the edges and faces around one vertex.
#[derive(Debug, Clone, Copy)]
pub struct VertexTopology {
    vertex: usize,
}

impl VertexTopology {
    /// Creates a new `VertexTopology` query for `vertex`.
    #[must_use]
    pub fn new(vertex: usize) -> Self {
        Self { vertex }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AnalysisError::InvalidIndex`] if the vertex is
    /// outside `[0, vertex_count)`.
    pub fn execute<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        _ctx: &ToleranceContext,
    ) -> Result<VertexReport> {
        ensure_supported(geometry)?;
        check_index("vertex", self.vertex, geometry.vertex_count())?;

        let edges = geometry.vertex_edges(self.vertex);
        let is_boundary = edges.iter().any(|&e| geometry.edge_valence(e) == 1);
        Ok(VertexReport {
            vertex: self.vertex,
            location: geometry.vertex_location(self.vertex),
            valence: edges.len(),
            faces: geometry.vertex_faces(self.vertex),
            edges,
            is_boundary,
        })
    }
}
