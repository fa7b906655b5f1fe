use std::collections::HashMap;

use crate::error::{GeometryError, Result};
use crate::math::merge::PointMerger;
use crate::math::{newell_normal, Point3};

use super::store::{
    EdgeData, EdgeId, FaceData, FaceId, OrientedEdge, ShellData, TopologyStore, VertexData,
    VertexId, WireData, WireId,
};
use super::surface::FaceSurface;
use super::BrepShape;

/// Assembles a shell from polygonal face boundaries.
///
/// Boundary points closer than the merge tolerance share a vertex, and two
/// boundary segments between the same pair of vertices share an edge. Points
/// that are not merged leave the corresponding edges naked, which is how
/// gapped fixtures are built.
pub struct ShellBuilder {
    store: TopologyStore,
    merger: PointMerger<VertexId>,
    edges: HashMap<(VertexId, VertexId), EdgeId>,
    faces: Vec<FaceId>,
}

impl ShellBuilder {
    /// Creates a builder that merges boundary points within `merge_tolerance`.
    #[must_use]
    pub fn new(merge_tolerance: f64) -> Self {
        Self {
            store: TopologyStore::new(),
            merger: PointMerger::new(merge_tolerance),
            edges: HashMap::new(),
            faces: Vec::new(),
        }
    }

    /// Adds a planar face whose outward normal follows the boundary winding.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the boundary has fewer than
    /// three points or encloses no area.
    pub fn add_planar_face(&mut self, boundary: &[Point3]) -> Result<FaceId> {
        self.add_planar_face_with_holes(boundary, &[])
    }

    /// Adds a planar face with inner boundaries. Holes should wind opposite
    /// to the outer boundary.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if any boundary has fewer than
    /// three points or the outer boundary encloses no area.
    pub fn add_planar_face_with_holes(
        &mut self,
        boundary: &[Point3],
        holes: &[Vec<Point3>],
    ) -> Result<FaceId> {
        let normal = newell_normal(boundary).ok_or_else(|| {
            GeometryError::Degenerate("face boundary encloses no area".into())
        })?;
        let surface = FaceSurface::plane(boundary[0], normal)?;
        self.add_face(boundary, holes, surface, true)
    }

    /// Adds a face on an arbitrary surface.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if any boundary has fewer than
    /// three points.
    pub fn add_face(
        &mut self,
        boundary: &[Point3],
        holes: &[Vec<Point3>],
        surface: FaceSurface,
        same_sense: bool,
    ) -> Result<FaceId> {
        let outer_wire = self.add_wire(boundary)?;
        let inner_wires = holes
            .iter()
            .map(|hole| self.add_wire(hole))
            .collect::<Result<Vec<_>>>()?;
        let face = self.store.add_face(FaceData {
            surface,
            outer_wire,
            inner_wires,
            same_sense,
        });
        self.faces.push(face);
        Ok(face)
    }

    /// Finishes the shell.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be indexed.
    pub fn build(mut self) -> Result<BrepShape> {
        let shell = self.store.add_shell(ShellData { faces: self.faces });
        BrepShape::new(self.store, shell)
    }

    fn add_wire(&mut self, points: &[Point3]) -> Result<WireId> {
        if points.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "boundary has {} points",
                points.len()
            ))
            .into());
        }
        let vertex_ids: Vec<VertexId> = points.iter().map(|p| self.vertex_at(p)).collect();
        let n = vertex_ids.len();
        let edges = (0..n)
            .map(|i| self.edge_between(vertex_ids[i], vertex_ids[(i + 1) % n]))
            .collect();
        Ok(self.store.add_wire(WireData { edges }))
    }

    fn vertex_at(&mut self, point: &Point3) -> VertexId {
        if let Some(existing) = self.merger.find(point) {
            return existing;
        }
        let id = self.store.add_vertex(VertexData { point: *point });
        self.merger.insert(id, point);
        id
    }

    fn edge_between(&mut self, start: VertexId, end: VertexId) -> OrientedEdge {
        let key = if start < end { (start, end) } else { (end, start) };
        if let Some(&edge) = self.edges.get(&key) {
            let forward = self
                .store
                .edge(edge)
                .is_ok_and(|data| data.start == start);
            return OrientedEdge::new(edge, forward);
        }
        let edge = self.store.add_edge(EdgeData { start, end });
        self.edges.insert(key, edge);
        OrientedEdge::new(edge, true)
    }
}

/// Creates an axis-aligned box solid from two corner points.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Builds the six outward-facing faces of the box as one closed shell.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the box has zero extent along any axis.
    pub fn execute(&self) -> Result<BrepShape> {
        let mut builder = ShellBuilder::new(crate::math::TOLERANCE * 1000.0);
        self.add_to(&mut builder)?;
        builder.build()
    }

    /// Adds the box faces to an existing builder.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the box has zero extent along any axis.
    pub fn add_to(&self, builder: &mut ShellBuilder) -> Result<()> {
        let (lo, hi) = (self.min_corner, self.max_corner);
        let c = |x: bool, y: bool, z: bool| {
            Point3::new(
                if x { hi.x } else { lo.x },
                if y { hi.y } else { lo.y },
                if z { hi.z } else { lo.z },
            )
        };
        let faces = [
            // Bottom (-Z)
            [c(false, false, false), c(false, true, false), c(true, true, false), c(true, false, false)],
            // Top (+Z)
            [c(false, false, true), c(true, false, true), c(true, true, true), c(false, true, true)],
            // Front (-Y)
            [c(false, false, false), c(true, false, false), c(true, false, true), c(false, false, true)],
            // Back (+Y)
            [c(false, true, false), c(false, true, true), c(true, true, true), c(true, true, false)],
            // Left (-X)
            [c(false, false, false), c(false, false, true), c(false, true, true), c(false, true, false)],
            // Right (+X)
            [c(true, false, false), c(true, true, false), c(true, true, true), c(true, false, true)],
        ];
        for quad in &faces {
            builder.add_planar_face(quad)?;
        }
        Ok(())
    }
}
