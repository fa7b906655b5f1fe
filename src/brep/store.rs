use slotmap::SlotMap;

use crate::error::StoreError;
use crate::math::Point3;

use super::surface::FaceSurface;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the topology store.
    pub struct VertexId;
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
    /// Unique identifier for a wire in the topology store.
    pub struct WireId;
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
    /// Unique identifier for a shell in the topology store.
    pub struct ShellId;
}

/// Data associated with a topological vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 3D position of the vertex.
    pub point: Point3,
}

/// A straight edge between two vertices.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
}

/// An edge with orientation information within a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedEdge {
    /// The edge identifier.
    pub edge: EdgeId,
    /// If `true`, the edge is traversed start → end.
    pub forward: bool,
}

impl OrientedEdge {
    /// Creates a new oriented edge.
    #[must_use]
    pub fn new(edge: EdgeId, forward: bool) -> Self {
        Self { edge, forward }
    }
}

/// An ordered loop of oriented edges bounding a face.
#[derive(Debug, Clone, Default)]
pub struct WireData {
    /// The ordered sequence of oriented edges.
    pub edges: Vec<OrientedEdge>,
}

/// Data associated with a topological face.
///
/// A face is a bounded region on a surface, defined by an outer wire
/// and optionally inner wires (holes).
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The geometric surface on which this face lies.
    pub surface: FaceSurface,
    /// The outer boundary wire.
    pub outer_wire: WireId,
    /// Inner boundary wires (holes).
    pub inner_wires: Vec<WireId>,
    /// If `true`, the face normal agrees with the surface normal.
    pub same_sense: bool,
}

impl FaceData {
    /// The outer wire followed by the inner wires.
    pub fn wires(&self) -> impl Iterator<Item = WireId> + '_ {
        std::iter::once(self.outer_wire).chain(self.inner_wires.iter().copied())
    }
}

/// A set of faces analyzed together as one shape.
#[derive(Debug, Clone, Default)]
pub struct ShellData {
    /// The faces that make up this shell, in index order.
    pub faces: Vec<FaceId>,
}

/// Central arena that owns all topological entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// so entities can be removed while sewing without invalidating others.
#[derive(Debug, Clone, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    wires: SlotMap<WireId, WireData>,
    faces: SlotMap<FaceId, FaceData>,
    shells: SlotMap<ShellId, ShellData>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, StoreError> {
        self.vertices
            .get(id)
            .ok_or(StoreError::EntityNotFound("vertex"))
    }

    /// Removes a vertex, returning its data if it existed.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<VertexData> {
        self.vertices.remove(id)
    }

    // --- Edge operations ---

    /// Inserts an edge and returns its ID.
    pub fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        self.edges.insert(data)
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, StoreError> {
        self.edges
            .get(id)
            .ok_or(StoreError::EntityNotFound("edge"))
    }

    /// Returns a mutable reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData, StoreError> {
        self.edges
            .get_mut(id)
            .ok_or(StoreError::EntityNotFound("edge"))
    }

    /// Removes an edge, returning its data if it existed.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<EdgeData> {
        self.edges.remove(id)
    }

    // --- Wire operations ---

    /// Inserts a wire and returns its ID.
    pub fn add_wire(&mut self, data: WireData) -> WireId {
        self.wires.insert(data)
    }

    /// Returns a reference to the wire data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wire(&self, id: WireId) -> Result<&WireData, StoreError> {
        self.wires
            .get(id)
            .ok_or(StoreError::EntityNotFound("wire"))
    }

    /// Returns a mutable reference to the wire data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wire_mut(&mut self, id: WireId) -> Result<&mut WireData, StoreError> {
        self.wires
            .get_mut(id)
            .ok_or(StoreError::EntityNotFound("wire"))
    }

    // --- Face operations ---

    /// Inserts a face and returns its ID.
    pub fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, StoreError> {
        self.faces
            .get(id)
            .ok_or(StoreError::EntityNotFound("face"))
    }

    /// Removes a face, returning its data if it existed.
    pub fn remove_face(&mut self, id: FaceId) -> Option<FaceData> {
        self.faces.remove(id)
    }

    // --- Shell operations ---

    /// Inserts a shell and returns its ID.
    pub fn add_shell(&mut self, data: ShellData) -> ShellId {
        self.shells.insert(data)
    }

    /// Returns a reference to the shell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn shell(&self, id: ShellId) -> Result<&ShellData, StoreError> {
        self.shells
            .get(id)
            .ok_or(StoreError::EntityNotFound("shell"))
    }

    /// Returns the start and end positions of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn edge_points(&self, id: EdgeId) -> Result<(Point3, Point3), StoreError> {
        let edge = self.edge(id)?;
        Ok((self.vertex(edge.start)?.point, self.vertex(edge.end)?.point))
    }

    /// Returns the vertex an oriented edge starts from.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn oriented_start(&self, oe: OrientedEdge) -> Result<VertexId, StoreError> {
        let edge = self.edge(oe.edge)?;
        Ok(if oe.forward { edge.start } else { edge.end })
    }

    /// Returns the vertex an oriented edge ends at.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn oriented_end(&self, oe: OrientedEdge) -> Result<VertexId, StoreError> {
        let edge = self.edge(oe.edge)?;
        Ok(if oe.forward { edge.end } else { edge.start })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_entity_is_an_error() {
        let mut store = TopologyStore::new();
        let v = store.add_vertex(VertexData {
            point: Point3::origin(),
        });
        store.remove_vertex(v);
        assert!(matches!(
            store.vertex(v),
            Err(StoreError::EntityNotFound("vertex"))
        ));
    }

    #[test]
    fn oriented_edge_endpoints_follow_direction() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(VertexData {
            point: Point3::origin(),
        });
        let b = store.add_vertex(VertexData {
            point: Point3::new(1.0, 0.0, 0.0),
        });
        let e = store.add_edge(EdgeData { start: a, end: b });
        let reversed = OrientedEdge::new(e, false);
        assert_eq!(store.oriented_start(reversed).unwrap(), b);
        assert_eq!(store.oriented_end(reversed).unwrap(), a);
    }
}
