use std::collections::HashMap;

use tracing::debug;

use crate::analysis::components::label_components;
use crate::error::{Result, StoreError};
use crate::math::{angle_between, Aabb, Point3, Vector3, TOLERANCE};
use crate::provider::{
    self, AdjacencyProvider, Continuity, GeometryKind, LoopKind, TrimLoop, ValidityReport,
};

use super::index::BrepIndex;
use super::sew::{self, CopyMaps};
use super::store::{EdgeId, ShellData, ShellId, TopologyStore, VertexId};

/// A B-rep shell exposed through [`AdjacencyProvider`].
///
/// The shape owns its store. Dense indices are rebuilt after every
/// mutation, so they are only stable between mutations.
#[derive(Debug, Clone)]
pub struct BrepShape {
    store: TopologyStore,
    shell: ShellId,
    index: BrepIndex,
}

/// Which entities a weld-and-sew pass may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SewScope {
    All,
    NakedOnly,
}

impl BrepShape {
    /// Wraps the shell `shell` of `store`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntityNotFound`] if the shell does not exist,
    /// or [`StoreError::InvalidTopology`] if it lists a face the store lacks.
    pub fn new(store: TopologyStore, shell: ShellId) -> Result<Self> {
        let data = store.shell(shell)?;
        if let Some(missing) = data.faces.iter().position(|&f| store.face(f).is_err()) {
            return Err(StoreError::InvalidTopology(format!(
                "shell face {missing} is not in the store"
            ))
            .into());
        }
        let index = BrepIndex::build(&store, shell);
        Ok(Self {
            store,
            shell,
            index,
        })
    }

    /// The underlying topology store.
    #[must_use]
    pub fn store(&self) -> &TopologyStore {
        &self.store
    }

    /// The root shell.
    #[must_use]
    pub fn shell(&self) -> ShellId {
        self.shell
    }

    fn reindex(&mut self) {
        self.index = BrepIndex::build(&self.store, self.shell);
    }

    fn point(&self, vertex: usize) -> Point3 {
        self.store
            .vertex(self.index.vertices[vertex])
            .map_or_else(|_| Point3::origin(), |v| v.point)
    }

    fn oriented_normal(&self, face: usize, point: &Point3) -> Vector3 {
        match self.store.face(self.index.faces[face]) {
            Ok(data) => {
                let n = data.surface.normal_near(point);
                if data.same_sense {
                    n
                } else {
                    -n
                }
            }
            Err(_) => Vector3::zeros(),
        }
    }

    fn naked_vertices(&self) -> Vec<VertexId> {
        let mut out = Vec::new();
        for (e, &(a, b)) in self.index.edge_vertices.iter().enumerate() {
            if self.index.valence(e) != 1 {
                continue;
            }
            for v in [a, b] {
                let id = self.index.vertices[v];
                if !out.contains(&id) {
                    out.push(id);
                }
            }
        }
        out
    }

    /// Welds vertices within `tolerance` and collapses the edges that end up
    /// sharing both endpoints. Returns the number of edges removed.
    fn weld_and_sew(&mut self, tolerance: f64, scope: SewScope) -> usize {
        let (candidates, sewable): (Vec<VertexId>, Vec<EdgeId>) = match scope {
            SewScope::All => (self.index.vertices.clone(), self.index.edges.clone()),
            SewScope::NakedOnly => (
                self.naked_vertices(),
                (0..self.index.edges.len())
                    .filter(|&e| self.index.valence(e) == 1)
                    .map(|e| self.index.edges[e])
                    .collect(),
            ),
        };
        let remap = sew::cluster_vertices(&self.store, &candidates, tolerance);
        sew::redirect_vertices(&mut self.store, &self.index.edges, &remap);
        let merged = sew::merge_duplicate_edges(&mut self.store, &self.index.faces, &sewable);
        self.reindex();
        debug!(welded = remap.len(), merged, ?scope, "sewed brep edges");
        merged
    }

    /// Copies a subset of faces (dense indices) into a new shape.
    fn extract(&self, faces: &[usize]) -> std::result::Result<Self, StoreError> {
        let ids: Vec<_> = faces.iter().map(|&f| self.index.faces[f]).collect();
        let mut store = TopologyStore::new();
        let copied = sew::copy_faces(&self.store, &ids, &mut store, &mut CopyMaps::default())?;
        let shell = store.add_shell(ShellData { faces: copied });
        let index = BrepIndex::build(&store, shell);
        Ok(Self {
            store,
            shell,
            index,
        })
    }
}

impl AdjacencyProvider for BrepShape {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Brep
    }

    fn edge_count(&self) -> usize {
        self.index.edges.len()
    }

    fn vertex_count(&self) -> usize {
        self.index.vertices.len()
    }

    fn face_count(&self) -> usize {
        self.index.faces.len()
    }

    fn edge_adjacent_faces(&self, edge: usize) -> Vec<usize> {
        self.index.edge_uses[edge].iter().map(|&(f, _)| f).collect()
    }

    fn edge_valence(&self, edge: usize) -> usize {
        self.index.valence(edge)
    }

    fn edge_endpoints(&self, edge: usize) -> (Point3, Point3) {
        let (a, b) = self.index.edge_vertices[edge];
        (self.point(a), self.point(b))
    }

    fn edge_length(&self, edge: usize) -> f64 {
        let (a, b) = self.edge_endpoints(edge);
        (b - a).norm()
    }

    fn edge_polyline(&self, edge: usize) -> Vec<Point3> {
        let (a, b) = self.edge_endpoints(edge);
        vec![a, b]
    }

    fn edge_continuity(
        &self,
        edge: usize,
        order: Continuity,
        angle_tolerance: f64,
    ) -> Option<bool> {
        let uses = &self.index.edge_uses[edge];
        let [(f1, _), (f2, _)] = uses[..] else {
            return Some(false);
        };
        if f1 == f2 {
            return Some(false);
        }
        if order == Continuity::C0 {
            return Some(true);
        }

        let (a, b) = self.edge_endpoints(edge);
        let mid = nalgebra::center(&a, &b);
        let tangent = angle_between(
            &self.oriented_normal(f1, &mid),
            &self.oriented_normal(f2, &mid),
        ) <= angle_tolerance;
        if order == Continuity::G1 || !tangent {
            return Some(tangent);
        }

        let surface = |f: usize| {
            self.store
                .face(self.index.faces[f])
                .ok()
                .map(|data| &data.surface)
        };
        let curvature = match (surface(f1), surface(f2)) {
            (Some(s1), Some(s2)) => s1.curvature_matches(s2, TOLERANCE * 1e3, angle_tolerance),
            _ => false,
        };
        Some(curvature)
    }

    fn vertex_location(&self, vertex: usize) -> Point3 {
        self.point(vertex)
    }

    fn vertex_edges(&self, vertex: usize) -> Vec<usize> {
        self.index.vertex_edges[vertex].clone()
    }

    fn vertex_faces(&self, vertex: usize) -> Vec<usize> {
        self.index.vertex_faces[vertex].clone()
    }

    fn face_adjacent_faces(&self, face: usize) -> Vec<usize> {
        self.index.face_neighbors(face)
    }

    fn face_normal_near(&self, face: usize, point: &Point3) -> Vector3 {
        self.oriented_normal(face, point)
    }

    fn face_bounding_box(&self, face: usize) -> Aabb {
        let points: Vec<Point3> = self.index.face_edges[face]
            .iter()
            .flat_map(|&e| {
                let (a, b) = self.edge_endpoints(e);
                [a, b]
            })
            .collect();
        Aabb::from_points(&points)
    }

    fn trim_loops(&self) -> Vec<TrimLoop> {
        let mut loops = Vec::new();
        for (f, &face_id) in self.index.faces.iter().enumerate() {
            let Ok(face) = self.store.face(face_id) else {
                continue;
            };
            for (i, wire_id) in face.wires().enumerate() {
                let length = self.store.wire(wire_id).map_or(0.0, |wire| {
                    wire.edges
                        .iter()
                        .filter_map(|oe| self.store.edge_points(oe.edge).ok())
                        .map(|(a, b)| (b - a).norm())
                        .sum()
                });
                loops.push(TrimLoop {
                    face: f,
                    kind: if i == 0 { LoopKind::Outer } else { LoopKind::Inner },
                    length,
                });
            }
        }
        loops
    }

    fn duplicate(&self) -> Option<Self> {
        Some(self.clone())
    }

    fn repair(&mut self, tolerance: f64) -> bool {
        self.weld_and_sew(tolerance, SewScope::All);
        self.validity().is_valid()
    }

    fn join_naked_edges(&mut self, tolerance: f64) -> usize {
        self.weld_and_sew(tolerance, SewScope::NakedOnly)
    }

    fn join_two_edges(&mut self, first: usize, second: usize, tolerance: f64) -> bool {
        let count = self.edge_count();
        if first == second || first >= count || second >= count {
            return false;
        }
        if self.index.valence(first) != 1 || self.index.valence(second) != 1 {
            return false;
        }
        let (a0, a1) = self.index.edge_vertices[first];
        let (b0, b1) = self.index.edge_vertices[second];
        let close = |x: usize, y: usize| (self.point(x) - self.point(y)).norm() <= tolerance;
        let pairs = if close(a0, b0) && close(a1, b1) {
            [(b0, a0), (b1, a1)]
        } else if close(a0, b1) && close(a1, b0) {
            [(b1, a0), (b0, a1)]
        } else {
            return false;
        };

        let remap: HashMap<VertexId, VertexId> = pairs
            .iter()
            .filter(|(from, to)| from != to)
            .map(|&(from, to)| (self.index.vertices[from], self.index.vertices[to]))
            .collect();
        let sewable = [self.index.edges[first], self.index.edges[second]];
        sew::redirect_vertices(&mut self.store, &self.index.edges, &remap);
        let merged = sew::merge_duplicate_edges(&mut self.store, &self.index.faces, &sewable);
        self.reindex();
        merged == 1
    }

    fn connected_components(&self) -> Vec<Self> {
        label_components(self.face_count(), |f| self.index.face_neighbors(f))
            .iter()
            .filter_map(|faces| self.extract(faces).ok())
            .collect()
    }

    fn join_shapes(shapes: Vec<Self>, tolerance: f64) -> Vec<Self> {
        let mut store = TopologyStore::new();
        let mut faces = Vec::new();
        for shape in &shapes {
            match sew::copy_faces(
                &shape.store,
                &shape.index.faces,
                &mut store,
                &mut CopyMaps::default(),
            ) {
                Ok(copied) => faces.extend(copied),
                Err(_) => return Vec::new(),
            }
        }
        let shell = store.add_shell(ShellData { faces });
        let Ok(mut merged) = Self::new(store, shell) else {
            return Vec::new();
        };
        merged.join_naked_edges(tolerance);
        merged.connected_components()
    }

    fn validity(&self) -> ValidityReport {
        let mut problems = self.index.problems.clone();
        if self.index.faces.is_empty() {
            problems.push("shell has no faces".into());
        }
        for (e, &(a, b)) in self.index.edge_vertices.iter().enumerate() {
            if a == b {
                problems.push(format!("edge {e} is collapsed"));
            } else if self.edge_length(e) <= TOLERANCE {
                problems.push(format!("edge {e} has zero length"));
            }
        }
        for (f, &face_id) in self.index.faces.iter().enumerate() {
            let Ok(face) = self.store.face(face_id) else {
                continue;
            };
            for wire_id in face.wires() {
                let Ok(wire) = self.store.wire(wire_id) else {
                    continue;
                };
                if wire.edges.is_empty() {
                    problems.push(format!("face {f} has an empty wire"));
                    continue;
                }
                let n = wire.edges.len();
                let connected = (0..n).all(|i| {
                    let end = self.store.oriented_end(wire.edges[i]);
                    let next = self.store.oriented_start(wire.edges[(i + 1) % n]);
                    matches!((end, next), (Ok(x), Ok(y)) if x == y)
                });
                if !connected {
                    problems.push(format!("face {f} has an open wire"));
                }
            }
        }
        ValidityReport { problems }
    }

    fn is_solid(&self) -> bool {
        !self.index.faces.is_empty()
            && self.naked_edge_count() == 0
            && self.is_manifold()
            && self.is_orientable()
    }

    fn is_manifold(&self) -> bool {
        (0..self.edge_count()).all(|e| self.index.valence(e) <= 2)
    }

    fn is_orientable(&self) -> bool {
        provider::is_orientable(self.index.faces.len(), &self.index.edge_uses)
    }
}
