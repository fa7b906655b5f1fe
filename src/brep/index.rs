//! Dense numbering of the entities reachable from a shell.

use std::collections::HashMap;

use super::store::{EdgeId, FaceId, ShellId, TopologyStore, VertexId};

/// Maps a shell's faces, edges and vertices to dense indices and records
/// their incidence.
///
/// Faces keep shell order; edges and vertices are numbered in order of first
/// encounter while walking faces, wires (outer first) and oriented edges.
#[derive(Debug, Clone, Default)]
pub(crate) struct BrepIndex {
    pub faces: Vec<FaceId>,
    pub edges: Vec<EdgeId>,
    pub vertices: Vec<VertexId>,
    /// `(face, forward)` for every use of each edge.
    pub edge_uses: Vec<Vec<(usize, bool)>>,
    pub edge_vertices: Vec<(usize, usize)>,
    pub face_edges: Vec<Vec<usize>>,
    pub vertex_edges: Vec<Vec<usize>>,
    pub vertex_faces: Vec<Vec<usize>>,
    /// Dangling references found while walking the shell.
    pub problems: Vec<String>,
}

impl BrepIndex {
    pub fn build(store: &TopologyStore, shell: ShellId) -> Self {
        let mut index = Self::default();
        let Ok(shell_data) = store.shell(shell) else {
            index.problems.push("shell is missing".into());
            return index;
        };

        let mut edge_slot: HashMap<EdgeId, usize> = HashMap::new();
        let mut vertex_slot: HashMap<VertexId, usize> = HashMap::new();

        for (f, &face_id) in shell_data.faces.iter().enumerate() {
            index.faces.push(face_id);
            index.face_edges.push(Vec::new());
            let Ok(face) = store.face(face_id) else {
                index.problems.push(format!("face {f} is missing"));
                continue;
            };

            for wire_id in face.wires() {
                let Ok(wire) = store.wire(wire_id) else {
                    index.problems.push(format!("face {f} references a missing wire"));
                    continue;
                };
                for oe in &wire.edges {
                    let Ok(edge) = store.edge(oe.edge) else {
                        index.problems.push(format!("face {f} references a missing edge"));
                        continue;
                    };
                    let e = if let Some(&e) = edge_slot.get(&oe.edge) {
                        e
                    } else {
                        let e = index.edges.len();
                        edge_slot.insert(oe.edge, e);
                        index.edges.push(oe.edge);
                        index.edge_uses.push(Vec::new());
                        let start = index.vertex(&mut vertex_slot, edge.start);
                        let end = index.vertex(&mut vertex_slot, edge.end);
                        index.edge_vertices.push((start, end));
                        index.vertex_edges[start].push(e);
                        if end != start {
                            index.vertex_edges[end].push(e);
                        }
                        e
                    };
                    index.edge_uses[e].push((f, oe.forward));
                    index.face_edges[f].push(e);
                    let (start, end) = index.edge_vertices[e];
                    for v in [start, end] {
                        if !index.vertex_faces[v].contains(&f) {
                            index.vertex_faces[v].push(f);
                        }
                    }
                }
            }
        }

        index
    }

    fn vertex(&mut self, slots: &mut HashMap<VertexId, usize>, id: VertexId) -> usize {
        *slots.entry(id).or_insert_with(|| {
            self.vertices.push(id);
            self.vertex_edges.push(Vec::new());
            self.vertex_faces.push(Vec::new());
            self.vertices.len() - 1
        })
    }

    /// Faces sharing an edge with `face`, in first-encounter order.
    pub fn face_neighbors(&self, face: usize) -> Vec<usize> {
        let mut neighbors = Vec::new();
        for &edge in &self.face_edges[face] {
            for &(other, _) in &self.edge_uses[edge] {
                if other != face && !neighbors.contains(&other) {
                    neighbors.push(other);
                }
            }
        }
        neighbors
    }

    /// Number of face uses of `edge`.
    pub fn valence(&self, edge: usize) -> usize {
        self.edge_uses[edge].len()
    }
}
