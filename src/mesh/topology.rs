//! Edge table for indexed polygon meshes.
//!
//! Edges are unique unordered vertex pairs, numbered in order of first
//! appearance while walking faces in order.

use std::collections::HashMap;

/// Derived edge/vertex/face incidence for a [`super::PolyMesh`].
#[derive(Debug, Clone, Default)]
pub(crate) struct MeshTopology {
    /// Edge endpoints, normalized so `v0 < v1`.
    pub edges: Vec<(u32, u32)>,
    /// For each edge, `(face, forward)` per use; `forward` when the face
    /// walks the edge from `v0` to `v1`.
    pub edge_uses: Vec<Vec<(usize, bool)>>,
    /// For each face, its edges in boundary order.
    pub face_edges: Vec<Vec<usize>>,
    /// For each vertex, incident edges.
    pub vertex_edges: Vec<Vec<usize>>,
    /// For each vertex, incident faces without duplicates.
    pub vertex_faces: Vec<Vec<usize>>,
}

impl MeshTopology {
    /// Builds the edge table for `faces` over `vertex_count` vertices.
    ///
    /// Consecutive repeated vertices in a face do not produce an edge.
    pub fn build(vertex_count: usize, faces: &[Vec<u32>]) -> Self {
        let mut lookup: HashMap<(u32, u32), usize> = HashMap::new();
        let mut topo = Self {
            vertex_edges: vec![Vec::new(); vertex_count],
            vertex_faces: vec![Vec::new(); vertex_count],
            face_edges: Vec::with_capacity(faces.len()),
            ..Self::default()
        };

        for (face_idx, face) in faces.iter().enumerate() {
            let mut edges_of_face = Vec::with_capacity(face.len());
            for (i, &a) in face.iter().enumerate() {
                let b = face[(i + 1) % face.len()];
                let faces_of_vertex = &mut topo.vertex_faces[a as usize];
                if !faces_of_vertex.contains(&face_idx) {
                    faces_of_vertex.push(face_idx);
                }
                if a == b {
                    continue;
                }

                let key = normalize_edge(a, b);
                let edge = *lookup.entry(key).or_insert_with(|| {
                    topo.edges.push(key);
                    topo.edge_uses.push(Vec::new());
                    topo.vertex_edges[key.0 as usize].push(topo.edges.len() - 1);
                    topo.vertex_edges[key.1 as usize].push(topo.edges.len() - 1);
                    topo.edges.len() - 1
                });
                topo.edge_uses[edge].push((face_idx, a < b));
                edges_of_face.push(edge);
            }
            topo.face_edges.push(edges_of_face);
        }

        topo
    }

    /// Number of faces using `edge`.
    pub fn valence(&self, edge: usize) -> usize {
        self.edge_uses[edge].len()
    }

    /// Faces using `edge`, one entry per use.
    pub fn edge_faces(&self, edge: usize) -> Vec<usize> {
        self.edge_uses[edge].iter().map(|&(f, _)| f).collect()
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

    /// Returns `true` if the faces around every vertex form one edge-connected fan.
    pub fn vertices_are_manifold(&self) -> bool {
        (0..self.vertex_faces.len()).all(|v| self.fan_count(v) <= 1)
    }

    /// Counts the edge-connected groups of faces around vertex `v`.
    fn fan_count(&self, v: usize) -> usize {
        let faces = &self.vertex_faces[v];
        if faces.is_empty() {
            return 0;
        }
        // Union-find over the local face list.
        let mut parent: Vec<usize> = (0..faces.len()).collect();
        for &edge in &self.vertex_edges[v] {
            let locals: Vec<usize> = self.edge_uses[edge]
                .iter()
                .filter_map(|(f, _)| faces.iter().position(|x| x == f))
                .collect();
            for pair in locals.windows(2) {
                let (ra, rb) = (find(&mut parent, pair[0]), find(&mut parent, pair[1]));
                if ra != rb {
                    parent[ra] = rb;
                }
            }
        }
        (0..faces.len())
            .filter(|&i| find(&mut parent, i) == i)
            .count()
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Normalize edge direction so `v0 < v1`.
#[inline]
fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_triangles_share_one_edge() {
        let faces = vec![vec![0, 1, 2], vec![1, 3, 2]];
        let topo = MeshTopology::build(4, &faces);
        assert_eq!(topo.edges.len(), 5);
        let shared = topo
            .edges
            .iter()
            .position(|&e| e == (1, 2))
            .map_or(0, |e| topo.valence(e));
        assert_eq!(shared, 2);
        assert_eq!(topo.face_neighbors(0), vec![1]);
    }

    #[test]
    fn edges_numbered_by_first_appearance() {
        let faces = vec![vec![2, 0, 1]];
        let topo = MeshTopology::build(3, &faces);
        assert_eq!(topo.edges, vec![(0, 2), (0, 1), (1, 2)]);
        assert_eq!(topo.edge_uses[0], vec![(0, false)]);
    }

    #[test]
    fn bowtie_vertex_is_not_manifold() {
        // Two triangles touching only at vertex 0.
        let faces = vec![vec![0, 1, 2], vec![0, 3, 4]];
        let topo = MeshTopology::build(5, &faces);
        assert!(!topo.vertices_are_manifold());
    }

    #[test]
    fn fan_around_vertex_is_manifold() {
        let faces = vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 4]];
        let topo = MeshTopology::build(5, &faces);
        assert!(topo.vertices_are_manifold());
    }
}
