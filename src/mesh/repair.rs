//! Cleanup primitives for [`PolyMesh`]: welding, degenerate and duplicate
//! face removal, vertex compaction and component extraction.
//!
//! Every function leaves the edge table stale; callers rebuild it.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::math::merge::PointMerger;
use crate::math::{newell_normal, Point3};

use super::PolyMesh;

/// Merges vertices lying within `tolerance` of an earlier vertex.
///
/// Only vertices with `eligible[v]` set take part; pass `None` to weld every
/// vertex. Positions are not moved: each merged vertex is replaced in the
/// faces by the first vertex of its cluster. Returns the number of vertices
/// merged away.
pub(super) fn weld_vertices(mesh: &mut PolyMesh, tolerance: f64, eligible: Option<&[bool]>) -> usize {
    let mut merger = PointMerger::new(tolerance);
    let mut remap: Vec<u32> = (0..mesh.vertices.len())
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
        .collect();
    let mut merged = 0;

    for (v, point) in mesh.vertices.iter().enumerate() {
        if eligible.is_some_and(|flags| !flags[v]) {
            continue;
        }
        let representative = merger.get_or_insert(remap[v], point);
        if representative != remap[v] {
            remap[v] = representative;
            merged += 1;
        }
    }

    if merged > 0 {
        for face in &mut mesh.faces {
            for v in face.iter_mut() {
                *v = remap[*v as usize];
            }
        }
    }
    debug!(merged, tolerance, "welded mesh vertices");
    merged
}

/// Collapses repeated consecutive vertices and drops faces with fewer than
/// three distinct vertices or zero area. Returns the number of faces removed.
pub(super) fn remove_degenerate_faces(mesh: &mut PolyMesh) -> usize {
    let before = mesh.faces.len();
    let vertices = &mesh.vertices;
    mesh.faces.retain_mut(|face| {
        face.dedup();
        while face.len() > 1 && face.first() == face.last() {
            face.pop();
        }
        let distinct: HashSet<u32> = face.iter().copied().collect();
        if distinct.len() < 3 || distinct.len() != face.len() {
            return false;
        }
        let points: Vec<Point3> = face.iter().map(|&v| vertices[v as usize]).collect();
        newell_normal(&points).is_some()
    });
    before - mesh.faces.len()
}

/// Drops faces using the same vertex set as an earlier face.
/// Returns the number of faces removed.
pub(super) fn remove_duplicate_faces(mesh: &mut PolyMesh) -> usize {
    let before = mesh.faces.len();
    let mut seen: HashSet<Vec<u32>> = HashSet::new();
    mesh.faces.retain(|face| {
        let mut key = face.clone();
        key.sort_unstable();
        seen.insert(key)
    });
    before - mesh.faces.len()
}

/// Removes vertices no face references and renumbers the rest in order.
/// Returns the number of vertices removed.
pub(super) fn remove_unreferenced_vertices(mesh: &mut PolyMesh) -> usize {
    let mut used = vec![false; mesh.vertices.len()];
    for face in &mesh.faces {
        for &v in face {
            used[v as usize] = true;
        }
    }

    let mut remap = vec![u32::MAX; mesh.vertices.len()];
    let mut kept = Vec::with_capacity(mesh.vertices.len());
    for (v, point) in mesh.vertices.iter().enumerate() {
        if used[v] {
            remap[v] = u32::try_from(kept.len()).unwrap_or(u32::MAX);
            kept.push(*point);
        }
    }
    let removed = mesh.vertices.len() - kept.len();
    mesh.vertices = kept;
    for face in &mut mesh.faces {
        for v in face.iter_mut() {
            *v = remap[*v as usize];
        }
    }
    removed
}

/// Copies the given faces into a new mesh holding only the vertices they use.
pub(super) fn extract_faces(mesh: &PolyMesh, faces: &[usize]) -> PolyMesh {
    let mut remap: HashMap<u32, u32> = HashMap::new();
    let mut vertices = Vec::new();
    let mut new_faces = Vec::with_capacity(faces.len());

    for &f in faces {
        let face: Vec<u32> = mesh.faces[f]
            .iter()
            .map(|&v| {
                *remap.entry(v).or_insert_with(|| {
                    vertices.push(mesh.vertices[v as usize]);
                    u32::try_from(vertices.len() - 1).unwrap_or(u32::MAX)
                })
            })
            .collect();
        new_faces.push(face);
    }

    PolyMesh::from_parts(vertices, new_faces)
}

/// Concatenates meshes into one, offsetting vertex indices.
pub(super) fn concatenate(meshes: Vec<PolyMesh>) -> PolyMesh {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    for mesh in meshes {
        let offset = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
        vertices.extend(mesh.vertices);
        faces.extend(
            mesh.faces
                .into_iter()
                .map(|face| face.into_iter().map(|v| v + offset).collect::<Vec<u32>>()),
        );
    }
    PolyMesh::from_parts(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn mesh(vertices: Vec<Point3>, faces: Vec<Vec<u32>>) -> PolyMesh {
        PolyMesh::from_parts(vertices, faces)
    }

    #[test]
    fn weld_merges_close_vertices_only() {
        let mut m = mesh(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(1.0005, 0.0, 0.0),
            ],
            vec![vec![0, 1, 2], vec![3, 2, 1]],
        );
        assert_eq!(weld_vertices(&mut m, 0.001, None), 1);
        assert_eq!(m.faces[1], vec![1, 2, 1]);
    }

    #[test]
    fn weld_respects_eligibility() {
        let mut m = mesh(
            vec![p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)],
            vec![vec![0, 1, 2]],
        );
        assert_eq!(weld_vertices(&mut m, 0.1, Some(&[true, false, true])), 0);
    }

    #[test]
    fn degenerate_faces_are_dropped() {
        let mut m = mesh(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![vec![0, 1, 1], vec![0, 1, 2], vec![0, 1, 3]],
        );
        assert_eq!(remove_degenerate_faces(&mut m), 2);
        assert_eq!(m.faces, vec![vec![0, 1, 3]]);
    }

    #[test]
    fn duplicate_faces_ignore_winding() {
        let mut m = mesh(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![vec![0, 1, 2], vec![2, 1, 0]],
        );
        assert_eq!(remove_duplicate_faces(&mut m), 1);
    }

    #[test]
    fn compaction_renumbers_faces() {
        let mut m = mesh(
            vec![p(9.0, 9.0, 9.0), p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![vec![1, 2, 3]],
        );
        assert_eq!(remove_unreferenced_vertices(&mut m), 1);
        assert_eq!(m.faces, vec![vec![0, 1, 2]]);
    }
}
