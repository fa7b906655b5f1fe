//! Vertex welding, edge sewing and face copying on a [`TopologyStore`].

use std::collections::HashMap;

use crate::error::StoreError;
use crate::math::merge::PointMerger;

use super::store::{
    EdgeData, EdgeId, FaceData, FaceId, OrientedEdge, TopologyStore, VertexData, VertexId,
    WireData,
};

/// Clusters `candidates` by proximity and returns, for every vertex merged
/// away, the representative it merges into. The first vertex of a cluster
/// is its representative.
pub(super) fn cluster_vertices(
    store: &TopologyStore,
    candidates: &[VertexId],
    tolerance: f64,
) -> HashMap<VertexId, VertexId> {
    let mut merger = PointMerger::new(tolerance);
    let mut remap = HashMap::new();
    for &v in candidates {
        let Ok(data) = store.vertex(v) else {
            continue;
        };
        let representative = merger.get_or_insert(v, &data.point);
        if representative != v {
            remap.insert(v, representative);
        }
    }
    remap
}

/// Points every edge endpoint in `edges` at its representative and removes
/// the merged-away vertices.
pub(super) fn redirect_vertices(
    store: &mut TopologyStore,
    edges: &[EdgeId],
    remap: &HashMap<VertexId, VertexId>,
) {
    if remap.is_empty() {
        return;
    }
    for &e in edges {
        if let Ok(edge) = store.edge_mut(e) {
            if let Some(&to) = remap.get(&edge.start) {
                edge.start = to;
            }
            if let Some(&to) = remap.get(&edge.end) {
                edge.end = to;
            }
        }
    }
    for &from in remap.keys() {
        store.remove_vertex(from);
    }
}

/// Collapses edges of `sewable` that connect the same pair of vertices into
/// the first such edge, re-pointing wires of `faces` with the orientation
/// corrected. Collapsed (start == end) edges are left alone. Returns the
/// number of edges removed.
pub(super) fn merge_duplicate_edges(
    store: &mut TopologyStore,
    faces: &[FaceId],
    sewable: &[EdgeId],
) -> usize {
    let mut keepers: HashMap<(VertexId, VertexId), (EdgeId, VertexId)> = HashMap::new();
    let mut replacements: HashMap<EdgeId, (EdgeId, bool)> = HashMap::new();

    for &e in sewable {
        let Ok(&EdgeData { start, end }) = store.edge(e) else {
            continue;
        };
        if start == end {
            continue;
        }
        let key = if start < end { (start, end) } else { (end, start) };
        match keepers.get(&key) {
            Some(&(keep, keep_start)) => {
                replacements.insert(e, (keep, keep_start == start));
            }
            None => {
                keepers.insert(key, (e, start));
            }
        }
    }

    if replacements.is_empty() {
        return 0;
    }

    let wires: Vec<_> = faces
        .iter()
        .filter_map(|&f| store.face(f).ok())
        .flat_map(|face| face.wires().collect::<Vec<_>>())
        .collect();
    for wire in wires {
        if let Ok(data) = store.wire_mut(wire) {
            for oe in &mut data.edges {
                if let Some(&(keep, same_direction)) = replacements.get(&oe.edge) {
                    oe.edge = keep;
                    oe.forward = if same_direction { oe.forward } else { !oe.forward };
                }
            }
        }
    }
    for &dropped in replacements.keys() {
        store.remove_edge(dropped);
    }
    replacements.len()
}

/// Old-to-new id maps for one source store during [`copy_faces`].
#[derive(Debug, Default)]
pub(super) struct CopyMaps {
    vertices: HashMap<VertexId, VertexId>,
    edges: HashMap<EdgeId, EdgeId>,
}

/// Copies `faces` (with their wires, edges and vertices) from `src` into
/// `dst`, sharing entities already copied through `maps`.
pub(super) fn copy_faces(
    src: &TopologyStore,
    faces: &[FaceId],
    dst: &mut TopologyStore,
    maps: &mut CopyMaps,
) -> Result<Vec<FaceId>, StoreError> {
    let mut copied = Vec::with_capacity(faces.len());
    for &f in faces {
        let face = src.face(f)?;
        let outer_wire = copy_wire(src, face.outer_wire, dst, maps)?;
        let inner_wires = face
            .inner_wires
            .iter()
            .map(|&w| copy_wire(src, w, dst, maps))
            .collect::<Result<Vec<_>, _>>()?;
        copied.push(dst.add_face(FaceData {
            surface: face.surface.clone(),
            outer_wire,
            inner_wires,
            same_sense: face.same_sense,
        }));
    }
    Ok(copied)
}

fn copy_wire(
    src: &TopologyStore,
    wire: super::store::WireId,
    dst: &mut TopologyStore,
    maps: &mut CopyMaps,
) -> Result<super::store::WireId, StoreError> {
    let mut edges = Vec::new();
    for oe in &src.wire(wire)?.edges {
        let edge = match maps.edges.get(&oe.edge) {
            Some(&e) => e,
            None => {
                let data = src.edge(oe.edge)?;
                let start = copy_vertex(src, data.start, dst, maps)?;
                let end = copy_vertex(src, data.end, dst, maps)?;
                let e = dst.add_edge(EdgeData { start, end });
                maps.edges.insert(oe.edge, e);
                e
            }
        };
        edges.push(OrientedEdge::new(edge, oe.forward));
    }
    Ok(dst.add_wire(WireData { edges }))
}

fn copy_vertex(
    src: &TopologyStore,
    vertex: VertexId,
    dst: &mut TopologyStore,
    maps: &mut CopyMaps,
) -> Result<VertexId, StoreError> {
    if let Some(&v) = maps.vertices.get(&vertex) {
        return Ok(v);
    }
    let point = src.vertex(vertex)?.point;
    let v = dst.add_vertex(VertexData { point });
    maps.vertices.insert(vertex, v);
    Ok(v)
}
