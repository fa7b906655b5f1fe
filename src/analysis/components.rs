use std::collections::VecDeque;

use tracing::debug;

use crate::context::ToleranceContext;
use crate::error::Result;
use crate::math::Aabb;
use crate::provider::{ensure_supported, AdjacencyProvider};

/// Labels the connected components of an implicit face graph.
///
/// BFS seeds from the lowest unvisited face, so components come out ordered
/// by their smallest face index and each component's faces are in BFS order.
/// `neighbors` is called once per face.
pub fn label_components<F>(face_count: usize, mut neighbors: F) -> Vec<Vec<usize>>
where
    F: FnMut(usize) -> Vec<usize>,
{
    let mut visited = vec![false; face_count];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..face_count {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);
        let mut members = Vec::new();
        while let Some(face) = queue.pop_front() {
            members.push(face);
            for next in neighbors(face) {
                if next < face_count && !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        components.push(members);
    }
    components
}

/// One connected piece of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Zero-based component number, in seed order.
    pub index: usize,
    /// Member faces in BFS order.
    pub faces: Vec<usize>,
    /// Number of member faces.
    pub size: usize,
    /// Union of the member faces' bounding boxes.
    pub bounding_box: Aabb,
}

/// Connected components plus the full face adjacency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentReport {
    /// Components in order of their lowest face.
    pub components: Vec<Component>,
    /// Neighbors of every face, indexed by face.
    pub adjacency_graph: Vec<Vec<usize>>,
    /// Number of components.
    pub total_components: usize,
    /// `true` when the shape is exactly one component.
    pub is_fully_connected: bool,
}

/// Partitions faces into edge-connected components.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponents;

impl ConnectedComponents {
    /// Creates a new `ConnectedComponents` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs BFS over face adjacency.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AnalysisError::UnsupportedGeometryKind`] for
    /// unsupported shapes.
    pub fn execute<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        _ctx: &ToleranceContext,
    ) -> Result<ComponentReport> {
        ensure_supported(geometry)?;
        let face_count = geometry.face_count();
        let adjacency_graph: Vec<Vec<usize>> = (0..face_count)
            .map(|f| geometry.face_adjacent_faces(f))
            .collect();

        let components: Vec<Component> =
            label_components(face_count, |f| adjacency_graph[f].clone())
                .into_iter()
                .enumerate()
                .map(|(index, faces)| {
                    let bounding_box = faces
                        .iter()
                        .map(|&f| geometry.face_bounding_box(f))
                        .fold(Aabb::empty(), |acc, b| acc.union(&b));
                    Component {
                        index,
                        size: faces.len(),
                        faces,
                        bounding_box,
                    }
                })
                .collect();

        let total_components = components.len();
        debug!(faces = face_count, total_components, "labelled components");
        Ok(ComponentReport {
            components,
            adjacency_graph,
            total_components,
            is_fully_connected: total_components == 1,
        })
    }
}
