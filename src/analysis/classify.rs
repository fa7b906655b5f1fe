use std::collections::HashMap;

use tracing::debug;

use crate::context::ToleranceContext;
use crate::error::Result;
use crate::provider::{ensure_supported, AdjacencyProvider, Continuity};

use super::adjacency::dihedral_angle;

/// Fraction of the angle threshold below which a mesh edge counts as
/// curvature-continuous.
pub const CURVATURE_THRESHOLD_FACTOR: f64 = 0.1;

/// Continuity category of an edge. Every edge has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeClass {
    /// Interior edge with a crease.
    Sharp,
    /// Interior edge with tangent-continuous faces.
    Smooth,
    /// Interior edge with curvature-continuous faces.
    Curvature,
    /// Interior edge that is neither smooth nor required to be sharp.
    Interior,
    /// Naked edge.
    Boundary,
    /// Edge with more than two faces.
    NonManifold,
}

impl EdgeClass {
    /// All classes in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Sharp,
        Self::Smooth,
        Self::Curvature,
        Self::Interior,
        Self::Boundary,
        Self::NonManifold,
    ];
}

/// Per-edge classes with a class-to-edges index.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeClassReport {
    /// Class of every edge, indexed by edge.
    pub classes: Vec<EdgeClass>,
    /// Edge lengths, indexed by edge.
    pub measures: Vec<f64>,
    /// Edges of every class in ascending order. Every class has an entry.
    pub groups: HashMap<EdgeClass, Vec<usize>>,
}

impl EdgeClassReport {
    /// Edges in `class`.
    #[must_use]
    pub fn members(&self, class: EdgeClass) -> &[usize] {
        self.groups.get(&class).map(Vec::as_slice).unwrap_or_default()
    }

    /// Class of `edge`, if the edge exists.
    #[must_use]
    pub fn class_of(&self, edge: usize) -> Option<EdgeClass> {
        self.classes.get(edge).copied()
    }
}

/// Classifies every edge by valence, then by continuity.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyEdges {
    minimum_continuity: Continuity,
    angle_threshold: Option<f64>,
}

impl Default for ClassifyEdges {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifyEdges {
    /// Creates a classifier requiring G1 and using the context angle tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            minimum_continuity: Continuity::G1,
            angle_threshold: None,
        }
    }

    /// Sets the continuity at or above which a non-smooth interior edge is
    /// reported as [`EdgeClass::Sharp`] rather than [`EdgeClass::Interior`].
    #[must_use]
    pub fn with_minimum_continuity(mut self, minimum_continuity: Continuity) -> Self {
        self.minimum_continuity = minimum_continuity;
        self
    }

    /// Sets the smoothness angle threshold in radians.
    #[must_use]
    pub fn with_angle_threshold(mut self, angle_threshold: f64) -> Self {
        self.angle_threshold = Some(angle_threshold);
        self
    }

    /// Classifies all edges.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AnalysisError::UnsupportedGeometryKind`] for
    /// unsupported shapes.
    pub fn execute<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        ctx: &ToleranceContext,
    ) -> Result<EdgeClassReport> {
        ensure_supported(geometry)?;
        let angle_threshold = self.angle_threshold.unwrap_or(ctx.angle_tolerance());
        let edge_count = geometry.edge_count();

        let mut groups: HashMap<EdgeClass, Vec<usize>> =
            EdgeClass::ALL.iter().map(|&c| (c, Vec::new())).collect();
        let mut classes = Vec::with_capacity(edge_count);
        let mut measures = Vec::with_capacity(edge_count);

        for edge in 0..edge_count {
            let class = self.classify(geometry, edge, angle_threshold);
            classes.push(class);
            measures.push(geometry.edge_length(edge));
            groups.entry(class).or_default().push(edge);
        }

        debug!(
            edges = edge_count,
            sharp = groups[&EdgeClass::Sharp].len(),
            boundary = groups[&EdgeClass::Boundary].len(),
            non_manifold = groups[&EdgeClass::NonManifold].len(),
            "classified edges"
        );
        Ok(EdgeClassReport {
            classes,
            measures,
            groups,
        })
    }

    fn classify<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        edge: usize,
        angle_threshold: f64,
    ) -> EdgeClass {
        match geometry.edge_valence(edge) {
            1 => return EdgeClass::Boundary,
            v if v > 2 => return EdgeClass::NonManifold,
            _ => {}
        }

        let (curvature, smooth) = match (
            geometry.edge_continuity(edge, Continuity::G2, angle_threshold),
            geometry.edge_continuity(edge, Continuity::G1, angle_threshold),
        ) {
            (Some(g2), Some(g1)) => (g2, g1),
            _ => match dihedral_angle(geometry, edge) {
                Some(angle) => (
                    angle <= angle_threshold * CURVATURE_THRESHOLD_FACTOR,
                    angle <= angle_threshold,
                ),
                None => (false, false),
            },
        };

        if curvature {
            EdgeClass::Curvature
        } else if smooth {
            EdgeClass::Smooth
        } else if self.minimum_continuity >= Continuity::G1 {
            EdgeClass::Sharp
        } else {
            EdgeClass::Interior
        }
    }
}
