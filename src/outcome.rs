//! One entry point for every operation.
//!
//! [`run`] dispatches a [`TopologyRequest`] and wraps the report in the
//! matching [`TopologyOutcome`] variant. Errors come back as the `Err` arm.

use crate::analysis::{
    AdjacencyReport, BoundaryLoopReport, BoundaryLoops, ClassifyEdges, ComponentReport,
    ConnectedComponents, Diagnose, Diagnosis, EdgeAdjacency, EdgeClassReport, ExtractFeatures,
    NakedEdgeReport, NakedEdges, NonManifoldEdges, NonManifoldReport, TopologicalFeatures,
    VertexReport, VertexTopology,
};
use crate::context::ToleranceContext;
use crate::error::Result;
use crate::heal::{Heal, HealingResult, HealingStrategy};
use crate::provider::{AdjacencyProvider, Continuity};

/// An operation and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyRequest {
    NakedEdges,
    BoundaryLoops {
        tolerance: Option<f64>,
    },
    NonManifold,
    Components,
    ClassifyEdges {
        minimum_continuity: Continuity,
        angle_threshold: Option<f64>,
    },
    Adjacency {
        edge: usize,
    },
    Vertex {
        vertex: usize,
    },
    Features {
        min_hole_length: Option<f64>,
    },
    Diagnose,
    /// An empty list runs every strategy.
    Heal {
        strategies: Vec<HealingStrategy>,
    },
}

/// The report of a successful operation.
#[derive(Debug, Clone)]
pub enum TopologyOutcome<P> {
    NakedEdges(NakedEdgeReport),
    BoundaryLoops(BoundaryLoopReport),
    NonManifold(NonManifoldReport),
    Components(ComponentReport),
    EdgeClasses(EdgeClassReport),
    Adjacency(AdjacencyReport),
    Vertex(VertexReport),
    Features(TopologicalFeatures),
    Diagnosis(Diagnosis),
    Healing(HealingResult<P>),
}

impl<P> TopologyOutcome<P> {
    /// Short name of the operation that produced the outcome.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::NakedEdges(_) => "naked edges",
            Self::BoundaryLoops(_) => "boundary loops",
            Self::NonManifold(_) => "non-manifold edges",
            Self::Components(_) => "connected components",
            Self::EdgeClasses(_) => "edge classification",
            Self::Adjacency(_) => "edge adjacency",
            Self::Vertex(_) => "vertex topology",
            Self::Features(_) => "topological features",
            Self::Diagnosis(_) => "diagnosis",
            Self::Healing(_) => "healing",
        }
    }
}

/// Runs `request` against `geometry`.
///
/// # Errors
///
/// Returns whatever error the dispatched operation returns.
pub fn run<P: AdjacencyProvider>(
    geometry: &P,
    ctx: &ToleranceContext,
    request: TopologyRequest,
) -> Result<TopologyOutcome<P>> {
    let outcome = match request {
        TopologyRequest::NakedEdges => {
            TopologyOutcome::NakedEdges(NakedEdges::new().execute(geometry, ctx)?)
        }
        TopologyRequest::BoundaryLoops { tolerance } => TopologyOutcome::BoundaryLoops(
            BoundaryLoops::new()
                .with_tolerance(tolerance)
                .execute(geometry, ctx)?,
        ),
        TopologyRequest::NonManifold => {
            TopologyOutcome::NonManifold(NonManifoldEdges::new().execute(geometry, ctx)?)
        }
        TopologyRequest::Components => {
            TopologyOutcome::Components(ConnectedComponents::new().execute(geometry, ctx)?)
        }
        TopologyRequest::ClassifyEdges {
            minimum_continuity,
            angle_threshold,
        } => {
            let mut classifier = ClassifyEdges::new().with_minimum_continuity(minimum_continuity);
            if let Some(angle) = angle_threshold {
                classifier = classifier.with_angle_threshold(angle);
            }
            TopologyOutcome::EdgeClasses(classifier.execute(geometry, ctx)?)
        }
        TopologyRequest::Adjacency { edge } => {
            TopologyOutcome::Adjacency(EdgeAdjacency::new(edge).execute(geometry, ctx)?)
        }
        TopologyRequest::Vertex { vertex } => {
            TopologyOutcome::Vertex(VertexTopology::new(vertex).execute(geometry, ctx)?)
        }
        TopologyRequest::Features { min_hole_length } => {
            let mut query = ExtractFeatures::new();
            if let Some(length) = min_hole_length {
                query = query.with_min_hole_length(length);
            }
            TopologyOutcome::Features(query.execute(geometry, ctx)?)
        }
        TopologyRequest::Diagnose => {
            TopologyOutcome::Diagnosis(Diagnose::new().execute(geometry, ctx)?)
        }
        TopologyRequest::Heal { strategies } => {
            TopologyOutcome::Healing(Heal::new(strategies).execute(geometry, ctx)?)
        }
    };
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::brep::{BrepShape, MakeBox};
    use crate::error::{AnalysisError, TopoHealError};
    use crate::math::Point3;

    fn unit_box() -> BrepShape {
        MakeBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
            .execute()
            .unwrap()
    }

    #[test]
    fn dispatches_to_matching_variant() {
        let shape = unit_box();
        let ctx = ToleranceContext::default();
        let outcome = run(&shape, &ctx, TopologyRequest::Features { min_hole_length: None }).unwrap();
        let TopologyOutcome::Features(features) = outcome else {
            panic!("expected features");
        };
        assert_eq!(features.genus, 0);

        let outcome = run(&shape, &ctx, TopologyRequest::Components).unwrap();
        assert_eq!(outcome.operation(), "connected components");
    }

    #[test]
    fn errors_use_the_err_arm() {
        let err = run(
            &unit_box(),
            &ToleranceContext::default(),
            TopologyRequest::Adjacency { edge: 12 },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TopoHealError::Analysis(AnalysisError::InvalidIndex { index: 12, bound: 12, .. })
        ));
    }

    #[test]
    fn classify_request_applies_threshold() {
        let outcome = run(
            &unit_box(),
            &ToleranceContext::default(),
            TopologyRequest::ClassifyEdges {
                minimum_continuity: Continuity::C0,
                angle_threshold: Some(2.0),
            },
        )
        .unwrap();
        let TopologyOutcome::EdgeClasses(report) = outcome else {
            panic!("expected edge classes");
        };
        // Right-angle creases pass a 2 radian threshold, and planes share curvature.
        assert_eq!(report.members(crate::analysis::EdgeClass::Curvature).len(), 12);
    }
}
