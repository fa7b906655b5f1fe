use tracing::{debug, warn};

use crate::context::{ToleranceContext, MAX_PAIRWISE_NAKED_EDGES};
use crate::error::Result;
use crate::heal::HealingStrategy;
use crate::math::distance::{endpoint_gap, polyline_to_polyline};
use crate::math::Point3;
use crate::provider::{ensure_supported, require_valid, AdjacencyProvider};

/// Two naked edges whose separation lies inside the near-miss band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearMissPair {
    /// The lower edge index of the pair.
    pub edge_a: usize,
    /// The higher edge index of the pair.
    pub edge_b: usize,
    /// Separation of the two edges.
    pub distance: f64,
}

/// Near-miss gaps and the strategies worth trying.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    /// Number of naked edges.
    pub naked_edge_count: usize,
    /// Number of edges with more than two faces.
    pub non_manifold_edge_count: usize,
    /// Pairs whose closest endpoints fall in the band.
    pub gaps: Vec<NearMissPair>,
    /// Pairs whose closest points fall in the band.
    pub near_misses: Vec<NearMissPair>,
    /// `false` when the naked edge count tripped the pairwise guard.
    pub pairwise_checked: bool,
    /// Empty exactly when no problem was found.
    pub suggested_strategies: Vec<HealingStrategy>,
}

/// Strategies to try for a combination of problems, most promising first.
#[must_use]
pub fn suggest_strategies(naked: bool, non_manifold: bool, near_miss: bool) -> Vec<HealingStrategy> {
    use HealingStrategy::{
        AggressiveJoin, CombinedRepairAndJoin, ComponentJoin, ConservativeRepair, ModerateJoin,
        TargetedJoin,
    };
    match (naked, non_manifold, near_miss) {
        (false, false, false) => vec![],
        (false, false, true) => vec![TargetedJoin],
        (false, true, false) => vec![ConservativeRepair],
        (false, true, true) => vec![ConservativeRepair, TargetedJoin],
        (true, false, false) => vec![ModerateJoin, CombinedRepairAndJoin, ComponentJoin],
        (true, false, true) => vec![TargetedJoin, AggressiveJoin, ModerateJoin],
        (true, true, false) => vec![CombinedRepairAndJoin, ConservativeRepair, ModerateJoin],
        (true, true, true) => vec![CombinedRepairAndJoin, TargetedJoin, AggressiveJoin],
    }
}

/// Looks for near-miss gaps between naked edges and suggests strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnose;

impl Diagnose {
    /// Creates a new `Diagnose` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the diagnosis.
    ///
    /// Pairwise searches are skipped once the naked edge count reaches
    /// [`MAX_PAIRWISE_NAKED_EDGES`]; both pair lists are then empty.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AnalysisError::DiagnosisPreconditionFailed`]
    /// if the shape is not valid.
    pub fn execute<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        ctx: &ToleranceContext,
    ) -> Result<Diagnosis> {
        ensure_supported(geometry)?;
        require_valid(geometry, "diagnosis")?;

        let mut naked: Vec<(usize, Vec<Point3>)> = Vec::new();
        let mut non_manifold_edge_count = 0;
        for edge in 0..geometry.edge_count() {
            match geometry.edge_valence(edge) {
                1 => naked.push((edge, geometry.edge_polyline(edge))),
                v if v > 2 => non_manifold_edge_count += 1,
                _ => {}
            }
        }

        let pairwise_checked = naked.len() < MAX_PAIRWISE_NAKED_EDGES;
        let mut gaps = Vec::new();
        let mut near_misses = Vec::new();
        if pairwise_checked {
            for (i, (a, curve_a)) in naked.iter().enumerate() {
                for (b, curve_b) in &naked[i + 1..] {
                    let gap = endpoint_gap(curve_a, curve_b);
                    if ctx.is_near_miss(gap) {
                        gaps.push(NearMissPair {
                            edge_a: *a,
                            edge_b: *b,
                            distance: gap,
                        });
                    }
                    let distance = polyline_to_polyline(curve_a, curve_b);
                    if ctx.is_near_miss(distance) {
                        near_misses.push(NearMissPair {
                            edge_a: *a,
                            edge_b: *b,
                            distance,
                        });
                    }
                }
            }
        } else {
            warn!(
                naked = naked.len(),
                limit = MAX_PAIRWISE_NAKED_EDGES,
                "too many naked edges, skipping near-miss search"
            );
        }

        let suggested_strategies = suggest_strategies(
            !naked.is_empty(),
            non_manifold_edge_count > 0,
            !near_misses.is_empty(),
        );
        debug!(
            naked = naked.len(),
            non_manifold = non_manifold_edge_count,
            gaps = gaps.len(),
            near_misses = near_misses.len(),
            "diagnosed topology"
        );
        Ok(Diagnosis {
            naked_edge_count: naked.len(),
            non_manifold_edge_count,
            gaps,
            near_misses,
            pairwise_checked,
            suggested_strategies,
        })
    }
}
