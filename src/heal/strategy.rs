use std::fmt;

use tracing::{debug, trace};

use crate::context::ToleranceContext;
use crate::math::Point3;
use crate::provider::AdjacencyProvider;

/// Maximum number of passes of [`HealingStrategy::TargetedJoin`].
pub const MAX_TARGETED_PASSES: usize = 100;

/// Tolerance multiplier for repair steps.
const REPAIR_FACTOR: f64 = 0.1;

/// Tolerance multiplier for joins at document tolerance.
const JOIN_FACTOR: f64 = 1.0;

/// Tolerance multiplier for aggressive joins.
const AGGRESSIVE_FACTOR: f64 = 10.0;

/// A repair action the healer can try, with its tolerance multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealingStrategy {
    /// Generic repair at 0.1x tolerance.
    ConservativeRepair,
    /// Naked edge join at 1x tolerance.
    ModerateJoin,
    /// Naked edge join at 10x tolerance.
    AggressiveJoin,
    /// Repair at 0.1x, then join at 1x.
    CombinedRepairAndJoin,
    /// Passes of pairwise joins of the closest naked edges at 10x.
    TargetedJoin,
    /// Split into components and join them back at 1x.
    ComponentJoin,
}

impl HealingStrategy {
    /// All strategies in the order the healer tries them by default.
    pub const ALL: [Self; 6] = [
        Self::ConservativeRepair,
        Self::ModerateJoin,
        Self::AggressiveJoin,
        Self::CombinedRepairAndJoin,
        Self::TargetedJoin,
        Self::ComponentJoin,
    ];

    /// Multiplier applied to the absolute tolerance. For
    /// [`HealingStrategy::CombinedRepairAndJoin`] this is the repair step's
    /// multiplier; its join step runs at 1x.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::ConservativeRepair | Self::CombinedRepairAndJoin => REPAIR_FACTOR,
            Self::ModerateJoin | Self::ComponentJoin => JOIN_FACTOR,
            Self::AggressiveJoin | Self::TargetedJoin => AGGRESSIVE_FACTOR,
        }
    }

    /// Runs the strategy on an owned candidate.
    ///
    /// Returns the modified candidate if the action succeeded. On failure the
    /// candidate is dropped.
    pub(crate) fn apply<P: AdjacencyProvider>(
        self,
        mut candidate: P,
        ctx: &ToleranceContext,
    ) -> Option<P> {
        let tol = ctx.absolute_tolerance() * self.multiplier();
        let ok = match self {
            Self::ConservativeRepair => candidate.repair(tol),
            Self::ModerateJoin | Self::AggressiveJoin => candidate.join_naked_edges(tol) > 0,
            Self::CombinedRepairAndJoin => {
                candidate.repair(tol)
                    && candidate.join_naked_edges(ctx.absolute_tolerance() * JOIN_FACTOR) > 0
            }
            Self::TargetedJoin => targeted_join(&mut candidate, tol) > 0,
            Self::ComponentJoin => return component_join(candidate, tol),
        };
        ok.then_some(candidate)
    }
}

impl fmt::Display for HealingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConservativeRepair => "conservative repair",
            Self::ModerateJoin => "moderate join",
            Self::AggressiveJoin => "aggressive join",
            Self::CombinedRepairAndJoin => "combined repair and join",
            Self::TargetedJoin => "targeted join",
            Self::ComponentJoin => "component join",
        };
        f.write_str(name)
    }
}

/// Largest endpoint distance when the two segments are laid onto each other
/// in their better orientation.
fn pair_gap(a: (Point3, Point3), b: (Point3, Point3)) -> f64 {
    let same = (a.0 - b.0).norm().max((a.1 - b.1).norm());
    let flipped = (a.0 - b.1).norm().max((a.1 - b.0).norm());
    same.min(flipped)
}

/// Current index of the naked edge closest to `ends`, if one lies within
/// `tolerance`.
fn locate<P: AdjacencyProvider>(
    geometry: &P,
    ends: (Point3, Point3),
    tolerance: f64,
    skip: Option<usize>,
) -> Option<usize> {
    (0..geometry.edge_count())
        .filter(|&e| Some(e) != skip && geometry.edge_valence(e) == 1)
        .map(|e| (pair_gap(geometry.edge_endpoints(e), ends), e))
        .filter(|&(gap, _)| gap <= tolerance)
        .min_by(|x, y| x.0.total_cmp(&y.0))
        .map(|(_, e)| e)
}

fn targeted_join<P: AdjacencyProvider>(geometry: &mut P, tolerance: f64) -> usize {
    join_closest_pairs(geometry, tolerance, MAX_TARGETED_PASSES)
}

/// Joins naked edge pairs closest first, in passes. A pass collects every
/// pair within `tolerance` and joins those whose edges are still untouched
/// in that pass. Stops when a pass joins nothing or after `max_passes`.
/// Returns the number of joins.
fn join_closest_pairs<P: AdjacencyProvider>(
    geometry: &mut P,
    tolerance: f64,
    max_passes: usize,
) -> usize {
    let mut joins = 0;
    for pass in 0..max_passes {
        let naked: Vec<(Point3, Point3)> = (0..geometry.edge_count())
            .filter(|&e| geometry.edge_valence(e) == 1)
            .map(|e| geometry.edge_endpoints(e))
            .collect();
        let mut pairs = Vec::new();
        for (i, &a) in naked.iter().enumerate() {
            for (j, &b) in naked.iter().enumerate().skip(i + 1) {
                let gap = pair_gap(a, b);
                if gap <= tolerance {
                    pairs.push((gap, i, j));
                }
            }
        }
        pairs.sort_by(|x, y| x.0.total_cmp(&y.0));

        let mut touched = vec![false; naked.len()];
        let mut joined = 0;
        for &(_, i, j) in &pairs {
            if touched[i] || touched[j] {
                continue;
            }
            // Joins renumber edges, so both are found again by position.
            let Some(a) = locate(geometry, naked[i], tolerance, None) else {
                continue;
            };
            let Some(b) = locate(geometry, naked[j], tolerance, Some(a)) else {
                continue;
            };
            if geometry.join_two_edges(a, b, tolerance) {
                touched[i] = true;
                touched[j] = true;
                joined += 1;
            }
        }
        trace!(pass, candidates = pairs.len(), joined, "targeted join pass");
        if joined == 0 {
            debug!(pass, joins, "targeted join converged");
            return joins;
        }
        joins += joined;
    }
    debug!(joins, "targeted join hit the pass cap");
    joins
}

/// Splits into components and joins them back. Succeeds only if everything
/// ends up as a single shape.
fn component_join<P: AdjacencyProvider>(geometry: P, tolerance: f64) -> Option<P> {
    let pieces = geometry.connected_components();
    drop(geometry);
    let mut joined = P::join_shapes(pieces, tolerance);
    if joined.len() == 1 {
        joined.pop()
    } else {
        debug!(pieces = joined.len(), "component join left several shapes");
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::PolyMesh;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Two unit squares side by side, the second shifted right by `gap`.
    fn split_pair(gap: f64) -> PolyMesh {
        PolyMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(1.0 + gap, 0.0, 0.0),
                p(2.0, 0.0, 0.0),
                p(2.0, 1.0, 0.0),
                p(1.0 + gap, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]],
        )
        .unwrap()
    }

    fn ctx() -> ToleranceContext {
        ToleranceContext::default()
    }

    #[test]
    fn multipliers() {
        assert!((HealingStrategy::CombinedRepairAndJoin.multiplier() - 0.1).abs() < 1e-12);
        assert!((HealingStrategy::AggressiveJoin.multiplier() - 10.0).abs() < 1e-12);
        assert!((HealingStrategy::ComponentJoin.multiplier() - 1.0).abs() < 1e-12);
        assert!((HealingStrategy::ConservativeRepair.multiplier() - 0.1).abs() < 1e-12);
        assert!((HealingStrategy::ModerateJoin.multiplier() - 1.0).abs() < 1e-12);
        assert!((HealingStrategy::TargetedJoin.multiplier() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn moderate_join_closes_small_gap() {
        let healed = HealingStrategy::ModerateJoin
            .apply(split_pair(0.0005), &ctx())
            .unwrap();
        assert_eq!(healed.naked_edge_count(), 6);
    }

    #[test]
    fn moderate_join_fails_on_wider_gap() {
        assert!(HealingStrategy::ModerateJoin
            .apply(split_pair(0.005), &ctx())
            .is_none());
    }

    #[test]
    fn aggressive_and_targeted_join_reach_ten_times_further() {
        assert!(HealingStrategy::AggressiveJoin
            .apply(split_pair(0.005), &ctx())
            .is_some());
        let healed = HealingStrategy::TargetedJoin
            .apply(split_pair(0.005), &ctx())
            .unwrap();
        assert_eq!(healed.naked_edge_count(), 6);
    }

    #[test]
    fn component_join_needs_a_single_result() {
        assert!(HealingStrategy::ComponentJoin
            .apply(split_pair(0.0005), &ctx())
            .is_some());
        assert!(HealingStrategy::ComponentJoin
            .apply(split_pair(0.5), &ctx())
            .is_none());
    }

    #[test]
    fn targeted_join_without_pairs_fails() {
        let mut mesh = split_pair(0.5);
        assert_eq!(targeted_join(&mut mesh, 0.01), 0);
    }

    #[test]
    fn combined_repairs_then_joins() {
        let healed = HealingStrategy::CombinedRepairAndJoin
            .apply(split_pair(0.0005), &ctx())
            .unwrap();
        assert_eq!(healed.naked_edge_count(), 6);
    }

    #[test]
    fn combined_fails_when_join_finds_nothing() {
        assert!(HealingStrategy::ConservativeRepair
            .apply(split_pair(0.5), &ctx())
            .is_some());
        assert!(HealingStrategy::CombinedRepairAndJoin
            .apply(split_pair(0.5), &ctx())
            .is_none());
    }

    /// `count` split pairs stacked along +Y, each seam gapped by `gap`.
    fn split_pairs(count: u32, gap: f64) -> PolyMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for k in 0..count {
            let y = 3.0 * f64::from(k);
            let base = 8 * k;
            for (x0, x1) in [(0.0, 1.0), (1.0 + gap, 2.0)] {
                vertices.extend([p(x0, y, 0.0), p(x1, y, 0.0), p(x1, y + 1.0, 0.0), p(x0, y + 1.0, 0.0)]);
            }
            faces.push(vec![base, base + 1, base + 2, base + 3]);
            faces.push(vec![base + 4, base + 5, base + 6, base + 7]);
        }
        PolyMesh::new(vertices, faces).unwrap()
    }

    #[test]
    fn targeted_join_closes_more_seams_than_passes() {
        let count = u32::try_from(MAX_TARGETED_PASSES).unwrap() + 20;
        let mut mesh = split_pairs(count, 0.005);
        assert_eq!(mesh.naked_edge_count(), 8 * count as usize);
        assert_eq!(targeted_join(&mut mesh, 0.01), count as usize);
        assert_eq!(mesh.naked_edge_count(), 6 * count as usize);
    }

    /// A seam whose join pulls a second seam into tolerance: square B gaps
    /// square A by 0.004 at one corner, and square C sits 0.008 below B but
    /// 0.012 below B's lifted corner until A and B are joined.
    fn cascading_seams() -> PolyMesh {
        PolyMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(1.0, 0.004, 0.0),
                p(2.0, 0.0, 0.0),
                p(2.0, 1.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(1.0, -1.0, 0.0),
                p(2.0, -1.0, 0.0),
                p(2.0, -0.008, 0.0),
                p(1.0, -0.008, 0.0),
            ],
            vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9, 10, 11]],
        )
        .unwrap()
    }

    #[test]
    fn targeted_join_stops_at_the_pass_cap() {
        let mut capped = cascading_seams();
        assert_eq!(capped.naked_edge_count(), 12);
        assert_eq!(join_closest_pairs(&mut capped, 0.01, 1), 1);
        assert_eq!(capped.naked_edge_count(), 10);

        let mut full = cascading_seams();
        assert_eq!(targeted_join(&mut full, 0.01), 2);
        assert_eq!(full.naked_edge_count(), 8);
    }
}
