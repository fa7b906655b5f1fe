//! Progressive topology healing.
//!
//! [`Heal`] tries each strategy on a fresh duplicate of the input, validates
//! the candidate and keeps the best one. The input is never modified.

mod strategy;

pub use strategy::{HealingStrategy, MAX_TARGETED_PASSES};

use tracing::{debug, info, warn};

use crate::context::ToleranceContext;
use crate::error::{AnalysisError, Result};
use crate::provider::{ensure_supported, AdjacencyProvider};

/// What happened to one strategy's candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The action reported failure, or no duplicate could be made.
    ActionFailed,
    /// The action succeeded but left invalid topology.
    Invalid,
    /// Valid, but not better than the best so far.
    NotImproved { naked: usize },
    /// Adopted as the new best.
    Improved { naked: usize },
}

/// One strategy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    /// The strategy tried.
    pub strategy: HealingStrategy,
    /// What became of its candidate.
    pub outcome: AttemptOutcome,
}

/// The geometry the healer settled on.
///
/// `success` is `false` when no strategy reduced the naked edge count; the
/// healed geometry is then the first candidate that validated, so callers
/// must check both.
#[derive(Debug, Clone)]
pub struct HealingResult<P> {
    /// The kept candidate; the input is untouched.
    pub healed: P,
    /// The strategy that produced `healed`.
    pub strategy: HealingStrategy,
    /// `true` if `healed` has fewer naked edges than the input.
    pub success: bool,
    /// Naked edge count of the input.
    pub original_naked_edges: usize,
    /// Naked edge count of `healed`.
    pub healed_naked_edges: usize,
    /// Every attempt in trial order.
    pub attempts: Vec<Attempt>,
}

struct Kept<P> {
    geometry: P,
    strategy: HealingStrategy,
    naked: usize,
}

/// Tries healing strategies in order and keeps the best valid result.
#[derive(Debug, Clone)]
pub struct Heal {
    strategies: Vec<HealingStrategy>,
}

impl Default for Heal {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Heal {
    /// Creates a healer. An empty list means every strategy, in
    /// [`HealingStrategy::ALL`] order.
    #[must_use]
    pub fn new(strategies: Vec<HealingStrategy>) -> Self {
        let strategies = if strategies.is_empty() {
            HealingStrategy::ALL.to_vec()
        } else {
            strategies
        };
        Self { strategies }
    }

    /// The strategies in trial order.
    #[must_use]
    pub fn strategies(&self) -> &[HealingStrategy] {
        &self.strategies
    }

    /// Runs the strategies against duplicates of `geometry`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DiagnosisPreconditionFailed`] if the input
    /// cannot be duplicated and [`AnalysisError::HealingExhausted`] if no
    /// candidate produced valid topology.
    pub fn execute<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        ctx: &ToleranceContext,
    ) -> Result<HealingResult<P>> {
        ensure_supported(geometry)?;
        let mut spare = Some(geometry.duplicate().ok_or_else(|| {
            AnalysisError::DiagnosisPreconditionFailed {
                stage: "healing",
                reason: "geometry could not be duplicated".into(),
            }
        })?);

        let original = geometry.naked_edge_count();
        let mut best_count = original;
        let mut kept: Option<Kept<P>> = None;
        let mut improved = false;
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for &strategy in &self.strategies {
            let outcome = match spare.take().or_else(|| geometry.duplicate()) {
                None => AttemptOutcome::ActionFailed,
                Some(candidate) => match strategy.apply(candidate, ctx) {
                    None => AttemptOutcome::ActionFailed,
                    Some(candidate) => {
                        let report = candidate.validity();
                        if report.is_valid() {
                            let naked = candidate.naked_edge_count();
                            if naked < original && naked < best_count {
                                best_count = naked;
                                improved = true;
                                kept = Some(Kept {
                                    geometry: candidate,
                                    strategy,
                                    naked,
                                });
                                AttemptOutcome::Improved { naked }
                            } else {
                                if kept.is_none() {
                                    kept = Some(Kept {
                                        geometry: candidate,
                                        strategy,
                                        naked,
                                    });
                                }
                                AttemptOutcome::NotImproved { naked }
                            }
                        } else {
                            warn!(%strategy, problems = %report.log(), "candidate failed validation");
                            AttemptOutcome::Invalid
                        }
                    }
                },
            };
            debug!(%strategy, ?outcome, "healing attempt");
            attempts.push(Attempt { strategy, outcome });
        }

        let Some(kept) = kept else {
            warn!(attempted = attempts.len(), "no healing candidate validated");
            return Err(AnalysisError::HealingExhausted {
                attempted: attempts.len(),
            }
            .into());
        };

        info!(
            strategy = %kept.strategy,
            original,
            healed = kept.naked,
            success = improved,
            "healing finished"
        );
        Ok(HealingResult {
            healed: kept.geometry,
            strategy: kept.strategy,
            success: improved,
            original_naked_edges: original,
            healed_naked_edges: kept.naked,
            attempts,
        })
    }
}
