use thiserror::Error;

/// Top-level error type for topology diagnosis and healing.
#[derive(Debug, Error)]
pub enum TopoHealError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Errors related to geometric inputs and tolerances.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
}

/// Errors raised by the B-rep topology arena.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors raised by the analysis and healing operations.
///
/// Empty but well-formed results (a shape with no naked edges, a diagnosis
/// with nothing to suggest) are never reported through this type.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unsupported geometry kind: {kind}")]
    UnsupportedGeometryKind { kind: String },

    #[error("{entity} index {index} is out of range [0, {bound})")]
    InvalidIndex {
        entity: &'static str,
        index: usize,
        bound: usize,
    },

    #[error("{stage} requires valid topology: {reason}")]
    DiagnosisPreconditionFailed { stage: &'static str, reason: String },

    #[error("feature extraction failed (Euler numerator {numerator}): {reason}")]
    FeatureExtractionFailed { numerator: i64, reason: String },

    #[error("all {attempted} healing strategies failed")]
    HealingExhausted { attempted: usize },
}

/// Convenience type alias for results using [`TopoHealError`].
pub type Result<T> = std::result::Result<T, TopoHealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_index_message_names_bound() {
        let err: TopoHealError = AnalysisError::InvalidIndex {
            entity: "edge",
            index: 12,
            bound: 12,
        }
        .into();
        assert_eq!(err.to_string(), "edge index 12 is out of range [0, 12)");
    }

    #[test]
    fn precondition_failure_carries_stage() {
        let err = AnalysisError::DiagnosisPreconditionFailed {
            stage: "diagnose",
            reason: "face 3 is degenerate".into(),
        };
        assert!(err.to_string().starts_with("diagnose requires valid topology"));
    }
}
