//! Read-only topology queries.
//!
//! Each query is an operation struct: configure it with `new` and the
//! `with_*` builders, then call `execute(&geometry, &ctx)`.

pub mod adjacency;
pub mod boundary;
pub mod classify;
pub mod components;
pub mod diagnose;
pub mod features;
pub mod non_manifold;
pub mod vertex;

pub use adjacency::{AdjacencyReport, EdgeAdjacency};
pub use boundary::{BoundaryLoop, BoundaryLoopReport, BoundaryLoops, NakedEdgeReport, NakedEdges};
pub use classify::{ClassifyEdges, EdgeClass, EdgeClassReport};
pub use components::{Component, ComponentReport, ConnectedComponents};
pub use diagnose::{suggest_strategies, Diagnose, Diagnosis, NearMissPair};
pub use features::{genus_from_counts, ExtractFeatures, FeatureLoop, LoopSource, TopologicalFeatures};
pub use non_manifold::{NonManifoldEdges, NonManifoldReport};
pub use vertex::{VertexReport, VertexTopology};
