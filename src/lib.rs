pub mod analysis;
pub mod brep;
pub mod context;
pub mod error;
pub mod heal;
pub mod math;
pub mod mesh;
pub mod outcome;
pub mod provider;

pub use context::ToleranceContext;
pub use error::{Result, TopoHealError};
pub use outcome::{run, TopologyOutcome, TopologyRequest};
pub use provider::AdjacencyProvider;
