//! A minimal boundary-representation kernel: a slotmap arena of vertices,
//! straight edges, wires, faces and shells, plus the sewing primitives the
//! healer needs.

mod builder;
mod index;
mod sew;
mod shape;
mod store;
mod surface;

pub use builder::{MakeBox, ShellBuilder};
pub use shape::BrepShape;
pub use store::{
    EdgeData, EdgeId, FaceData, FaceId, OrientedEdge, ShellData, ShellId, TopologyStore,
    VertexData, VertexId, WireData, WireId,
};
pub use surface::FaceSurface;
