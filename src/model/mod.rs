//! Process model representations.
//!
//! Miners produce a Petri net with an initial and final marking; the
//! complexity stage works on a BPMN-like diagram derived from it.

pub mod convert;
pub mod diagram;
pub mod petri;

pub use convert::{DiagramConverter, StructuralConverter};
pub use diagram::{Diagram, DiagramNode, GatewayKind};
pub use petri::{Marking, PetriNode, ProcessModel};
