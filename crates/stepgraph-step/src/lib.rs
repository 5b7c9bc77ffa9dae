//! STEP (ISO 10303-21) decoding for stepgraph.
//!
//! This crate is the CAD-kernel collaborator: it turns a Part 21 file
//! into named shape handles implementing [`stepgraph_core::Shape`],
//! extracting only what the graph builders need: vertex coordinates,
//! edge segments, and the shell/face/edge containment structure.

pub mod document;
pub mod error;
pub mod syntax;

pub use document::{BrepShape, StepDocument};
pub use error::StepError;
