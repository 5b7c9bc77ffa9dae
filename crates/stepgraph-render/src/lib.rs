//! Visualization outputs: wireframe part images, static SVG diagrams
//! and interactive HTML views of assembly graphs.

pub mod context;
pub mod error;
pub mod html;
pub mod layout;
pub mod svg;

pub use context::RenderContext;
pub use error::RenderError;
pub use layout::force_layout;
