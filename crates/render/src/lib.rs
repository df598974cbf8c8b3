//! Rendering adapter: renderer-agnostic scene geometry and interface.
//!
//! # Invariants
//! - Renderers read simulation state; they never mutate it.
//! - Geometry here is backend-neutral; GPU backends upload it as-is.

pub mod geometry;
mod renderer;

pub use geometry::{LineVertex, MeshData, MeshVertex};
pub use renderer::{DebugTextRenderer, FrameState, RenderView, Renderer};
