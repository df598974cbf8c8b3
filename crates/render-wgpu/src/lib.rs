//! wgpu render backend for the lift simulator.
//!
//! Draws the ground slab, the spinning sun, the glowing flight boundary, the
//! plane model and the airflow streamlines. The camera is an orbit camera
//! with damping.
//!
//! # Invariants
//! - Renderer never mutates simulation state.
//! - Camera motion is NOT part of the simulation.
//! - Simulation tick is separate from render frame rate.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;
