use crate::geometry::glow_color;
use glam::Vec3;
use liftsim_kernel::{AirflowSide, Environment, FlightSim, FlightSummary, Pressures};
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2600.0, 0.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        }
    }
}

/// Everything a renderer reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameState<'a> {
    pub sim: &'a FlightSim,
    pub env: &'a Environment,
    pub pressures: Pressures,
    /// The plane is only drawn once its model has loaded.
    pub model_loaded: bool,
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads simulation state and a view configuration, then
/// produces output. It never mutates the simulation.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given state and view.
    fn render(&self, frame: &FrameState<'_>, view: &RenderView) -> Self::Output;
}

/// Text renderer for headless runs, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &FrameState<'_>, view: &RenderView) -> String {
        let mut out = String::new();
        let summary = FlightSummary::capture(frame.sim);
        let _ = writeln!(out, "=== Frame {} ===", summary.tick);
        let _ = writeln!(
            out,
            "Pressure: above={:.0} below={:.0} delta={:+.0}",
            frame.pressures.above,
            frame.pressures.below,
            frame.pressures.delta()
        );
        if frame.model_loaded {
            let _ = writeln!(out, "Plane: {summary}");
            let airflow = match frame.sim.airflow().attached() {
                Some(AirflowSide::Above) => "above",
                Some(AirflowSide::Below) => "below",
                None => "none",
            };
            let _ = writeln!(out, "Airflow: {airflow}");
        } else {
            let _ = writeln!(out, "Plane: <not loaded>");
        }
        let glow = glow_color(Vec3::ZERO, frame.env.glow_time());
        let _ = writeln!(
            out,
            "Glow: t={:.2} rgba=({:.2}, {:.2}, {:.2}, {:.2}) sun_spin={:.4}",
            frame.env.glow_time(),
            glow[0],
            glow[1],
            glow[2],
            glow[3],
            frame.env.sun_spin()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        );
        out
    }
}
