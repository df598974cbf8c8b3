use glam::Vec2;

/// A high-level action produced by any frontend (window, CLI script).
///
/// Camera actions carry pixel deltas; the camera decides how to scale them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Set the pressure on the upper surface.
    SetPressureAbove(f32),
    /// Set the pressure on the lower surface.
    SetPressureBelow(f32),
    /// Orbit the camera by a drag delta.
    Orbit(Vec2),
    /// Pan the camera by a drag delta.
    Pan(Vec2),
    /// Zoom by wheel steps; positive zooms in.
    Zoom(f32),
    /// Toggle keeping the plane at the orbit target.
    ToggleFollow,
    /// Show or hide the control panel.
    TogglePanel,
    Quit,
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}
