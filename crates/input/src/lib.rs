//! Input layer: frontends translate raw events into [`Action`]s and feed the
//! pressure sliders.
//!
//! # Invariants
//! - The kernel never sees raw window events, only pressures.
//! - Slider values always lie inside their configured range.

pub mod action;
pub mod controls;

pub use action::Action;
pub use controls::{PressureControls, PressureSlider};
