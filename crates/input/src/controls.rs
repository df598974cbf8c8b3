use crate::action::Action;
use liftsim_kernel::{ControlsConfig, Pressures};

/// A bounded numeric slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureSlider {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    value: f32,
}

impl PressureSlider {
    pub fn new(min: f32, max: f32, step: f32, value: f32) -> Self {
        let mut slider = Self {
            min,
            max,
            step,
            value: min,
        };
        slider.set(value);
        slider
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Store `value`, snapped to the step grid and clamped to the range.
    /// Returns whether the stored value changed.
    pub fn set(&mut self, value: f32) -> bool {
        if !value.is_finite() {
            tracing::warn!("ignoring non-finite slider value {value}");
            return false;
        }
        let snapped = if self.step > 0.0 {
            self.min + ((value - self.min) / self.step).round() * self.step
        } else {
            value
        };
        let clamped = snapped.clamp(self.min, self.max);
        let changed = clamped != self.value;
        self.value = clamped;
        changed
    }
}

/// The two pressure sliders that drive lift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureControls {
    pub above: PressureSlider,
    pub below: PressureSlider,
}

impl Default for PressureControls {
    fn default() -> Self {
        Self::from_config(&ControlsConfig::default())
    }
}

impl PressureControls {
    pub fn from_config(config: &ControlsConfig) -> Self {
        let slider = |value| {
            PressureSlider::new(
                config.pressure_min,
                config.pressure_max,
                config.pressure_step,
                value,
            )
        };
        Self {
            above: slider(config.initial_above),
            below: slider(config.initial_below),
        }
    }

    pub fn pressures(&self) -> Pressures {
        Pressures::new(self.above.value(), self.below.value())
    }

    /// Apply a pressure action. Returns `true` if the action was consumed.
    pub fn apply(&mut self, action: &Action) -> bool {
        match action {
            Action::SetPressureAbove(v) => {
                if self.above.set(*v) {
                    tracing::debug!("pressure above -> {}", self.above.value());
                }
                true
            }
            Action::SetPressureBelow(v) => {
                if self.below.set(*v) {
                    tracing::debug!("pressure below -> {}", self.below.value());
                }
                true
            }
            _ => false,
        }
    }
}
