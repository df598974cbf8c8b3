use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Constants for the static parts of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    pub sky_color: u32,
    pub ground_size: f32,
    pub ground_thickness: f32,
    pub ground_base_color: u32,
    pub ground_top_color: u32,
    pub sun_position: Vec3,
    pub sun_radius: f32,
    pub sun_color: u32,
    /// Radians the sun turns about its own Y axis each frame.
    pub sun_spin_rate: f32,
    pub ambient_intensity: f32,
    pub light_intensity: f32,
    /// Glow clock increment per frame.
    pub glow_rate: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            sky_color: 0x87ceeb,
            ground_size: 8.0e6,
            ground_thickness: 2000.0,
            ground_base_color: 0x228b22,
            ground_top_color: 0x44cc66,
            sun_position: Vec3::new(1.0e6, 5.0e6, -2.0e6),
            sun_radius: 5.0e5,
            sun_color: 0xffff88,
            sun_spin_rate: 0.0005,
            ambient_intensity: 0.5,
            light_intensity: 1.0,
            glow_rate: 0.02,
        }
    }
}

/// Animated scene state that runs whether or not the plane is loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    params: SceneParams,
    glow_time: f32,
    sun_spin: f32,
}

impl Environment {
    pub fn new(params: SceneParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &SceneParams {
        &self.params
    }

    pub fn glow_time(&self) -> f32 {
        self.glow_time
    }

    pub fn sun_spin(&self) -> f32 {
        self.sun_spin
    }

    pub fn sun_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.sun_spin)
    }

    /// The directional light sits on the sun.
    pub fn light_position(&self) -> Vec3 {
        self.params.sun_position
    }

    /// Unit vector pointing from the scene origin towards the light.
    pub fn light_direction(&self) -> Vec3 {
        self.light_position().normalize_or(Vec3::Y)
    }

    pub fn step(&mut self) {
        self.glow_time += self.params.glow_rate;
        // Keep the angle small so f32 precision holds over long sessions.
        self.sun_spin = (self.sun_spin + self.params.sun_spin_rate) % std::f32::consts::TAU;
    }
}
