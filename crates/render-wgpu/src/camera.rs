use glam::{Mat4, Vec2, Vec3};
use liftsim_kernel::CameraConfig;

/// Smallest polar angle, keeping the view direction off the up axis.
const POLE_EPSILON: f32 = 1e-6;

/// Orbit camera: rotates around a target, zooms along the view ray and pans
/// in the view plane. Input accumulates into deltas that `update` applies
/// with exponential damping.
///
/// Camera motion lives outside the simulation; it never affects flight.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub enable_rotate: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Keep the plane at the orbit target.
    pub follow: bool,
    /// Pending (azimuth, polar) rotation.
    spherical_delta: Vec2,
    pan_offset: Vec3,
    scale: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            eye: config.eye,
            target: config.target,
            fov: config.fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: config.near,
            far: config.far,
            damping: config.damping.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            enable_pan: config.enable_pan,
            enable_zoom: config.enable_zoom,
            enable_rotate: config.enable_rotate,
            min_distance: config.near,
            max_distance: config.far * 0.5,
            follow: config.follow_plane,
            spherical_delta: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).length()
    }

    /// Queue a rotation from a drag of `delta` pixels in a viewport
    /// `viewport_height` pixels tall. A full-height drag turns one revolution
    /// at unit speed.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if !self.enable_rotate {
            return;
        }
        let per_pixel = std::f32::consts::TAU / viewport_height.max(1.0) * self.rotate_speed;
        self.spherical_delta -= delta * per_pixel;
    }

    /// Queue a pan so the scene follows a drag of `delta` pixels.
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32) {
        if !self.enable_pan {
            return;
        }
        let half_height = self.distance() * (self.fov * 0.5).tan();
        let per_pixel = 2.0 * half_height / viewport_height.max(1.0);
        let view = self.view_matrix();
        let right = view.row(0).truncate();
        let up = view.row(1).truncate();
        self.pan_offset += (-right * delta.x + up * delta.y) * per_pixel;
    }

    /// Zoom by wheel `steps`; positive moves towards the target.
    pub fn zoom(&mut self, steps: f32) {
        if !self.enable_zoom {
            return;
        }
        self.scale *= 0.95_f32.powf(self.zoom_speed * steps);
    }

    /// Move the orbit so `target` is its new centre, keeping the offset.
    pub fn follow_target(&mut self, target: Vec3) {
        let offset = self.eye - self.target;
        self.target = target;
        self.eye = target + offset;
    }

    /// Apply pending input. Call once per frame.
    pub fn update(&mut self) {
        let offset = self.eye - self.target;
        let radius = offset.length().max(f32::EPSILON);
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let k = if self.damping > 0.0 { self.damping } else { 1.0 };
        theta += self.spherical_delta.x * k;
        phi += self.spherical_delta.y * k;
        phi = phi.clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON);

        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * k;

        let sin_phi = phi.sin() * radius;
        self.eye = self.target + Vec3::new(sin_phi * theta.sin(), phi.cos() * radius, sin_phi * theta.cos());

        if self.damping > 0.0 {
            self.spherical_delta *= 1.0 - self.damping;
            self.pan_offset *= 1.0 - self.damping;
        } else {
            self.spherical_delta = Vec2::ZERO;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
