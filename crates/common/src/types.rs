use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Map a point from local space into the space this transform lives in.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (local * self.scale)
    }
}

/// Axis-aligned box given by its two extreme corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The twelve edges of the box as endpoint pairs.
    pub fn edges(&self) -> [(Vec3, Vec3); 12] {
        let (a, b) = (self.min, self.max);
        let c = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        [
            // bottom ring
            (c(a.x, a.y, a.z), c(b.x, a.y, a.z)),
            (c(b.x, a.y, a.z), c(b.x, a.y, b.z)),
            (c(b.x, a.y, b.z), c(a.x, a.y, b.z)),
            (c(a.x, a.y, b.z), c(a.x, a.y, a.z)),
            // top ring
            (c(a.x, b.y, a.z), c(b.x, b.y, a.z)),
            (c(b.x, b.y, a.z), c(b.x, b.y, b.z)),
            (c(b.x, b.y, b.z), c(a.x, b.y, b.z)),
            (c(a.x, b.y, b.z), c(a.x, b.y, a.z)),
            // verticals
            (c(a.x, a.y, a.z), c(a.x, b.y, a.z)),
            (c(b.x, a.y, a.z), c(b.x, b.y, a.z)),
            (c(b.x, a.y, b.z), c(b.x, b.y, b.z)),
            (c(a.x, a.y, b.z), c(a.x, b.y, b.z)),
        ]
    }
}

/// An sRGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Convert to linear light, which is what shaders blend in.
    pub fn to_linear(self) -> Self {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Self::new(decode(self.r), decode(self.g), decode(self.b))
    }

    /// Blend towards `other`; exact at both ends.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let s = 1.0 - t;
        Self::new(
            self.r * s + other.r * t,
            self.g * s + other.g * t,
            self.b * s + other.b * t,
        )
    }

    pub fn with_alpha(self, a: f32) -> [f32; 4] {
        [self.r, self.g, self.b, a]
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn transform_point_applies_scale_then_translation() {
        let t = Transform {
            position: Vec3::new(10.0, 0.0, 0.0),
            scale: Vec3::splat(100.0),
            ..Transform::default()
        };
        let p = t.transform_point(Vec3::new(1.0, 2.0, 0.0));
        assert!((p - Vec3::new(110.0, 200.0, 0.0)).length() < 1e-3);
        let m = t.matrix().transform_point3(Vec3::new(1.0, 2.0, 0.0));
        assert!((m - Vec3::new(110.0, 200.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn bounds_normalises_corners() {
        let b = Bounds::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(-1.0, 3.0, -1.0));
        assert_eq!(b.min, Vec3::new(-1.0, 1.0, -1.0));
        assert_eq!(b.max, Vec3::new(1.0, 3.0, 1.0));
        assert_eq!(b.center(), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(b.size(), Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn bounds_edges_have_box_lengths() {
        let b = Bounds::new(Vec3::ZERO, Vec3::new(4.0, 2.0, 1.0));
        let mut lengths: Vec<f32> = b.edges().iter().map(|(p, q)| (*q - *p).length()).collect();
        lengths.sort_by(f32::total_cmp);
        assert_eq!(&lengths[..4], &[1.0; 4]);
        assert_eq!(&lengths[4..8], &[2.0; 4]);
        assert_eq!(&lengths[8..], &[4.0; 4]);
    }

    #[test]
    fn rgb_from_hex() {
        let c = Rgb::from_hex(0xff3300);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 0.2).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn rgb_linear_keeps_extremes() {
        assert_eq!(Rgb::WHITE.to_linear(), Rgb::WHITE);
        let black = Rgb::new(0.0, 0.0, 0.0);
        assert_eq!(black.to_linear(), black);
        assert!(Rgb::new(0.5, 0.5, 0.5).to_linear().r < 0.5);
    }

    #[test]
    fn rgb_lerp_endpoints() {
        let a = Rgb::new(0.0, 0.25, 0.5);
        let b = Rgb::new(1.0, 0.75, 1.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }
}
