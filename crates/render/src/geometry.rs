//! CPU-side scene geometry shared by every backend.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use liftsim_assets::ModelMesh;
use liftsim_common::{Bounds, Rgb, Transform};
use liftsim_kernel::{SceneParams, StreamlineGroup};

/// Lit or unlit triangle vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Line vertex with straight RGBA colour.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Axis-aligned box centred at `center`, coloured per vertex by `color_at`.
pub fn box_mesh(center: Vec3, half: Vec3, color_at: impl Fn(Vec3) -> Rgb) -> MeshData {
    // (normal, u axis, v axis) for each face; corners wind counter-clockwise
    // seen from outside.
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    let mut mesh = MeshData::default();
    for (normal, u, v) in faces {
        let base = mesh.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let local = (normal + u * su + v * sv) * half;
            mesh.vertices.push(MeshVertex {
                position: (center + local).to_array(),
                normal: normal.to_array(),
                color: color_at(local).to_array(),
            });
        }
        mesh.indices
            .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

/// The ground slab: top face at y = 0, colour rising from base to top.
pub fn ground_mesh(params: &SceneParams) -> MeshData {
    let t = params.ground_thickness;
    let half = Vec3::new(params.ground_size * 0.5, t * 0.5, params.ground_size * 0.5);
    let base = Rgb::from_hex(params.ground_base_color).to_linear();
    let top = Rgb::from_hex(params.ground_top_color).to_linear();
    box_mesh(Vec3::new(0.0, -t * 0.5, 0.0), half, |local| {
        base.lerp(top, ground_ratio(local.y, t))
    })
}

/// 0 at the bottom of the slab, 1 at the top.
pub fn ground_ratio(local_y: f32, thickness: f32) -> f32 {
    ((local_y + thickness * 0.5) / thickness).clamp(0.0, 1.0)
}

/// UV sphere centred at the origin.
pub fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32, color: Rgb) -> MeshData {
    let mut mesh = MeshData::default();
    let color = color.to_array();
    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        let theta = v * std::f32::consts::PI;
        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;
            let phi = u * std::f32::consts::TAU;
            let normal = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
            mesh.vertices.push(MeshVertex {
                position: (normal * radius).to_array(),
                normal: normal.to_array(),
                color,
            });
        }
    }
    let row = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            // The pole rows collapse to a point; skip their degenerate halves.
            if y != 0 {
                mesh.indices.extend([a, b, d]);
            }
            if y != height_segments - 1 {
                mesh.indices.extend([b, c, d]);
            }
        }
    }
    mesh
}

/// Convert an imported model into a vertex/index mesh. Colour is unused by
/// the plane shader, so it is left white.
pub fn model_mesh(model: &ModelMesh) -> MeshData {
    let vertices = model
        .positions
        .iter()
        .zip(&model.normals)
        .map(|(p, n)| MeshVertex {
            position: p.to_array(),
            normal: n.to_array(),
            color: Rgb::WHITE.to_array(),
        })
        .collect();
    MeshData {
        vertices,
        indices: model.indices.clone(),
    }
}

/// The boundary box as a line list, positions relative to its centre.
///
/// The glow shader colours by local position, so the backend draws these
/// with the centre as the model offset.
pub fn boundary_lines(bounds: &Bounds) -> Vec<LineVertex> {
    let center = bounds.center();
    bounds
        .edges()
        .iter()
        .flat_map(|(a, b)| [*a - center, *b - center])
        .map(|p| LineVertex {
            position: p.to_array(),
            color: [1.0; 4],
        })
        .collect()
}

/// Streamlines as a line list in world space, following the plane.
pub fn airflow_lines(group: &StreamlineGroup, plane: &Transform) -> Vec<LineVertex> {
    let color = group.color.to_linear().with_alpha(group.opacity);
    let mut out = Vec::new();
    for line in group.lines() {
        for pair in line.windows(2) {
            for p in pair {
                out.push(LineVertex {
                    position: plane.transform_point(*p).to_array(),
                    color,
                });
            }
        }
    }
    out
}

/// Reference version of the boundary glow shader.
pub fn glow_color(local: Vec3, time: f32) -> [f32; 4] {
    let w = (time * 0.3 + local.truncate().length() * 0.0003).sin().abs();
    let blue = Vec3::new(0.1, 0.2, 0.8);
    let red = Vec3::new(0.8, 0.1, 0.2);
    let c = blue.lerp(red, w);
    [c.x, c.y, c.z, 0.3 + 0.2 * w]
}

/// Reference version of the plane shader: bright on top, dark underneath.
pub fn plane_shade(local_y: f32) -> f32 {
    let t = ((local_y + 20.0) / 40.0).clamp(0.0, 1.0);
    let b = t * t * (3.0 - 2.0 * t);
    0.2 + 0.8 * b
}
