use glam::{Mat3, Mat4, Vec3};
use liftsim_common::Bounds;

/// Triangle mesh with per-vertex normals, in model-local units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl ModelMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Bounds::new(min, max))
    }

    /// Append `positions`/`normals`/`indices` baked through `transform`.
    ///
    /// A mirroring transform flips the winding so faces stay front-facing.
    pub fn append(
        &mut self,
        transform: Mat4,
        positions: &[Vec3],
        normals: Option<&[Vec3]>,
        indices: &[u32],
    ) {
        let base = self.positions.len() as u32;
        let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
        let mirrored = transform.determinant() < 0.0;

        self.positions
            .extend(positions.iter().map(|p| transform.transform_point3(*p)));

        let start = self.indices.len();
        for tri in indices.chunks_exact(3) {
            if mirrored {
                self.indices
                    .extend([base + tri[0], base + tri[2], base + tri[1]]);
            } else {
                self.indices.extend(tri.iter().map(|i| base + i));
            }
        }

        match normals {
            Some(n) if n.len() == positions.len() => {
                self.normals
                    .extend(n.iter().map(|v| (normal_matrix * *v).normalize_or_zero()));
            }
            _ => {
                self.normals
                    .extend(std::iter::repeat_n(Vec3::ZERO, positions.len()));
                self.accumulate_face_normals(start, base as usize);
            }
        }
    }

    /// Fill normals for vertices from `first_vertex` on by summing the
    /// normals of the faces (from index `first_index` on) that use them.
    fn accumulate_face_normals(&mut self, first_index: usize, first_vertex: usize) {
        for tri in self.indices[first_index..].chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            for i in [a, b, c] {
                self.normals[i] += face;
            }
        }
        for n in &mut self.normals[first_vertex..] {
            *n = n.normalize_or(Vec3::Y);
        }
    }

    /// A folded paper dart, nose along +X, roughly 40 units long.
    pub fn paper_plane() -> Self {
        let nose = Vec3::new(20.0, 0.0, 0.0);
        let tail = Vec3::new(-20.0, 0.0, 0.0);
        let left_tip = Vec3::new(-20.0, 2.0, -15.0);
        let right_tip = Vec3::new(-20.0, 2.0, 15.0);
        let keel = Vec3::new(-20.0, -6.0, 0.0);

        // Faces do not share vertices so each keeps a flat normal.
        let faces = [
            [nose, left_tip, tail],
            [nose, tail, right_tip],
            [nose, tail, keel],
            [nose, keel, tail],
        ];
        let positions: Vec<Vec3> = faces.iter().flatten().copied().collect();
        let indices: Vec<u32> = (0..positions.len() as u32).collect();

        let mut mesh = Self::new("paper_plane");
        mesh.append(Mat4::IDENTITY, &positions, None, &indices);
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Vec3> {
        vec![Vec3::ZERO, Vec3::X, Vec3::Z]
    }

    #[test]
    fn append_offsets_indices() {
        let mut mesh = ModelMesh::new("t");
        mesh.append(Mat4::IDENTITY, &triangle(), None, &[0, 1, 2]);
        mesh.append(Mat4::IDENTITY, &triangle(), None, &[0, 1, 2]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn computed_normals_follow_winding() {
        let mut mesh = ModelMesh::new("t");
        // (X - 0) x (Z - 0) = -Y
        mesh.append(Mat4::IDENTITY, &triangle(), None, &[0, 1, 2]);
        for n in &mesh.normals {
            assert!((*n - Vec3::NEG_Y).length() < 1e-6);
        }
    }

    #[test]
    fn append_bakes_transform() {
        let mut mesh = ModelMesh::new("t");
        let t = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
        mesh.append(t, &triangle(), Some(&[Vec3::Y; 3]), &[0, 1, 2]);
        assert_eq!(mesh.positions[1], Vec3::new(2.0, 5.0, 0.0));
        assert!((mesh.normals[0] - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn mirrored_transform_flips_winding() {
        let mut mesh = ModelMesh::new("t");
        mesh.append(
            Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0)),
            &triangle(),
            None,
            &[0, 1, 2],
        );
        assert_eq!(mesh.indices, vec![0, 2, 1]);
    }

    #[test]
    fn bounds_cover_all_points() {
        let mesh = ModelMesh::paper_plane();
        let b = mesh.bounds().unwrap();
        assert_eq!(b.min, Vec3::new(-20.0, -6.0, -15.0));
        assert_eq!(b.max, Vec3::new(20.0, 2.0, 15.0));
        assert!(ModelMesh::default().bounds().is_none());
    }

    #[test]
    fn paper_plane_is_well_formed() {
        let mesh = ModelMesh::paper_plane();
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert!(mesh.normals.iter().all(|n| (n.length() - 1.0).abs() < 1e-5));
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }
}
