//! Triangle mesh geometry.
//!
//! A mesh owns its vertex data, its triangle-index buffer and (once built)
//! the BVH over those triangles. The BVH keeps its own reordered copy of the
//! index buffer, so `triangles` stays in the order it was given.

use lumen_accel::{BuildConfig, Bvh};
use lumen_math::{Aabb, Triangle, UVec3, Vec3};

use crate::error::MeshError;

/// A mesh consisting of vertex positions, optional normals, and triangles.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Per-vertex normals (optional, see `ensure_normals`)
    pub normals: Option<Vec<Vec3>>,

    /// Vertex indices of each triangle, counter-clockwise
    pub triangles: Vec<UVec3>,

    /// Axis-aligned bounding box of the positions
    pub bounds: Aabb,

    bvh: Option<Bvh>,
}

impl Mesh {
    /// Create a new mesh from positions and triangles, optionally with normals.
    ///
    /// Normals are NOT computed automatically; call `compute_normals()` or
    /// `ensure_normals()` when they are needed. No BVH is built until
    /// `rebuild_bvh()` is called.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<UVec3>, normals: Option<Vec<Vec3>>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            normals,
            triangles,
            bounds,
            bvh: None,
        }
    }

    /// Create a mesh from a flat index list (every 3 indices form a triangle).
    ///
    /// Trailing indices that don't form a full triangle are dropped.
    pub fn from_flat_indices(positions: Vec<Vec3>, indices: &[u32], normals: Option<Vec<Vec3>>) -> Self {
        if indices.len() % 3 != 0 {
            log::warn!(
                "Index count {} is not a multiple of 3, dropping {} trailing indices",
                indices.len(),
                indices.len() % 3
            );
        }

        let triangles = indices
            .chunks_exact(3)
            .map(|face| UVec3::new(face[0], face[1], face[2]))
            .collect();

        Self::new(positions, triangles, normals)
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        let mut bounds = Aabb::empty();
        for &p in positions {
            bounds.extend(p);
        }
        bounds
    }

    /// Recompute `bounds` after editing `positions`.
    pub fn update_bounds(&mut self) {
        self.bounds = Self::compute_bounds(&self.positions);
    }

    /// Check that the mesh can be traced.
    ///
    /// Rejects meshes without triangles, non-finite positions, indices past
    /// the vertex count and normal arrays of the wrong length.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.triangles.is_empty() {
            return Err(MeshError::Empty);
        }

        if let Some(i) = self.positions.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFinitePosition(i));
        }

        let vertex_count = self.positions.len();
        for (triangle, tri) in self.triangles.iter().enumerate() {
            for index in tri.to_array() {
                if index as usize >= vertex_count {
                    return Err(MeshError::IndexOutOfRange {
                        triangle,
                        index,
                        vertex_count,
                    });
                }
            }
        }

        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count {
                return Err(MeshError::NormalCountMismatch {
                    normals: normals.len(),
                    vertices: vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Face normals are left unnormalised before accumulation, so larger
    /// faces weigh more. Replaces any existing normals.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for tri in &self.triangles {
            let [i0, i1, i2] = tri.to_array().map(|i| i as usize);
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            let len = normal.length();
            if len > 0.0 {
                *normal /= len;
            } else {
                *normal = Vec3::Y; // Default up normal for degenerate cases
            }
        }

        self.normals = Some(normals);
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Ensure the mesh has one normal per vertex, computing them if necessary.
    pub fn ensure_normals(&mut self) {
        match &self.normals {
            Some(normals) if normals.len() == self.positions.len() => {}
            Some(normals) => {
                log::debug!(
                    "Normals array length ({}) doesn't match vertex count ({}), computing smooth normals",
                    normals.len(),
                    self.positions.len()
                );
                self.compute_normals();
            }
            None => self.compute_normals(),
        }
    }

    /// Bounding sphere around the vertex centroid.
    ///
    /// Returns `(center, radius)`; an empty mesh yields a zero sphere at the
    /// origin.
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        if self.positions.is_empty() {
            return (Vec3::ZERO, 0.0);
        }

        let center = self.positions.iter().copied().sum::<Vec3>() / self.positions.len() as f32;
        let radius = self
            .positions
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0f32, f32::max);

        (center, radius)
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex positions of a triangle given by its indices.
    pub fn triangle_geometry(&self, tri: UVec3) -> Triangle {
        Triangle::new(
            self.positions[tri.x as usize],
            self.positions[tri.y as usize],
            self.positions[tri.z as usize],
        )
    }

    /// Shading normal at `point` on the triangle `tri` (local space).
    ///
    /// Vertex normals are blended with barycentric weights when present;
    /// otherwise the geometric normal is returned.
    pub fn interpolated_normal(&self, tri: UVec3, point: Vec3) -> Vec3 {
        let triangle = self.triangle_geometry(tri);

        match &self.normals {
            Some(normals) if normals.len() == self.positions.len() => {
                let w = triangle.barycentric(point);
                let n = normals[tri.x as usize] * w.x
                    + normals[tri.y as usize] * w.y
                    + normals[tri.z as usize] * w.z;
                n.try_normalize().unwrap_or_else(|| triangle.normal())
            }
            _ => triangle.normal(),
        }
    }

    /// The BVH over this mesh, if one has been built.
    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    /// Build (or rebuild from scratch) the BVH with the given configuration.
    ///
    /// Must be called again after editing positions or triangles; `bounds`
    /// is refreshed along with the tree.
    pub fn rebuild_bvh(&mut self, config: &BuildConfig) -> Result<(), MeshError> {
        self.validate()?;
        self.update_bounds();
        self.bvh = Some(Bvh::build(&self.positions, &self.triangles, config));
        Ok(())
    }

    /// Rectangle of `width` x `height` in the XY plane, centered on the
    /// origin and facing +Z.
    pub fn quad(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let positions = vec![
            Vec3::new(-hw, -hh, 0.0),
            Vec3::new(hw, -hh, 0.0),
            Vec3::new(hw, hh, 0.0),
            Vec3::new(-hw, hh, 0.0),
        ];
        let triangles = vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)];
        Self::new(positions, triangles, Some(vec![Vec3::Z; 4]))
    }

    /// Square ground plane of side `size` in the XZ plane facing +Y, split
    /// into `subdivisions` x `subdivisions` cells.
    pub fn plane(size: f32, subdivisions: u32) -> Self {
        let cells = subdivisions.max(1);
        let step = size / cells as f32;
        let half = size * 0.5;
        let row = cells + 1;

        let mut positions = Vec::with_capacity((row * row) as usize);
        for j in 0..row {
            for i in 0..row {
                positions.push(Vec3::new(-half + i as f32 * step, 0.0, -half + j as f32 * step));
            }
        }

        let mut triangles = Vec::with_capacity((cells * cells * 2) as usize);
        for j in 0..cells {
            for i in 0..cells {
                let p00 = j * row + i;
                let p10 = p00 + 1;
                let p01 = p00 + row;
                let p11 = p01 + 1;
                triangles.push(UVec3::new(p00, p01, p11));
                triangles.push(UVec3::new(p00, p11, p10));
            }
        }

        let normals = vec![Vec3::Y; positions.len()];
        Self::new(positions, triangles, Some(normals))
    }

    /// Axis-aligned cube of side `size` centered on the origin, with flat
    /// per-face normals (24 vertices, 12 triangles).
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        // (normal, u, v) with u x v == normal
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut triangles = Vec::with_capacity(12);

        for (normal, u, v) in faces {
            let base = positions.len() as u32;
            let center = normal * h;
            positions.push(center - u * h - v * h);
            positions.push(center + u * h - v * h);
            positions.push(center + u * h + v * h);
            positions.push(center - u * h + v * h);
            normals.extend([normal; 4]);
            triangles.push(UVec3::new(base, base + 1, base + 2));
            triangles.push(UVec3::new(base, base + 2, base + 3));
        }

        Self::new(positions, triangles, Some(normals))
    }
}
