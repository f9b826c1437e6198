//! Closest-hit accumulator shared by the intersection routines.

use lumen_math::Vec3;

/// Record of the closest ray intersection found so far.
///
/// `t` starts at infinity and only decreases: every intersection routine
/// commits into the record only when it finds something strictly closer, so a
/// single `Hit` can be passed through any number of tests and ends up holding
/// the nearest one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Whether anything has been hit
    pub hit: bool,
    /// Ray parameter of the closest hit
    pub t: f32,
    /// Point of intersection (in the space of the ray that produced it)
    pub position: Vec3,
    /// Geometric normal of the hit triangle
    pub normal: Vec3,
    /// Index of the scene model that was hit
    pub mesh_index: usize,
    /// Position of the hit triangle in the triangle buffer that was searched
    pub triangle_index: usize,
}

impl Default for Hit {
    fn default() -> Self {
        Self {
            hit: false,
            t: f32::INFINITY,
            position: Vec3::ZERO,
            normal: Vec3::ZERO,
            mesh_index: 0,
            triangle_index: 0,
        }
    }
}

impl Hit {
    /// A fresh record with nothing hit.
    pub fn new() -> Self {
        Self::default()
    }
}
