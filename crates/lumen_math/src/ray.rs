use crate::{Mat4, Vec3};

/// A ray in 3D space with origin, direction and cached inverse direction.
///
/// The direction is not required to be unit length. The inverse direction
/// (`1 / direction`, component-wise) is kept next to it for the slab test; a
/// zero component yields an infinite inverse, which the slab test relies on.
/// Direction and inverse are only ever written together.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Replace the direction, recomputing the inverse direction with it.
    #[inline]
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
        self.inv_direction = direction.recip();
    }

    /// Component-wise `1 / direction`.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Map the ray into another space.
    ///
    /// The origin is transformed as a point and the direction as a vector,
    /// without renormalising, so a parameter `t` names the same point in both
    /// spaces.
    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray::new(
            matrix.transform_point3(self.origin),
            matrix.transform_vector3(self.direction),
        )
    }
}
