// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod ray;
mod transform;
mod triangle;

pub use aabb::Aabb;
pub use ray::Ray;
pub use transform::Mat4Ext;
pub use triangle::Triangle;

/// RGB color, linear unless stated otherwise.
pub type Color = Vec3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_uvec3_indexing() {
        let tri = UVec3::new(4, 5, 6);
        assert_eq!(tri[0], 4);
        assert_eq!(tri[2], 6);
    }
}
