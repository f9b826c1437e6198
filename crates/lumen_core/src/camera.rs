//! Pinhole camera for primary ray generation.

use lumen_math::{Ray, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Pinhole camera placed with look-from/look-at/up and a vertical field of
/// view.
///
/// `initialize` must be called with the image size before generating rays;
/// it caches the viewport basis so `ray_at` is a couple of multiply-adds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    /// Vertical field of view in degrees
    vfov: f32,

    // Cached computed values (set by initialize())
    #[serde(skip)]
    viewport_upper_left: Vec3,
    #[serde(skip)]
    pixel_delta_u: Vec3,
    #[serde(skip)]
    pixel_delta_v: Vec3,
}

impl Camera {
    /// Create a new camera at the origin looking down -Z.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 45.0,
            viewport_upper_left: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Eye position (ray origin of every primary ray).
    pub fn eye(&self) -> Vec3 {
        self.look_from
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn fov(&self) -> f32 {
        self.vfov
    }

    /// Prepare the viewport for an image of `width` x `height` pixels.
    pub fn initialize(&mut self, width: u32, height: u32) {
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;

        // Viewport on the plane one unit in front of the eye
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (width / height);

        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        self.pixel_delta_u = viewport_u / width;
        self.pixel_delta_v = viewport_v / height;
        self.viewport_upper_left = self.look_from - w - viewport_u / 2.0 - viewport_v / 2.0;
    }

    /// Ray through pixel `(x, y)` (row 0 at the top) at a sub-pixel `offset`
    /// in [0, 1]^2; `(0.5, 0.5)` is the pixel center. Unit direction.
    pub fn ray_at(&self, x: u32, y: u32, offset: Vec2) -> Ray {
        let pixel_sample = self.viewport_upper_left
            + (x as f32 + offset.x) * self.pixel_delta_u
            + (y as f32 + offset.y) * self.pixel_delta_v;

        Ray::new(self.look_from, (pixel_sample - self.look_from).normalize())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_at_target() {
        let mut camera = Camera::new()
            .with_position(Vec3::new(0.0, 2.0, 5.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
            .with_fov(60.0);
        camera.initialize(100, 100);

        // Pixel (50, 50) at offset 0 is the exact image center
        let ray = camera.ray_at(50, 50, Vec2::ZERO);
        assert_eq!(ray.origin(), camera.eye());
        assert!((ray.direction() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_ray_direction_is_unit() {
        let mut camera = Camera::new().with_fov(90.0);
        camera.initialize(64, 32);

        for (x, y) in [(0, 0), (63, 0), (0, 31), (20, 17)] {
            let ray = camera.ray_at(x, y, Vec2::splat(0.5));
            assert!((ray.direction().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_image_orientation() {
        let mut camera = Camera::new().with_fov(90.0);
        camera.initialize(10, 10);

        let top_left = camera.ray_at(0, 0, Vec2::splat(0.5)).direction();
        let bottom_right = camera.ray_at(9, 9, Vec2::splat(0.5)).direction();

        assert!(top_left.x < 0.0 && top_left.y > 0.0);
        assert!(bottom_right.x > 0.0 && bottom_right.y < 0.0);
    }

    #[test]
    fn test_field_of_view_edge() {
        let mut camera = Camera::new().with_fov(90.0);
        camera.initialize(2, 2);

        // Top edge of the viewport is at 45 degrees
        let edge = camera.ray_at(1, 0, Vec2::new(0.0, 0.0)).direction();
        assert!((edge.y.atan2(-edge.z).to_degrees() - 45.0).abs() < 1e-3);
    }
}
