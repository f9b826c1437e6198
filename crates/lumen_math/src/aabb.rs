use crate::{Triangle, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// A box starts out empty and only grows through [`Aabb::extend`] and
/// [`Aabb::extend_triangle`]. The first point added sets both corners, so an
/// empty box never biases its bounds toward the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    /// Component-wise minimum corner.
    pub begin_corner: Vec3,
    /// Component-wise maximum corner.
    pub end_corner: Vec3,
    /// Depth of the owning BVH node (informational only).
    pub depth: usize,
}

impl Aabb {
    /// An empty box (contains nothing, grows to the first point it is extended by).
    pub const EMPTY: Aabb = Aabb {
        begin_corner: Vec3::splat(f32::INFINITY),
        end_corner: Vec3::splat(f32::NEG_INFINITY),
        depth: 0,
    };

    /// Create an empty AABB.
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Create an AABB containing a single point.
    pub fn from_point(point: Vec3) -> Self {
        Self {
            begin_corner: point,
            end_corner: point,
            depth: 0,
        }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            begin_corner: a.min(b),
            end_corner: a.max(b),
            depth: 0,
        }
    }

    /// Create the tight AABB of a triangle.
    pub fn from_triangle(triangle: &Triangle) -> Self {
        let mut aabb = Self::EMPTY;
        aabb.extend_triangle(triangle);
        aabb
    }

    /// Returns true until the box has been extended at least once.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin_corner.x > self.end_corner.x
            || self.begin_corner.y > self.end_corner.y
            || self.begin_corner.z > self.end_corner.z
    }

    /// Grow the box to include a point.
    #[inline]
    pub fn extend(&mut self, point: Vec3) {
        self.begin_corner = self.begin_corner.min(point);
        self.end_corner = self.end_corner.max(point);
    }

    /// Grow the box to include the three vertices of a triangle.
    #[inline]
    pub fn extend_triangle(&mut self, triangle: &Triangle) {
        self.extend(triangle.a);
        self.extend(triangle.b);
        self.extend(triangle.c);
    }

    /// Extent of the box along each axis (zero for an empty box).
    #[inline]
    pub fn diagonal(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.end_corner - self.begin_corner
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties prefer X over Y over Z.
    pub fn longest_axis(&self) -> usize {
        let d = self.diagonal();

        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Half of the surface area: `dx*dy + dx*dz + dy*dz`.
    ///
    /// Only ever compared against other values of itself (SAH cost), so the
    /// missing factor of two does not matter. An empty box has zero area.
    #[inline]
    pub fn half_surface_area(&self) -> f32 {
        let d = self.diagonal();
        d.x * d.y + d.x * d.z + d.y * d.z
    }

    /// Returns the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.begin_corner + self.end_corner) * 0.5
    }

    /// Returns true if the point lies inside the box (bounds inclusive).
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.begin_corner).all() && p.cmple(self.end_corner).all()
    }

    /// Returns true if `other` lies entirely inside this box.
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        other.is_empty()
            || (self.contains_point(other.begin_corner) && self.contains_point(other.end_corner))
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            begin_corner: box0.begin_corner.min(box1.begin_corner),
            end_corner: box0.end_corner.max(box1.end_corner),
            depth: box0.depth.min(box1.depth),
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
