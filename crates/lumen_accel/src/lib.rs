//! Lumen acceleration structures.
//!
//! Builds a bounding volume hierarchy over a triangle mesh and answers
//! ray queries against it:
//!
//! - `Bvh::build` partitions triangles with median split or SAH
//! - `bvh_intersection` finds the nearest hit with front-to-back pruning
//! - `traverse_bvh` enumerates every leaf a ray passes through
//!
//! The BVH never holds a reference to its mesh. Queries that need vertex
//! positions take them as a slice, so the mesh can own its BVH.

mod bvh;
mod config;
mod hit;
mod intersect;

#[cfg(test)]
mod test_util;

pub use bvh::{Bvh, BvhNode};
pub use config::{BuildConfig, SplitStrategy, DEFAULT_SAH_CANDIDATES};
pub use hit::Hit;
pub use intersect::{
    aabb_intersection, bvh_intersection, bvh_intersection_with_stats, linear_intersection,
    traverse_bvh, triangle_intersection, TraversalStats,
};

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Ray, Triangle, UVec3, Vec3};
