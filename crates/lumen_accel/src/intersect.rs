//! Ray intersection against triangles, boxes and BVHs.

use std::collections::BTreeSet;
use std::ops::{Add, AddAssign};

use lumen_math::{Aabb, Ray, Triangle, UVec3, Vec3};

use crate::bvh::{make_triangle, Bvh};
use crate::hit::Hit;

const EPSILON: f32 = f32::EPSILON;

/// Counters gathered during a BVH query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes whose contents were examined.
    pub nodes_visited: usize,
    /// Ray/box slab tests performed.
    pub aabb_tests: usize,
    /// Ray/triangle tests performed.
    pub triangle_tests: usize,
}

impl AddAssign for TraversalStats {
    fn add_assign(&mut self, other: Self) {
        self.nodes_visited += other.nodes_visited;
        self.aabb_tests += other.aabb_tests;
        self.triangle_tests += other.triangle_tests;
    }
}

impl Add for TraversalStats {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

/// Möller–Trumbore ray/triangle test.
///
/// Commits into `hit` (flag, `t`, position, unit geometric normal) only when
/// the intersection lies in front of the origin and strictly closer than
/// `hit.t`. Returns true iff it committed. Barycentric bounds are checked with
/// a small slack so rays through a shared edge never slip between neighbours.
pub fn triangle_intersection(ray: &Ray, triangle: &Triangle, hit: &mut Hit) -> bool {
    let edge1 = triangle.b - triangle.a;
    let edge2 = triangle.c - triangle.a;

    let ray_cross_e2 = ray.direction().cross(edge2);
    let det = edge1.dot(ray_cross_e2);

    // Parallel to the triangle plane (or degenerate triangle)
    if det.abs() < EPSILON {
        return false;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin() - triangle.a;
    let u = inv_det * s.dot(ray_cross_e2);
    if u < -EPSILON || u > 1.0 + EPSILON {
        return false;
    }

    let s_cross_e1 = s.cross(edge1);
    let v = inv_det * ray.direction().dot(s_cross_e1);
    if v < -EPSILON || u + v > 1.0 + EPSILON {
        return false;
    }

    let t = inv_det * edge2.dot(s_cross_e1);
    if t <= EPSILON || t >= hit.t {
        return false;
    }

    hit.hit = true;
    hit.t = t;
    hit.position = ray.at(t);
    hit.normal = edge1.cross(edge2).normalize_or_zero();
    true
}

/// Slab test against an axis-aligned box.
///
/// Returns the entry distance along the ray, or zero when the origin lies
/// inside the box (boundary included). Empty boxes are never hit.
pub fn aabb_intersection(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    if aabb.is_empty() {
        return None;
    }

    let origin = ray.origin();
    if aabb.contains_point(origin) {
        return Some(0.0);
    }

    let inv = ray.inv_direction();
    let t1 = (aabb.begin_corner - origin) * inv;
    let t2 = (aabb.end_corner - origin) * inv;

    let t_min = t1.min(t2).max_element();
    let t_max = t1.max(t2).min_element();

    if t_max >= t_min && t_min >= 0.0 {
        Some(t_min)
    } else {
        None
    }
}

/// Every BVH triangle (as a position in [`Bvh::triangles`]) contained in a
/// leaf whose box the ray passes through. Sorted, without duplicates.
///
/// Does no distance pruning; meant for debugging and visualisation.
pub fn traverse_bvh(ray: &Ray, bvh: &Bvh) -> Vec<usize> {
    let mut found = BTreeSet::new();
    collect_leaves(ray, bvh, 0, &mut found);
    found.into_iter().collect()
}

fn collect_leaves(ray: &Ray, bvh: &Bvh, node_index: usize, found: &mut BTreeSet<usize>) {
    let node = &bvh.nodes()[node_index];
    if node.num_triangles == 0 || aabb_intersection(ray, &node.aabb).is_none() {
        return;
    }

    if node.is_leaf() {
        found.extend(node.triangle_range());
    } else {
        collect_leaves(ray, bvh, node.child_index, found);
        collect_leaves(ray, bvh, node.child_index + 1, found);
    }
}

/// Nearest-hit query through a BVH.
///
/// `positions` are the vertex positions the BVH was built over. On an
/// improving hit `hit.triangle_index` is set to the triangle's position in
/// the BVH buffer (see [`Bvh::triangle`]). Returns true iff `hit` improved.
pub fn bvh_intersection(ray: &Ray, bvh: &Bvh, positions: &[Vec3], hit: &mut Hit) -> bool {
    let mut stats = TraversalStats::default();
    bvh_intersection_with_stats(ray, bvh, positions, hit, &mut stats)
}

/// [`bvh_intersection`] that also counts the work it did into `stats`.
pub fn bvh_intersection_with_stats(
    ray: &Ray,
    bvh: &Bvh,
    positions: &[Vec3],
    hit: &mut Hit,
    stats: &mut TraversalStats,
) -> bool {
    stats.aabb_tests += 1;
    if aabb_intersection(ray, &bvh.root().aabb).is_none() {
        return false;
    }

    intersect_node(ray, bvh, positions, 0, hit, stats)
}

fn intersect_node(
    ray: &Ray,
    bvh: &Bvh,
    positions: &[Vec3],
    node_index: usize,
    hit: &mut Hit,
    stats: &mut TraversalStats,
) -> bool {
    let nodes = bvh.nodes();
    let node = &nodes[node_index];
    stats.nodes_visited += 1;

    if node.num_triangles == 0 {
        return false;
    }

    if node.is_leaf() {
        let mut improved = false;
        for i in node.triangle_range() {
            stats.triangle_tests += 1;
            if triangle_intersection(ray, &bvh.triangle_geometry(positions, i), hit) {
                hit.triangle_index = i;
                improved = true;
            }
        }
        return improved;
    }

    // Visit the child whose center is closer to the origin first
    let left = node.child_index;
    let right = left + 1;
    let origin = ray.origin();
    let (near, far) = if origin.distance_squared(nodes[left].aabb.center())
        < origin.distance_squared(nodes[right].aabb.center())
    {
        (left, right)
    } else {
        (right, left)
    };

    stats.aabb_tests += 2;
    let near_entry = aabb_intersection(ray, &nodes[near].aabb);
    let far_entry = aabb_intersection(ray, &nodes[far].aabb);

    let mut improved = false;
    if near_entry.is_some() && intersect_node(ray, bvh, positions, near, hit, stats) {
        improved = true;
        match far_entry {
            None => return true,
            Some(far_t) if hit.t < far_t => return true,
            _ => {}
        }
    }

    if far_entry.is_some() && intersect_node(ray, bvh, positions, far, hit, stats) {
        improved = true;
    }

    improved
}

/// Brute-force nearest hit over a whole triangle buffer.
///
/// On an improving hit `hit.triangle_index` is the index into `triangles`.
/// Reference answer for [`bvh_intersection`].
pub fn linear_intersection(ray: &Ray, positions: &[Vec3], triangles: &[UVec3], hit: &mut Hit) -> bool {
    let mut improved = false;
    for (index, &tri) in triangles.iter().enumerate() {
        if triangle_intersection(ray, &make_triangle(positions, tri), hit) {
            hit.triangle_index = index;
            improved = true;
        }
    }
    improved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::test_util::{grid, random_soup, random_vec, stacked_quads};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_triangle(z: f32) -> Triangle {
        Triangle::new(Vec3::new(0.0, 0.0, z), Vec3::new(1.0, 0.0, z), Vec3::new(0.0, 1.0, z))
    }

    #[test]
    fn test_triangle_hit_at_centroid() {
        let triangle = Triangle::new(
            Vec3::new(-1.0, -1.0, -5.0),
            Vec3::new(1.0, -1.0, -5.0),
            Vec3::new(0.0, 1.0, -5.0),
        );
        let target = triangle.centroid();
        let ray = Ray::new(Vec3::ZERO, target.normalize());
        let mut hit = Hit::new();

        assert!(triangle_intersection(&ray, &triangle, &mut hit));
        assert!(hit.hit);
        assert!((hit.t - target.length()).abs() < 1e-4);
        assert!((hit.position - target).length() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_triangle_parallel_ray_misses() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::X);
        let mut hit = Hit::new();

        assert!(!triangle_intersection(&ray, &unit_triangle(0.0), &mut hit));
        assert!(!hit.hit);
        assert_eq!(hit.t, f32::INFINITY);
    }

    #[test]
    fn test_triangle_behind_origin_misses() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::Z);
        let mut hit = Hit::new();

        assert!(!triangle_intersection(&ray, &unit_triangle(0.0), &mut hit));
    }

    #[test]
    fn test_triangle_edge_is_inclusive() {
        // Passes exactly through the edge a-b (v == 0)
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), -Vec3::Z);
        let mut hit = Hit::new();

        assert!(triangle_intersection(&ray, &unit_triangle(0.0), &mut hit));
        assert!((hit.t - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_outside_misses() {
        let ray = Ray::new(Vec3::new(0.8, 0.8, 1.0), -Vec3::Z);
        let mut hit = Hit::new();

        assert!(!triangle_intersection(&ray, &unit_triangle(0.0), &mut hit));
    }

    #[test]
    fn test_triangle_commits_only_closer_hits() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 10.0), -Vec3::Z);
        let near = unit_triangle(2.0);
        let far = unit_triangle(-3.0);
        let mut hit = Hit::new();

        assert!(triangle_intersection(&ray, &far, &mut hit));
        assert!((hit.t - 13.0).abs() < 1e-5);

        assert!(triangle_intersection(&ray, &near, &mut hit));
        assert!((hit.t - 8.0).abs() < 1e-5);

        // Still intersects, but no longer improves the record
        assert!(!triangle_intersection(&ray, &far, &mut hit));
        assert!((hit.t - 8.0).abs() < 1e-5);
        assert!((hit.position.z - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_entry_distance() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        let t = aabb_intersection(&ray, &aabb).unwrap();
        assert!((t - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_aabb_origin_inside_returns_zero() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.5, -0.5, 0.0), Vec3::new(0.3, 0.4, 1.0));

        assert_eq!(aabb_intersection(&ray, &aabb), Some(0.0));

        // Boundary counts as inside
        let on_face = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::X);
        assert_eq!(aabb_intersection(&on_face, &aabb), Some(0.0));
    }

    #[test]
    fn test_aabb_pointing_away_misses() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);

        assert_eq!(aabb_intersection(&ray, &aabb), None);
    }

    #[test]
    fn test_aabb_axis_parallel_ray() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        // Zero direction components give infinite inverse components
        let inside_slab = Ray::new(Vec3::new(0.5, 0.5, -3.0), Vec3::Z);
        assert!(aabb_intersection(&inside_slab, &aabb).is_some());

        let outside_slab = Ray::new(Vec3::new(2.0, 0.5, -3.0), Vec3::Z);
        assert_eq!(aabb_intersection(&outside_slab, &aabb), None);
    }

    #[test]
    fn test_aabb_flat_box_is_hit() {
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 1.0, 2.0));
        let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), -Vec3::Z);

        let t = aabb_intersection(&ray, &aabb).unwrap();
        assert!((t - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_aabb_empty_never_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(aabb_intersection(&ray, &Aabb::empty()), None);
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        let (positions, triangles) = random_soup(&mut rng, 400);

        for config in [BuildConfig::median(), BuildConfig::default()] {
            let bvh = Bvh::build(&positions, &triangles, &config);
            let mut hits = 0;

            for _ in 0..300 {
                let origin = random_vec(&mut rng, 15.0);
                let target = random_vec(&mut rng, 8.0);
                let ray = Ray::new(origin, (target - origin).normalize());

                let mut expected = Hit::new();
                let mut actual = Hit::new();
                let linear = linear_intersection(&ray, &positions, &triangles, &mut expected);
                let accelerated = bvh_intersection(&ray, &bvh, &positions, &mut actual);

                assert_eq!(linear, accelerated);
                assert_eq!(expected.hit, actual.hit);
                if expected.hit {
                    hits += 1;
                    assert!((expected.t - actual.t).abs() < 1e-4);
                    assert!((expected.position - actual.position).length() < 1e-3);
                    assert_eq!(bvh.triangle(actual.triangle_index), triangles[expected.triangle_index]);
                }
            }

            assert!(hits > 0);
        }
    }

    #[test]
    fn test_bvh_root_miss_tests_no_triangles() {
        let (positions, triangles) = grid(4);
        let bvh = Bvh::build(&positions, &triangles, &BuildConfig::default());
        let ray = Ray::new(Vec3::new(10.0, 10.0, 5.0), Vec3::Z);

        let mut hit = Hit::new();
        let mut stats = TraversalStats::default();
        assert!(!bvh_intersection_with_stats(&ray, &bvh, &positions, &mut hit, &mut stats));

        assert!(!hit.hit);
        assert_eq!(stats.aabb_tests, 1);
        assert_eq!(stats.nodes_visited, 0);
        assert_eq!(stats.triangle_tests, 0);
    }

    #[test]
    fn test_stats_accumulate() {
        let a = TraversalStats {
            nodes_visited: 1,
            aabb_tests: 2,
            triangle_tests: 3,
        };
        let mut total = a + a;
        total += TraversalStats::default();
        assert_eq!(total.triangle_tests, 6);
        assert_eq!(total.aabb_tests, 4);
    }

    #[test]
    fn test_bvh_prunes_occluded_layers() {
        let (positions, triangles) = stacked_quads(10);
        let bvh = Bvh::build(&positions, &triangles, &BuildConfig::default());
        let ray = Ray::new(Vec3::new(0.3, 0.6, 20.0), -Vec3::Z);

        let mut hit = Hit::new();
        let mut stats = TraversalStats::default();
        assert!(bvh_intersection_with_stats(&ray, &bvh, &positions, &mut hit, &mut stats));

        assert!((hit.position.z - 9.0).abs() < 1e-5);
        assert!(stats.triangle_tests < triangles.len());
    }

    #[test]
    fn test_bvh_keeps_existing_closer_hit() {
        let (positions, triangles) = grid(3);
        let bvh = Bvh::build(&positions, &triangles, &BuildConfig::default());
        let ray = Ray::new(Vec3::new(1.5, 1.2, 4.0), -Vec3::Z);

        let mut hit = Hit::new();
        hit.t = 1.0;
        assert!(!bvh_intersection(&ray, &bvh, &positions, &mut hit));
        assert!(!hit.hit);

        let mut hit = Hit::new();
        assert!(bvh_intersection(&ray, &bvh, &positions, &mut hit));
        assert!((hit.t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_empty_mesh_never_hit() {
        let bvh = Bvh::build(&[], &[], &BuildConfig::default());
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut hit = Hit::new();

        assert!(!bvh_intersection(&ray, &bvh, &[], &mut hit));
        assert!(traverse_bvh(&ray, &bvh).is_empty());
    }

    #[test]
    fn test_traverse_returns_sorted_unique_candidates() {
        let (positions, triangles) = stacked_quads(6);
        let bvh = Bvh::build(&positions, &triangles, &BuildConfig::median());
        let ray = Ray::new(Vec3::new(0.25, 0.5, 10.0), -Vec3::Z);

        let candidates = traverse_bvh(&ray, &bvh);
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));
        assert!(candidates.iter().all(|&i| i < triangles.len()));

        let mut hit = Hit::new();
        assert!(bvh_intersection(&ray, &bvh, &positions, &mut hit));
        assert!(candidates.contains(&hit.triangle_index));
    }

    #[test]
    fn test_traverse_miss_is_empty() {
        let (positions, triangles) = grid(2);
        let bvh = Bvh::build(&positions, &triangles, &BuildConfig::default());
        let ray = Ray::new(Vec3::new(-5.0, -5.0, 1.0), -Vec3::X);

        assert!(traverse_bvh(&ray, &bvh).is_empty());
    }

    #[test]
    fn test_linear_reports_source_index() {
        let (positions, triangles) = stacked_quads(3);
        let ray = Ray::new(Vec3::new(0.7, 0.2, 10.0), -Vec3::Z);
        let mut hit = Hit::new();

        assert!(linear_intersection(&ray, &positions, &triangles, &mut hit));
        // Top layer, lower-right triangle
        assert_eq!(hit.triangle_index, 4);
    }
}
