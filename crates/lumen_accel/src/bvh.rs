//! Bounding Volume Hierarchy (BVH) over a triangle mesh.
//!
//! Nodes live in a flat array (root at index 0, siblings adjacent) and each
//! node owns a contiguous range of a private, reordered copy of the mesh's
//! triangle-index buffer. The mesh's own buffer is never touched.

use std::ops::Range;
use std::time::Instant;

use lumen_math::{Aabb, Triangle, UVec3, Vec3};

use crate::config::{BuildConfig, SplitStrategy};

/// A node of the flat BVH array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    /// Tight bounds of every triangle in the node's range.
    pub aabb: Aabb,
    /// Index of the first child; the second child is `child_index + 1`.
    /// Zero marks a leaf (the root can never be a child).
    pub child_index: usize,
    /// Start of the node's range in the BVH triangle buffer.
    pub first_triangle: usize,
    /// Length of the node's range.
    pub num_triangles: usize,
}

impl BvhNode {
    fn new(first_triangle: usize, num_triangles: usize) -> Self {
        Self {
            aabb: Aabb::empty(),
            child_index: 0,
            first_triangle,
            num_triangles,
        }
    }

    /// Returns true if the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.child_index == 0
    }

    /// Half-open range of the node in the BVH triangle buffer.
    #[inline]
    pub fn triangle_range(&self) -> Range<usize> {
        self.first_triangle..self.first_triangle + self.num_triangles
    }
}

/// Binary BVH over the triangles of one mesh.
///
/// Built once through [`Bvh::build`] and immutable afterwards; changing the
/// build configuration or the geometry means building a new one.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    triangles: Vec<UVec3>,
    depth: usize,
    config: BuildConfig,
}

/// Look up the vertex positions of an indexed triangle.
#[inline]
pub(crate) fn make_triangle(positions: &[Vec3], indices: UVec3) -> Triangle {
    Triangle::new(
        positions[indices.x as usize],
        positions[indices.y as usize],
        positions[indices.z as usize],
    )
}

impl Bvh {
    /// Build a BVH over `triangles`, whose indices refer into `positions`.
    ///
    /// Never fails: coincident or degenerate triangles end up sharing a
    /// larger leaf. An empty triangle list yields a single empty leaf.
    pub fn build(positions: &[Vec3], triangles: &[UVec3], config: &BuildConfig) -> Self {
        let start = Instant::now();

        let mut bvh = Self {
            nodes: vec![BvhNode::new(0, triangles.len())],
            triangles: triangles.to_vec(),
            depth: 0,
            config: *config,
        };

        let candidates = match config.strategy {
            SplitStrategy::Sah => config.effective_candidates(),
            SplitStrategy::Median => 0,
        };
        bvh.split(positions, 0, 0, candidates);

        log::info!(
            "BVH built in {:.2?}: {} triangles, {} nodes, {} leaves, depth {} ({:?})",
            start.elapsed(),
            bvh.triangles.len(),
            bvh.nodes.len(),
            bvh.leaf_count(),
            bvh.depth,
            config.strategy
        );

        bvh
    }

    /// Split a node in two and recurse into both halves.
    fn split(&mut self, positions: &[Vec3], node_index: usize, depth: usize, candidates: usize) {
        let range = self.nodes[node_index].triangle_range();
        let count = range.len();

        let mut aabb = Aabb::empty();
        for &tri in &self.triangles[range.clone()] {
            aabb.extend_triangle(&make_triangle(positions, tri));
        }
        aabb.depth = depth;

        let node = &mut self.nodes[node_index];
        node.aabb = aabb;
        node.child_index = 0;
        self.depth = self.depth.max(depth);

        if count <= 1 {
            return;
        }

        let split = if self.config.strategy == SplitStrategy::Median || count == 2 {
            Some(self.median_split(positions, range.clone(), &aabb))
        } else {
            self.sah_split(positions, range.clone(), &aabb, candidates)
        };
        let Some((axis, position)) = split else {
            log::debug!("No finite SAH cost for node {}, keeping {} triangles", node_index, count);
            return;
        };

        let left_count = self.partition(positions, range.clone(), axis, position);
        let right_count = count - left_count;

        // Every centroid landed on one side: keep this node as a leaf.
        if left_count == 0 || right_count == 0 {
            return;
        }

        let left_index = self.nodes.len();
        self.nodes.push(BvhNode::new(range.start, left_count));
        self.nodes.push(BvhNode::new(range.start + left_count, right_count));
        self.nodes[node_index].child_index = left_index;

        self.split(positions, left_index, depth + 1, candidates);
        self.split(positions, left_index + 1, depth + 1, candidates);
    }

    /// Longest axis, halfway between the two centroids around the median.
    fn median_split(&self, positions: &[Vec3], range: Range<usize>, aabb: &Aabb) -> (usize, f32) {
        let axis = aabb.longest_axis();

        let mut coords: Vec<f32> = self.triangles[range]
            .iter()
            .map(|&tri| make_triangle(positions, tri).centroid()[axis])
            .collect();
        coords.sort_by(|a, b| a.total_cmp(b));

        let half = coords.len() / 2;
        (axis, (coords[half - 1] + coords[half]) * 0.5)
    }

    /// Cheapest of `candidates` evenly spaced planes per axis.
    ///
    /// Returns `None` if no candidate has a finite cost.
    fn sah_split(
        &self,
        positions: &[Vec3],
        range: Range<usize>,
        aabb: &Aabb,
        candidates: usize,
    ) -> Option<(usize, f32)> {
        let min = aabb.begin_corner;
        let step = aabb.diagonal() / (candidates + 1) as f32;

        let mut best = None;
        let mut best_cost = f32::MAX;

        for axis in 0..3 {
            for i in 1..=candidates {
                let position = min[axis] + i as f32 * step[axis];
                let cost = self.evaluate_split(positions, range.clone(), axis, position);

                // Strict comparison: the first candidate wins ties
                if cost < best_cost {
                    best_cost = cost;
                    best = Some((axis, position));
                }
            }
        }

        best
    }

    /// SAH cost of splitting a range at `position` on `axis`.
    fn evaluate_split(&self, positions: &[Vec3], range: Range<usize>, axis: usize, position: f32) -> f32 {
        let mut left = Aabb::empty();
        let mut right = Aabb::empty();
        let mut left_count = 0usize;
        let mut right_count = 0usize;

        for &tri in &self.triangles[range] {
            let triangle = make_triangle(positions, tri);
            if triangle.centroid()[axis] < position {
                left.extend_triangle(&triangle);
                left_count += 1;
            } else {
                right.extend_triangle(&triangle);
                right_count += 1;
            }
        }

        left.half_surface_area() * left_count as f32 + right.half_surface_area() * right_count as f32
    }

    /// Move every triangle whose centroid is below `position` to the front of
    /// the range. Returns the size of that front block.
    fn partition(&mut self, positions: &[Vec3], range: Range<usize>, axis: usize, position: f32) -> usize {
        let first = range.start;
        let mut left_count = 0;

        for i in range {
            if make_triangle(positions, self.triangles[i]).centroid()[axis] < position {
                self.triangles.swap(first + left_count, i);
                left_count += 1;
            }
        }

        left_count
    }

    /// All nodes, root first.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// The root node.
    pub fn root(&self) -> &BvhNode {
        &self.nodes[0]
    }

    /// The reordered triangle-index buffer that node ranges point into.
    pub fn triangles(&self) -> &[UVec3] {
        &self.triangles
    }

    /// Vertex indices of the triangle at a position of the BVH buffer.
    pub fn triangle(&self, index: usize) -> UVec3 {
        self.triangles[index]
    }

    /// Vertex positions of the triangle at a position of the BVH buffer.
    #[inline]
    pub fn triangle_geometry(&self, positions: &[Vec3], index: usize) -> Triangle {
        make_triangle(positions, self.triangles[index])
    }

    /// Maximum node depth (root = 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Configuration the tree was built with.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Returns true if the BVH holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounds of every node at exactly `depth` below the root.
    ///
    /// Used to visualise one level of the hierarchy at a time.
    pub fn aabbs_at_depth(&self, depth: usize) -> Vec<Aabb> {
        let mut aabbs = Vec::new();
        self.collect_aabbs(0, depth, &mut aabbs);
        aabbs
    }

    fn collect_aabbs(&self, node_index: usize, depth: usize, aabbs: &mut Vec<Aabb>) {
        let node = &self.nodes[node_index];
        if depth == 0 {
            aabbs.push(node.aabb);
            return;
        }
        if !node.is_leaf() {
            self.collect_aabbs(node.child_index, depth - 1, aabbs);
            self.collect_aabbs(node.child_index + 1, depth - 1, aabbs);
        }
    }
}
