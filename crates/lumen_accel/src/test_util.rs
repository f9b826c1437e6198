//! Small procedural meshes for the BVH and intersection tests.

use lumen_math::{UVec3, Vec3};
use rand::rngs::StdRng;
use rand::Rng;

/// Axis-aligned unit quad in the XY plane at height `z`, split into two
/// counter-clockwise triangles.
pub fn quad(z: f32) -> (Vec<Vec3>, Vec<UVec3>) {
    let positions = vec![
        Vec3::new(0.0, 0.0, z),
        Vec3::new(1.0, 0.0, z),
        Vec3::new(1.0, 1.0, z),
        Vec3::new(0.0, 1.0, z),
    ];
    let triangles = vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)];
    (positions, triangles)
}

/// `count` unit quads stacked along +Z with unit spacing, starting at z = 0.
pub fn stacked_quads(count: usize) -> (Vec<Vec3>, Vec<UVec3>) {
    let mut positions = Vec::new();
    let mut triangles = Vec::new();

    for layer in 0..count {
        let (p, t) = quad(layer as f32);
        let base = positions.len() as u32;
        positions.extend(p);
        triangles.extend(t.into_iter().map(|tri| tri + UVec3::splat(base)));
    }

    (positions, triangles)
}

/// `n` x `n` grid of quads in the XY plane covering [0, n] x [0, n].
pub fn grid(n: u32) -> (Vec<Vec3>, Vec<UVec3>) {
    let mut positions = Vec::new();
    for y in 0..=n {
        for x in 0..=n {
            positions.push(Vec3::new(x as f32, y as f32, 0.0));
        }
    }

    let row = n + 1;
    let mut triangles = Vec::new();
    for y in 0..n {
        for x in 0..n {
            let i = y * row + x;
            triangles.push(UVec3::new(i, i + 1, i + row + 1));
            triangles.push(UVec3::new(i, i + row + 1, i + row));
        }
    }

    (positions, triangles)
}

/// Random soup of small triangles scattered in [-10, 10]^3.
pub fn random_soup(rng: &mut StdRng, count: usize) -> (Vec<Vec3>, Vec<UVec3>) {
    let mut positions = Vec::with_capacity(count * 3);
    let mut triangles = Vec::with_capacity(count);

    for i in 0..count {
        let center = random_vec(rng, 10.0);
        for _ in 0..3 {
            positions.push(center + random_vec(rng, 1.5));
        }
        let base = (i * 3) as u32;
        triangles.push(UVec3::new(base, base + 1, base + 2));
    }

    (positions, triangles)
}

/// Uniform random vector in [-extent, extent]^3.
pub fn random_vec(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}
