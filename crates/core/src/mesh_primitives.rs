use std::f32::consts::TAU;

use holoview_scene::MeshGeometry;

/// Flat disc in the XY plane facing +Z, center vertex first.
pub fn make_circle(radius: f32, segments: u32) -> MeshGeometry {
    let segments = segments.max(3);
    let mut positions = Vec::with_capacity(segments as usize + 2);
    positions.push([0.0, 0.0, 0.0]);
    for s in 0..=segments {
        let theta = s as f32 / segments as f32 * TAU;
        positions.push([radius * theta.cos(), radius * theta.sin(), 0.0]);
    }

    let mut indices = Vec::with_capacity(segments as usize * 3);
    for i in 1..=segments {
        indices.extend_from_slice(&[i, i + 1, 0]);
    }

    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
    MeshGeometry::new(positions, normals, Some(indices))
}

/// Flat annulus in the XY plane facing +Z.
pub fn make_ring(inner_radius: f32, outer_radius: f32, theta_segments: u32) -> MeshGeometry {
    let theta_segments = theta_segments.max(3);
    let stride = theta_segments + 1;
    let mut positions = Vec::with_capacity(stride as usize * 2);
    for radius in [inner_radius, outer_radius] {
        for s in 0..=theta_segments {
            let theta = s as f32 / theta_segments as f32 * TAU;
            positions.push([radius * theta.cos(), radius * theta.sin(), 0.0]);
        }
    }

    let mut indices = Vec::with_capacity(theta_segments as usize * 6);
    for s in 0..theta_segments {
        let a = s;
        let b = s + stride;
        let c = s + stride + 1;
        let d = s + 1;
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
    MeshGeometry::new(positions, normals, Some(indices))
}

/// Axis-aligned box centered on the origin with per-face normals.
///
/// Zero-sized axes are allowed and yield a flat slab.
pub fn make_box(size: [f32; 3]) -> MeshGeometry {
    let hx = size[0] * 0.5;
    let hy = size[1] * 0.5;
    let hz = size[2] * 0.5;

    let corners = [
        [-hx, -hy, -hz],
        [hx, -hy, -hz],
        [hx, hy, -hz],
        [-hx, hy, -hz],
        [-hx, -hy, hz],
        [hx, -hy, hz],
        [hx, hy, hz],
        [-hx, hy, hz],
    ];

    let faces = [
        ([0, 3, 2, 1], [0.0, 0.0, -1.0]),
        ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
        ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
        ([3, 7, 6, 2], [0.0, 1.0, 0.0]),
        ([1, 2, 6, 5], [1.0, 0.0, 0.0]),
        ([0, 4, 7, 3], [-1.0, 0.0, 0.0]),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, normal) in faces {
        let base = positions.len() as u32;
        for idx in face {
            positions.push(corners[idx]);
            normals.push(normal);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshGeometry::new(positions, normals, Some(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_has_center_and_closed_rim() {
        let circle = make_circle(2.0, 64);
        assert_eq!(circle.positions.len(), 66);
        assert_eq!(circle.indices.as_ref().map(Vec::len), Some(64 * 3));
        let (min, max) = circle.bounds().expect("bounds");
        assert!((max[0] - 2.0).abs() < 1.0e-5);
        assert!((min[1] + 2.0).abs() < 1.0e-3);
    }

    #[test]
    fn ring_spans_inner_to_outer_radius() {
        let ring = make_ring(1.494, 1.506, 128);
        assert_eq!(ring.positions.len(), 129 * 2);
        assert_eq!(ring.indices.as_ref().map(Vec::len), Some(128 * 6));
        let inner = glam::Vec3::from(ring.positions[0]).length();
        let outer = glam::Vec3::from(ring.positions[129]).length();
        assert!((inner - 1.494).abs() < 1.0e-5);
        assert!((outer - 1.506).abs() < 1.0e-5);
    }

    #[test]
    fn flat_box_has_zero_height() {
        let slab = make_box([3.0, 0.0, 0.01]);
        let (min, max) = slab.bounds().expect("bounds");
        assert_eq!(min[1], 0.0);
        assert_eq!(max[1], 0.0);
        assert!((max[0] - 1.5).abs() < 1.0e-6);
    }
}
