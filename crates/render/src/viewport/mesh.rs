use std::collections::HashSet;

use egui_wgpu::wgpu;
use holoview_scene::{MeshGeometry, SceneLine};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    pub(crate) position: [f32; 3],
    pub(crate) normal: [f32; 3],
}

pub(crate) const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

pub(crate) fn build_vertices(geometry: &MeshGeometry) -> Vec<Vertex> {
    let fallback_normal = [0.0, 1.0, 0.0];
    geometry
        .positions
        .iter()
        .enumerate()
        .map(|(index, position)| Vertex {
            position: *position,
            normal: geometry.normals.get(index).copied().unwrap_or(fallback_normal),
        })
        .collect()
}

/// Line-list indices with each shared triangle edge emitted once.
pub(crate) fn wireframe_edges(indices: &[u32]) -> Vec<u32> {
    let mut seen = HashSet::with_capacity(indices.len());
    let mut edges = Vec::with_capacity(indices.len() * 2);
    for tri in indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let key = if a < b { (a, b) } else { (b, a) };
            if seen.insert(key) {
                edges.push(a);
                edges.push(b);
            }
        }
    }
    edges
}

/// Two vertices per segment of each polyline, in world space.
pub(crate) fn line_vertices(line: &SceneLine) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(line.points.len().saturating_sub(1) * 2);
    for pair in line.points.windows(2) {
        out.push(Vertex {
            position: pair[0],
            normal: [0.0; 3],
        });
        out.push(Vertex {
            position: pair[1],
            normal: [0.0; 3],
        });
    }
    out
}
