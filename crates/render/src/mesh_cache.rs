use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use egui_wgpu::wgpu;
use egui_wgpu::wgpu::util::DeviceExt as _;
use holoview_scene::MeshGeometry;

use crate::viewport::{build_vertices, wireframe_edges};

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub edge_buffer: Option<wgpu::Buffer>,
    pub edge_count: u32,
    /// Object-space bounds center, used for transparent sorting.
    pub center: [f32; 3],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GpuMeshCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub uploads: u64,
    pub mesh_count: u32,
}

/// GPU buffers keyed by `MeshGeometry::id`. Geometry is immutable, so an id
/// that is already cached never needs re-uploading.
pub struct GpuMeshCache {
    meshes: HashMap<u64, GpuMesh>,
    hits: AtomicU64,
    misses: AtomicU64,
    uploads: AtomicU64,
}

impl GpuMeshCache {
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            uploads: AtomicU64::new(0),
        }
    }

    pub fn get(&self, mesh_id: u64) -> Option<&GpuMesh> {
        let mesh = self.meshes.get(&mesh_id);
        if mesh.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        mesh
    }

    /// Bounds center without touching the hit counters.
    pub fn center(&self, mesh_id: u64) -> Option<[f32; 3]> {
        self.meshes.get(&mesh_id).map(|mesh| mesh.center)
    }

    /// Uploads `geometry` unless it is cached. Edge buffers are built on first
    /// use because only wireframe materials need them.
    pub fn upload(&mut self, device: &wgpu::Device, geometry: &MeshGeometry, with_edges: bool) {
        if geometry.positions.is_empty() {
            return;
        }
        if let Some(mesh) = self.meshes.get_mut(&geometry.id) {
            if with_edges && mesh.edge_buffer.is_none() {
                let edges = wireframe_edges(&geometry.triangle_indices());
                mesh.edge_count = edges.len() as u32;
                mesh.edge_buffer = Some(create_index_buffer(device, "holoview_mesh_edges", &edges));
            }
            return;
        }

        let vertices = build_vertices(geometry);
        let indices = geometry.triangle_indices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("holoview_mesh_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = create_index_buffer(device, "holoview_mesh_indices", &indices);
        let (edge_buffer, edge_count) = if with_edges {
            let edges = wireframe_edges(&indices);
            (
                Some(create_index_buffer(device, "holoview_mesh_edges", &edges)),
                edges.len() as u32,
            )
        } else {
            (None, 0)
        };
        let center = geometry
            .bounds()
            .map(|(min, max)| {
                [
                    (min[0] + max[0]) * 0.5,
                    (min[1] + max[1]) * 0.5,
                    (min[2] + max[2]) * 0.5,
                ]
            })
            .unwrap_or([0.0; 3]);

        self.meshes.insert(
            geometry.id,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: indices.len() as u32,
                edge_buffer,
                edge_count,
                center,
            },
        );
        self.uploads.fetch_add(1, Ordering::Relaxed);
    }

    /// Drops buffers for geometry that is no longer in the scene.
    pub fn retain(&mut self, live: &HashSet<u64>) {
        self.meshes.retain(|id, _| live.contains(id));
    }

    pub fn stats_snapshot(&self) -> GpuMeshCacheStats {
        GpuMeshCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            uploads: self.uploads.load(Ordering::Relaxed),
            mesh_count: self.meshes.len() as u32,
        }
    }
}

fn create_index_buffer(device: &wgpu::Device, label: &str, indices: &[u32]) -> wgpu::Buffer {
    // Zero-sized buffers are invalid; keep one dummy index.
    let contents: &[u32] = if indices.is_empty() { &[0] } else { indices };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(contents),
        usage: wgpu::BufferUsages::INDEX,
    })
}
