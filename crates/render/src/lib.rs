mod camera;
mod mesh_cache;
mod viewport;

pub use camera::{camera_view_proj, projection_aspect, viewport_aspect};
pub use mesh_cache::{GpuMesh, GpuMeshCache, GpuMeshCacheStats};
pub use viewport::{ViewportRenderer, ViewportStats};
