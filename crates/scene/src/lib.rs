use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Triangle geometry shared between the viewer model and the GPU cache.
///
/// `id` is unique per allocation and is what the renderer keys uploads on,
/// so geometry must be treated as immutable once built.
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    pub id: u64,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Option<Vec<u32>>,
}

impl MeshGeometry {
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        indices: Option<Vec<u32>>,
    ) -> Self {
        Self {
            id: NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed),
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Triangle list indices, synthesized for non-indexed geometry.
    pub fn triangle_indices(&self) -> Vec<u32> {
        match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..self.positions.len() as u32).collect(),
        }
    }

    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut iter = self.positions.iter();
        let first = iter.next()?;
        let mut min = *first;
        let mut max = *first;
        for p in iter {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some((min, max))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneShading {
    Unlit,
    Phong { specular: [f32; 3], shininess: f32 },
    Standard { roughness: f32, metalness: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMaterial {
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub opacity: f32,
    pub shading: SceneShading,
    pub wireframe: bool,
    pub flat_shading: bool,
    pub double_sided: bool,
}

#[derive(Debug, Clone)]
pub struct SceneItem {
    pub geometry: Arc<MeshGeometry>,
    pub transform: glam::Mat4,
    pub material: SceneMaterial,
}

#[derive(Debug, Clone)]
pub struct SceneLine {
    pub points: Vec<[f32; 3]>,
    pub color: [f32; 3],
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneLight {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: [f32; 3],
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCamera {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_y_degrees: f32,
    /// Width over height of the viewport the viewer was last resized to.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    pub items: Vec<SceneItem>,
    pub lines: Vec<SceneLine>,
    pub lights: Vec<SceneLight>,
    pub camera: SceneCamera,
}

impl SceneSnapshot {
    pub fn geometry_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.items.iter().map(|item| item.geometry.id)
    }

    pub fn ambient(&self) -> [f32; 3] {
        self.lights
            .iter()
            .filter_map(|light| match light {
                SceneLight::Ambient { color, intensity } => {
                    Some([color[0] * intensity, color[1] * intensity, color[2] * intensity])
                }
                _ => None,
            })
            .fold([0.0; 3], |acc, c| [acc[0] + c[0], acc[1] + c[1], acc[2] + c[2]])
    }

    pub fn directional(&self) -> Option<([f32; 3], [f32; 3])> {
        self.lights.iter().find_map(|light| match light {
            SceneLight::Directional {
                color,
                intensity,
                position,
            } => Some((
                [color[0] * intensity, color[1] * intensity, color[2] * intensity],
                *position,
            )),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_ids_are_unique() {
        let a = MeshGeometry::new(vec![[0.0; 3]], Vec::new(), None);
        let b = MeshGeometry::new(vec![[0.0; 3]], Vec::new(), None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn non_indexed_geometry_synthesizes_triangle_list() {
        let geo = MeshGeometry::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], Vec::new(), None);
        assert_eq!(geo.triangle_indices(), vec![0, 1, 2]);
        assert_eq!(geo.bounds(), Some(([0.0, 0.0, 0.0], [1.0, 1.0, 0.0])));
    }
}
