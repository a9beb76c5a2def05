use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use holoview_scene::MeshGeometry;

use crate::bounds::{bounds_of_positions, Aabb};
use crate::material::{Material, MaterialTag};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

#[derive(Debug, Clone)]
pub struct MeshNode {
    pub geometry: Arc<MeshGeometry>,
    pub materials: Vec<Arc<Material>>,
    /// Deep copies of the imported materials, filled on the first switch away
    /// from normal mode and only read afterwards.
    pub original_materials: Option<Vec<Arc<Material>>>,
    pub tag: MaterialTag,
}

impl MeshNode {
    pub fn new(geometry: Arc<MeshGeometry>, material: Arc<Material>) -> Self {
        Self {
            geometry,
            materials: vec![material],
            original_materials: None,
            tag: MaterialTag::default(),
        }
    }

    pub fn local_bounds(&self) -> Aabb {
        bounds_of_positions(&self.geometry.positions)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<MeshNode>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_mesh(name: impl Into<String>, mesh: MeshNode) -> Self {
        Self {
            name: name.into(),
            mesh: Some(mesh),
            ..Self::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// World-space bounds of this node's mesh and every mesh below it.
    pub fn subtree_bounds(&self, parent: Mat4) -> Aabb {
        let mut aabb = Aabb::empty();
        self.visit(parent, &mut |world, mesh: &MeshNode| {
            aabb.union(&mesh.local_bounds().transformed(world));
        });
        aabb
    }

    fn visit<F: FnMut(Mat4, &MeshNode)>(&self, parent: Mat4, f: &mut F) {
        let world = parent * self.transform.matrix();
        if let Some(mesh) = &self.mesh {
            f(world, mesh);
        }
        for child in &self.children {
            child.visit(world, f);
        }
    }

    fn visit_mut<F: FnMut(Mat4, &mut MeshNode)>(&mut self, parent: Mat4, f: &mut F) {
        let world = parent * self.transform.matrix();
        if let Some(mesh) = &mut self.mesh {
            f(world, mesh);
        }
        for child in &mut self.children {
            child.visit_mut(world, f);
        }
    }
}

/// A loaded asset: a hierarchy of nodes with the normalization transform on
/// the root.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub root: ModelNode,
}

impl Model {
    pub fn new(root: ModelNode) -> Self {
        Self { root }
    }

    /// Calls `f` for every mesh node with its world matrix, depth first.
    pub fn for_each_mesh<F: FnMut(Mat4, &MeshNode)>(&self, mut f: F) {
        self.root.visit(Mat4::IDENTITY, &mut f);
    }

    pub fn for_each_mesh_mut<F: FnMut(Mat4, &mut MeshNode)>(&mut self, mut f: F) {
        self.root.visit_mut(Mat4::IDENTITY, &mut f);
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.for_each_mesh(|_, _| count += 1);
        count
    }

    /// World-space bounds from each mesh's local box transformed by its
    /// world matrix.
    pub fn world_bounds(&self) -> Aabb {
        self.root.subtree_bounds(Mat4::IDENTITY)
    }
}
