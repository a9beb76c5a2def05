use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn expand_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        self.expand_point(other.min);
        self.expand_point(other.max);
    }

    /// Bounds of this box's eight corners after `matrix`.
    pub fn transformed(&self, matrix: Mat4) -> Aabb {
        let mut out = Aabb::empty();
        if self.is_empty() {
            return out;
        }
        let (min, max) = (self.min, self.max);
        for corner in [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(max.x, max.y, max.z),
        ] {
            out.expand_point(matrix.transform_point3(corner));
        }
        out
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

pub fn bounds_of_positions(positions: &[[f32; 3]]) -> Aabb {
    let mut aabb = Aabb::empty();
    for p in positions {
        aabb.expand_point(Vec3::from(*p));
    }
    aabb
}
