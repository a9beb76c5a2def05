use std::f32::consts::{PI, TAU};

use glam::Vec3;
use holoview_scene::SceneCamera;

const MIN_POLAR: f32 = 1.0e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 3.0),
            target: Vec3::ZERO,
            fov_y_degrees: 75.0,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn to_scene(&self) -> SceneCamera {
        SceneCamera {
            position: self.position.to_array(),
            target: self.target.to_array(),
            fov_y_degrees: self.fov_y_degrees,
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        }
    }
}

/// Orbit around a target with damped rotate and pan.
///
/// Input accumulates into pending deltas; each `update` applies a
/// `damping` fraction of them and decays the rest, so motion eases out over
/// the following frames.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            damping: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }
}

impl OrbitControls {
    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    /// Pointer drag in pixels over a viewport of `viewport_height` pixels.
    pub fn drag_rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.rotate_left(TAU * dx / height * self.rotate_speed);
        self.rotate_up(TAU * dy / height * self.rotate_speed);
    }

    /// Positive steps move the camera toward the target.
    pub fn dolly(&mut self, steps: f32) {
        let factor = 0.95_f32.powf(self.zoom_speed * steps.abs());
        if steps > 0.0 {
            self.scale *= factor;
        } else if steps < 0.0 {
            self.scale /= factor;
        }
    }

    /// Screen-space pan in pixels.
    pub fn drag_pan(&mut self, camera: &PerspectiveCamera, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        let distance = (camera.position - camera.target).length()
            * (camera.fov_y_degrees.to_radians() * 0.5).tan();
        let forward = (camera.target - camera.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        self.pan_offset -= right * (2.0 * dx * distance / height);
        self.pan_offset += up * (2.0 * dy * distance / height);
    }

    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - camera.target;
        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, 0.0)
        };

        theta += self.theta_delta * self.damping;
        phi += self.phi_delta * self.damping;
        phi = phi.clamp(MIN_POLAR, PI - MIN_POLAR);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        camera.target += self.pan_offset * self.damping;

        let sin_phi = phi.sin();
        let offset = Vec3::new(radius * sin_phi * theta.sin(), radius * phi.cos(), radius * sin_phi * theta.cos());
        camera.position = camera.target + offset;

        let decay = 1.0 - self.damping;
        self.theta_delta *= decay;
        self.phi_delta *= decay;
        self.pan_offset *= decay;
        self.scale = 1.0;
    }
}
