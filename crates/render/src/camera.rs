use egui::epaint::Rect;
use egui_wgpu::ScreenDescriptor;
use glam::{Mat4, Vec3};
use holoview_scene::SceneCamera;

pub fn viewport_aspect(rect: Rect, screen_descriptor: &ScreenDescriptor) -> f32 {
    let viewport_width = (rect.width() * screen_descriptor.pixels_per_point).max(1.0);
    let viewport_height = (rect.height() * screen_descriptor.pixels_per_point).max(1.0);
    viewport_width / viewport_height
}

/// The camera's own aspect, or the paint rect's when the camera has none.
pub fn projection_aspect(
    camera: &SceneCamera,
    rect: Rect,
    screen_descriptor: &ScreenDescriptor,
) -> f32 {
    if camera.aspect.is_finite() && camera.aspect > 0.0 {
        camera.aspect
    } else {
        viewport_aspect(rect, screen_descriptor)
    }
}

pub fn camera_view_proj(
    camera: &SceneCamera,
    rect: Rect,
    screen_descriptor: &ScreenDescriptor,
) -> Mat4 {
    let aspect = projection_aspect(camera, rect, screen_descriptor);
    let position = Vec3::from(camera.position);
    let target = Vec3::from(camera.target);

    let view = Mat4::look_at_rh(position, target, Vec3::Y);
    let projection = Mat4::perspective_rh(
        camera.fov_y_degrees.to_radians(),
        aspect,
        camera.near.max(1.0e-4),
        camera.far.max(camera.near + 1.0e-3),
    );
    projection * view
}
