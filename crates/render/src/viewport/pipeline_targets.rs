use egui_wgpu::wgpu;

use super::pipeline::DEPTH_FORMAT;

/// Color + depth attachments the scene is drawn into before the blit.
pub(super) struct OffscreenTargets {
    _color: wgpu::Texture,
    pub(super) color_view: wgpu::TextureView,
    _depth: wgpu::Texture,
    pub(super) depth_view: wgpu::TextureView,
    size: [u32; 2],
}

impl OffscreenTargets {
    pub(super) fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let size = [width.max(1), height.max(1)];
        let (color, color_view) = create_target(
            device,
            "holoview_viewport_offscreen",
            target_format,
            size,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let (depth, depth_view) = create_target(
            device,
            "holoview_viewport_depth",
            DEPTH_FORMAT,
            size,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        Self {
            _color: color,
            color_view,
            _depth: depth,
            depth_view,
            size,
        }
    }

    pub(super) fn matches(&self, width: u32, height: u32) -> bool {
        self.size == [width.max(1), height.max(1)]
    }
}

fn create_target(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    size: [u32; 2],
    usage: wgpu::TextureUsages,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size[0],
            height: size[1],
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
