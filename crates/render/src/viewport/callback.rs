use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use egui::epaint::Rect;
use egui_wgpu::wgpu;
use egui_wgpu::{CallbackResources, CallbackTrait};
use glam::Vec3;
use holoview_scene::SceneSnapshot;

use super::callback_helpers::{draw_order, draw_uniforms, frame_uniforms, is_transparent, line_uniforms};
use super::mesh::{line_vertices, Vertex};
use super::pipeline::{ensure_offscreen_targets, DrawUniforms, PipelineState};
use super::{ViewportSceneState, ViewportStatsState};
use crate::camera::camera_view_proj;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 8.0 / 255.0,
    g: 10.0 / 255.0,
    b: 16.0 / 255.0,
    a: 1.0,
};

pub(super) struct ViewportCallback {
    pub(super) target_format: wgpu::TextureFormat,
    pub(super) rect: Rect,
    pub(super) stats: Arc<Mutex<ViewportStatsState>>,
    pub(super) scene: Arc<Mutex<ViewportSceneState>>,
}

enum DrawCommand {
    Mesh {
        mesh_id: u64,
        slot: u32,
        transparent: bool,
        double_sided: bool,
    },
    Edges {
        mesh_id: u64,
        slot: u32,
    },
    Lines {
        slot: u32,
        first: u32,
        count: u32,
    },
}

struct FramePlan {
    commands: Vec<DrawCommand>,
    uniforms: Vec<DrawUniforms>,
    line_vertices: Vec<Vertex>,
}

fn plan_frame(pipeline: &PipelineState, scene: &SceneSnapshot) -> FramePlan {
    let camera_pos = Vec3::from(scene.camera.position);
    let order = draw_order(&scene.items, camera_pos, |item| {
        pipeline
            .mesh_cache
            .center(item.geometry.id)
            .map(Vec3::from)
            .unwrap_or(Vec3::ZERO)
    });

    let mut plan = FramePlan {
        commands: Vec::with_capacity(order.len() + scene.lines.len()),
        uniforms: Vec::with_capacity(order.len() + scene.lines.len()),
        line_vertices: Vec::new(),
    };
    for index in order {
        let item = &scene.items[index];
        let slot = plan.uniforms.len() as u32;
        let mesh_id = item.geometry.id;
        if item.material.wireframe {
            plan.uniforms
                .push(draw_uniforms(item.transform, &item.material, true));
            plan.commands.push(DrawCommand::Edges { mesh_id, slot });
        } else {
            plan.uniforms
                .push(draw_uniforms(item.transform, &item.material, false));
            plan.commands.push(DrawCommand::Mesh {
                mesh_id,
                slot,
                transparent: is_transparent(&item.material),
                double_sided: item.material.double_sided,
            });
        }
    }
    for line in &scene.lines {
        let vertices = line_vertices(line);
        if vertices.is_empty() {
            continue;
        }
        let slot = plan.uniforms.len() as u32;
        plan.uniforms.push(line_uniforms(line.color, line.opacity));
        plan.commands.push(DrawCommand::Lines {
            slot,
            first: plan.line_vertices.len() as u32,
            count: vertices.len() as u32,
        });
        plan.line_vertices.extend(vertices);
    }
    plan
}

impl CallbackTrait for ViewportCallback {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        egui_encoder: &mut wgpu::CommandEncoder,
        callback_resources: &mut CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        if callback_resources.get::<PipelineState>().is_none() {
            callback_resources.insert(PipelineState::new(device, self.target_format));
        }
        let Some(pipeline) = callback_resources.get_mut::<PipelineState>() else {
            return Vec::new();
        };

        let width = (self.rect.width() * screen_descriptor.pixels_per_point)
            .round()
            .max(1.0) as u32;
        let height = (self.rect.height() * screen_descriptor.pixels_per_point)
            .round()
            .max(1.0) as u32;
        ensure_offscreen_targets(device, pipeline, self.target_format, width, height);

        let (version, scene) = match self.scene.lock() {
            Ok(state) => (state.version, state.scene.clone()),
            Err(_) => return Vec::new(),
        };

        if version != pipeline.scene_version {
            let live: HashSet<u64> = scene
                .as_ref()
                .map(|scene| scene.geometry_ids().collect())
                .unwrap_or_default();
            pipeline.mesh_cache.retain(&live);
            if let Some(scene) = &scene {
                for item in &scene.items {
                    pipeline
                        .mesh_cache
                        .upload(device, &item.geometry, item.material.wireframe);
                }
            }
            pipeline.scene_version = version;
        }

        let plan = match &scene {
            Some(scene) => {
                let view_proj = camera_view_proj(&scene.camera, self.rect, screen_descriptor);
                let frame = frame_uniforms(scene, view_proj, pipeline.encode_srgb);
                queue.write_buffer(&pipeline.frame_buffer, 0, bytemuck::bytes_of(&frame));
                plan_frame(pipeline, scene)
            }
            None => FramePlan {
                commands: Vec::new(),
                uniforms: Vec::new(),
                line_vertices: Vec::new(),
            },
        };

        pipeline.ensure_draw_capacity(device, plan.uniforms.len() as u64);
        if !plan.uniforms.is_empty() {
            let stride = pipeline.draw_stride as usize;
            let mut bytes = vec![0u8; stride * plan.uniforms.len()];
            for (slot, uniforms) in plan.uniforms.iter().enumerate() {
                let start = slot * stride;
                let data = bytemuck::bytes_of(uniforms);
                bytes[start..start + data.len()].copy_from_slice(data);
            }
            queue.write_buffer(&pipeline.draw_buffer, 0, &bytes);
        }
        if !plan.line_vertices.is_empty() {
            let data: &[u8] = bytemuck::cast_slice(&plan.line_vertices);
            pipeline.ensure_line_capacity(device, data.len() as u64);
            queue.write_buffer(&pipeline.line_buffer, 0, data);
        }

        let pipeline = &*pipeline;
        let mut draw_calls = 0u32;
        {
            let mut render_pass = egui_encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("holoview_viewport_offscreen"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &pipeline.targets.color_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &pipeline.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
            render_pass.set_bind_group(0, &pipeline.frame_bind_group, &[]);

            for command in &plan.commands {
                match *command {
                    DrawCommand::Mesh {
                        mesh_id,
                        slot,
                        transparent,
                        double_sided,
                    } => {
                        let Some(mesh) = pipeline.mesh_cache.get(mesh_id) else {
                            continue;
                        };
                        if mesh.index_count == 0 {
                            continue;
                        }
                        let offset = (u64::from(slot) * pipeline.draw_stride) as u32;
                        render_pass.set_pipeline(pipeline.mesh_pipeline(transparent, double_sided));
                        render_pass.set_bind_group(1, &pipeline.draw_bind_group, &[offset]);
                        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                        render_pass
                            .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                        draw_calls += 1;
                    }
                    DrawCommand::Edges { mesh_id, slot } => {
                        let Some(mesh) = pipeline.mesh_cache.get(mesh_id) else {
                            continue;
                        };
                        let Some(edges) = &mesh.edge_buffer else {
                            continue;
                        };
                        if mesh.edge_count == 0 {
                            continue;
                        }
                        let offset = (u64::from(slot) * pipeline.draw_stride) as u32;
                        render_pass.set_pipeline(&pipeline.line_pipeline);
                        render_pass.set_bind_group(1, &pipeline.draw_bind_group, &[offset]);
                        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                        render_pass.set_index_buffer(edges.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..mesh.edge_count, 0, 0..1);
                        draw_calls += 1;
                    }
                    DrawCommand::Lines { slot, first, count } => {
                        let offset = (u64::from(slot) * pipeline.draw_stride) as u32;
                        render_pass.set_pipeline(&pipeline.line_pipeline);
                        render_pass.set_bind_group(1, &pipeline.draw_bind_group, &[offset]);
                        render_pass.set_vertex_buffer(0, pipeline.line_buffer.slice(..));
                        render_pass.draw(first..first + count, 0..1);
                        draw_calls += 1;
                    }
                }
            }
        }

        if let Ok(mut stats_state) = self.stats.lock() {
            let now = Instant::now();
            if let Some(last) = stats_state.last_frame {
                let dt = (now - last).as_secs_f32();
                if dt > 0.0 {
                    let fps = 1.0 / dt;
                    let frame_ms = dt * 1000.0;
                    let alpha = 0.1;
                    if stats_state.stats.fps == 0.0 {
                        stats_state.stats.fps = fps;
                        stats_state.stats.frame_time_ms = frame_ms;
                    } else {
                        stats_state.stats.fps += (fps - stats_state.stats.fps) * alpha;
                        stats_state.stats.frame_time_ms +=
                            (frame_ms - stats_state.stats.frame_time_ms) * alpha;
                    }
                }
            }
            stats_state.last_frame = Some(now);

            let cache_stats = pipeline.mesh_cache.stats_snapshot();
            stats_state.stats.draw_calls = draw_calls;
            stats_state.stats.mesh_count = cache_stats.mesh_count;
            stats_state.stats.cache_hits = cache_stats.hits;
            stats_state.stats.cache_misses = cache_stats.misses;
            stats_state.stats.cache_uploads = cache_stats.uploads;
        }

        Vec::new()
    }

    fn paint(
        &self,
        info: egui::epaint::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        callback_resources: &CallbackResources,
    ) {
        let viewport = info.viewport_in_pixels();
        if viewport.width_px <= 0 || viewport.height_px <= 0 {
            return;
        }

        let clip = info.clip_rect_in_pixels();
        if clip.width_px <= 0 || clip.height_px <= 0 {
            return;
        }

        let Some(pipeline) = callback_resources.get::<PipelineState>() else {
            return;
        };

        render_pass.set_viewport(
            viewport.left_px as f32,
            viewport.top_px as f32,
            viewport.width_px as f32,
            viewport.height_px as f32,
            0.0,
            1.0,
        );
        render_pass.set_scissor_rect(
            clip.left_px.max(0) as u32,
            clip.top_px.max(0) as u32,
            clip.width_px.max(0) as u32,
            clip.height_px.max(0) as u32,
        );
        render_pass.set_pipeline(&pipeline.blit_pipeline);
        render_pass.set_bind_group(0, &pipeline.blit_bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
