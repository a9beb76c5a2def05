use std::borrow::Cow;

use egui_wgpu::wgpu;

const MAIN_WGSL: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    camera_pos: vec3<f32>,
    encode_srgb: f32,
    ambient: vec3<f32>,
    _pad0: f32,
    light_dir: vec3<f32>,
    _pad1: f32,
    light_color: vec3<f32>,
    _pad2: f32,
};

struct Draw {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
    emissive: vec4<f32>,
    specular: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

@group(1) @binding(0)
var<uniform> draw: Draw;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = draw.model * vec4<f32>(input.position, 1.0);
    out.world_pos = world.xyz;
    out.normal = (draw.normal_matrix * vec4<f32>(input.normal, 0.0)).xyz;
    out.position = frame.view_proj * world;
    return out;
}

fn linear_to_srgb(c: vec3<f32>) -> vec3<f32> {
    let x = clamp(c, vec3<f32>(0.0), vec3<f32>(1.0));
    let low = x * 12.92;
    let high = 1.055 * pow(x, vec3<f32>(1.0 / 2.4)) - vec3<f32>(0.055);
    return select(high, low, x <= vec3<f32>(0.0031308));
}

fn encode(c: vec3<f32>) -> vec3<f32> {
    if frame.encode_srgb > 0.5 {
        return linear_to_srgb(c);
    }
    return c;
}

fn shade_phong(n: vec3<f32>, view_dir: vec3<f32>, base: vec3<f32>) -> vec3<f32> {
    let l = normalize(frame.light_dir);
    let ndotl = max(dot(n, l), 0.0);
    let h = normalize(l + view_dir);
    let spec = pow(max(dot(n, h), 0.0), max(draw.specular.w, 1.0));
    return base * (frame.ambient + frame.light_color * ndotl)
        + draw.specular.rgb * frame.light_color * spec * select(0.0, 1.0, ndotl > 0.0);
}

fn shade_standard(n: vec3<f32>, view_dir: vec3<f32>, base: vec3<f32>) -> vec3<f32> {
    let roughness = clamp(draw.params.x, 0.04, 1.0);
    let metalness = clamp(draw.params.y, 0.0, 1.0);
    let l = normalize(frame.light_dir);
    let ndotl = max(dot(n, l), 0.0);
    let h = normalize(l + view_dir);
    let a = roughness * roughness;
    let exponent = max(2.0 / (a * a) - 2.0, 1.0);
    let f0 = mix(vec3<f32>(0.04), base, metalness);
    let fresnel = f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - max(dot(h, view_dir), 0.0), 5.0);
    let spec = fresnel * pow(max(dot(n, h), 0.0), exponent) * (exponent + 8.0) / 25.1327;
    let diffuse = base * (1.0 - metalness);
    return diffuse * frame.ambient + (diffuse + spec) * frame.light_color * ndotl;
}

@fragment
fn fs_main(input: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    let view_dir = normalize(frame.camera_pos - input.world_pos);
    var flat_n = cross(dpdx(input.world_pos), dpdy(input.world_pos));
    if dot(flat_n, view_dir) < 0.0 {
        flat_n = -flat_n;
    }

    var n = normalize(input.normal);
    if draw.params.w > 0.5 && !front {
        n = -n;
    }
    if draw.params.z > 0.5 {
        n = normalize(flat_n);
    }

    let kind = i32(draw.emissive.w + 0.5);
    let base = draw.color.rgb;
    var color = base;
    if kind == 1 {
        color = shade_phong(n, view_dir, base) + draw.emissive.rgb;
    } else if kind == 2 {
        color = shade_standard(n, view_dir, base) + draw.emissive.rgb;
    }
    return vec4<f32>(encode(color), draw.color.a);
}
"#;

const BLIT_WGSL: &str = r#"
@group(0) @binding(0)
var blit_tex: texture_2d<f32>;

@group(0) @binding(1)
var blit_sampler: sampler;

struct BlitOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_blit(@builtin(vertex_index) index: u32) -> BlitOut {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );
    var out: BlitOut;
    out.position = vec4<f32>(positions[index], 0.0, 1.0);
    out.uv = uvs[index];
    return out;
}

@fragment
fn fs_blit(input: BlitOut) -> @location(0) vec4<f32> {
    return textureSample(blit_tex, blit_sampler, input.uv);
}
"#;

pub(super) fn create_main_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("holoview_viewport_shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(MAIN_WGSL)),
    })
}

pub(super) fn create_blit_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("holoview_viewport_blit"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(BLIT_WGSL)),
    })
}
